//! Image helpers used by viewer front-ends
//!
//! A single import point for loading images and the array and linear
//! algebra crates their data comes in.

pub use imview_io::{
    index_to_world, ndarray_to_image, read_files, to_multiscale_chunked_image, world_to_index,
    Image, MultiscaleChunkedImage, MultiscaleOptions, NdarrayOptions, ReadOptions, ReadResult,
};

pub use nalgebra;
pub use ndarray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barrel_round_trip() {
        let array = ndarray::Array3::<u8>::zeros((2, 3, 4));
        let image = ndarray_to_image(&array, &NdarrayOptions::default()).unwrap();
        assert_eq!(image.size, vec![4, 3, 2]);

        let world = index_to_world(&image, &[1.0, 2.0, 1.0]).unwrap();
        let v = nalgebra::DVector::from_vec(world);
        assert_eq!(v.len(), 3);

        let pyramid = to_multiscale_chunked_image(&image, &MultiscaleOptions::default()).unwrap();
        assert_eq!(pyramid.num_levels(), 1);
    }
}
