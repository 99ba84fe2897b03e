//! Index/world coordinate transforms
//!
//! `world = origin + direction * (spacing ⊙ index)`

use nalgebra::{DMatrix, DVector};

use crate::image::Image;
use crate::reader::{IoError, IoResult};

/// Direction matrix of an image as an nalgebra matrix
pub fn direction_matrix(image: &Image) -> DMatrix<f64> {
    let d = image.dimension();
    DMatrix::from_row_slice(d, d, &image.direction)
}

/// Physical position of a continuous x-fastest index
pub fn index_to_world(image: &Image, index: &[f64]) -> IoResult<Vec<f64>> {
    let d = check_dimension(image, index.len())?;
    let scaled = DVector::from_iterator(d, index.iter().zip(&image.spacing).map(|(i, s)| i * s));
    let world = DVector::from_column_slice(&image.origin) + direction_matrix(image) * scaled;
    Ok(world.iter().copied().collect())
}

/// Continuous x-fastest index of a physical position
pub fn world_to_index(image: &Image, world: &[f64]) -> IoResult<Vec<f64>> {
    let d = check_dimension(image, world.len())?;
    let inverse = direction_matrix(image)
        .try_inverse()
        .ok_or_else(|| IoError::InvalidFormat("direction matrix is singular".to_string()))?;
    let offset = DVector::from_column_slice(world) - DVector::from_column_slice(&image.origin);
    let scaled = inverse * offset;
    Ok((0..d).map(|i| scaled[i] / image.spacing[i]).collect())
}

fn check_dimension(image: &Image, len: usize) -> IoResult<usize> {
    let d = image.dimension();
    if len != d {
        return Err(IoError::InvalidFormat(format!(
            "expected a {}D coordinate, got {} entries",
            d, len
        )));
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ndarray_to_image, NdarrayOptions};
    use ndarray::Array2;

    fn test_image() -> Image {
        let array = Array2::<f32>::zeros((8, 8));
        let options = NdarrayOptions::default()
            .with_spacing(vec![0.5, 2.0])
            .with_origin(vec![10.0, 20.0]);
        ndarray_to_image(&array, &options).unwrap()
    }

    #[test]
    fn test_index_to_world_identity_direction() {
        let image = test_image();
        let world = index_to_world(&image, &[2.0, 3.0]).unwrap();
        assert_eq!(world, vec![11.0, 26.0]);
    }

    #[test]
    fn test_rotated_direction() {
        // 90 degree rotation: x index runs along world y
        let image = test_image().with_direction(vec![0.0, -1.0, 1.0, 0.0]);
        let world = index_to_world(&image, &[2.0, 0.0]).unwrap();
        assert!((world[0] - 10.0).abs() < 1e-12);
        assert!((world[1] - 21.0).abs() < 1e-12);

        let index = world_to_index(&image, &world).unwrap();
        assert!((index[0] - 2.0).abs() < 1e-12);
        assert!(index[1].abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let image = test_image();
        assert!(index_to_world(&image, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_singular_direction() {
        let image = test_image().with_direction(vec![0.0; 4]);
        assert!(world_to_index(&image, &[0.0, 0.0]).is_err());
    }
}
