//! Multiscale chunked images
//!
//! A pyramid is built by repeated bin shrinking: every axis still larger than
//! one chunk is halved until the whole level fits in a single chunk. Each
//! level is addressed chunk by chunk.
//!
//! Intensity images average each bin. Label images take the most frequent
//! label so no new label values appear at coarse levels.

use std::collections::BTreeMap;

use ndarray::{Array, ArrayD, Dimension, IxDyn, Slice};
use serde::{Deserialize, Serialize};

use crate::image::{check_extents, Image};
use crate::reader::{IoError, IoResult};

/// Options for pyramid construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiscaleOptions {
    /// Edge length of a chunk in pixels
    pub chunk_size: usize,

    /// Maximum number of levels, including full resolution
    pub max_levels: usize,

    /// Force label (mode) downsampling. `None` decides from the pixel type.
    pub is_label: Option<bool>,
}

impl Default for MultiscaleOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            max_levels: 8,
            is_label: None,
        }
    }
}

/// One level of a pyramid
#[derive(Debug, Clone)]
pub struct ScaleLevel {
    pub image: Image,

    /// Shrink factor relative to full resolution, x-fastest
    pub factors: Vec<usize>,

    /// Number of chunks along each axis, x-fastest
    pub chunk_grid: Vec<usize>,
}

impl ScaleLevel {
    /// Total number of chunks in this level
    pub fn chunk_count(&self) -> usize {
        self.chunk_grid.iter().product()
    }
}

/// A pyramid of progressively downsampled images
#[derive(Debug, Clone)]
pub struct MultiscaleChunkedImage {
    pub name: String,
    pub chunk_size: usize,
    pub is_label: bool,

    /// Level 0 is full resolution
    pub scales: Vec<ScaleLevel>,
}

impl MultiscaleChunkedImage {
    pub fn num_levels(&self) -> usize {
        self.scales.len()
    }

    /// Coarsest level
    pub fn coarsest(&self) -> &ScaleLevel {
        // construction always yields level 0
        &self.scales[self.scales.len() - 1]
    }

    /// Extract one chunk of a level
    ///
    /// `chunk_index` is x-fastest. Edge chunks are clipped to the image.
    pub fn chunk(&self, level: usize, chunk_index: &[usize]) -> IoResult<ArrayD<f64>> {
        let scale = self.scales.get(level).ok_or(IoError::OutOfBounds {
            index: level,
            size: self.scales.len(),
        })?;
        let dimension = scale.image.dimension();
        if chunk_index.len() != dimension {
            return Err(IoError::InvalidFormat(format!(
                "expected a {}D chunk index, got {} entries",
                dimension,
                chunk_index.len()
            )));
        }
        for (&index, &size) in chunk_index.iter().zip(&scale.chunk_grid) {
            if index >= size {
                return Err(IoError::OutOfBounds { index, size });
            }
        }

        let chunk_size = self.chunk_size;
        let chunk = scale.image.data.slice_each_axis(|axis| {
            let a = axis.axis.index();
            if a >= dimension {
                return Slice::from(..);
            }
            let start = chunk_index[dimension - 1 - a] * chunk_size;
            let end = (start + chunk_size).min(axis.len);
            Slice::from(start..end)
        });

        Ok(chunk.to_owned())
    }
}

/// Build a multiscale pyramid from an image
pub fn to_multiscale_chunked_image(
    image: &Image,
    options: &MultiscaleOptions,
) -> IoResult<MultiscaleChunkedImage> {
    if options.chunk_size == 0 || options.max_levels == 0 {
        return Err(IoError::InvalidFormat(
            "chunk_size and max_levels must be positive".to_string(),
        ));
    }
    check_extents(&image.size)?;

    let is_label = options.is_label.unwrap_or_else(|| image.is_label());
    let chunk_size = options.chunk_size;
    let dimension = image.dimension();

    let mut scales = vec![ScaleLevel {
        chunk_grid: chunk_grid(&image.size, chunk_size),
        factors: vec![1; dimension],
        image: image.clone(),
    }];

    while scales.len() < options.max_levels {
        let previous = &scales[scales.len() - 1];
        if previous.image.size.iter().all(|&s| s <= chunk_size) {
            break;
        }

        let step: Vec<usize> = previous
            .image
            .size
            .iter()
            .map(|&s| if s > chunk_size { 2 } else { 1 })
            .collect();
        let shrunk = bin_shrink(&previous.image, &step, is_label);
        let factors = previous.factors.iter().zip(&step).map(|(f, s)| f * s).collect();

        scales.push(ScaleLevel {
            chunk_grid: chunk_grid(&shrunk.size, chunk_size),
            factors,
            image: shrunk,
        });
    }

    tracing::debug!(
        name = %image.name,
        levels = scales.len(),
        is_label,
        "built multiscale image"
    );

    Ok(MultiscaleChunkedImage {
        name: image.name.clone(),
        chunk_size,
        is_label,
        scales,
    })
}

/// Shrink an image by integer factors (x-fastest)
///
/// Output size is `max(1, size / factor)`; trailing pixels that do not fill a
/// whole bin are dropped.
pub fn bin_shrink(image: &Image, factors: &[usize], is_label: bool) -> Image {
    let dimension = image.dimension();
    let components = image.image_type.components;

    let out_size: Vec<usize> = image
        .size
        .iter()
        .zip(factors)
        .map(|(&s, &f)| (s / f).max(1))
        .collect();

    // array axis order is the reverse of x-fastest
    let array_factors: Vec<usize> = factors.iter().rev().copied().collect();
    let mut out_shape: Vec<usize> = out_size.iter().rev().copied().collect();
    if components > 1 {
        out_shape.push(components);
    }
    let bin_len: usize = array_factors.iter().product();

    let data = Array::from_shape_fn(IxDyn(&out_shape), |out_index| {
        let mut in_index = out_index.slice().to_vec();
        let base: Vec<usize> = (0..dimension)
            .map(|a| out_index[a] * array_factors[a])
            .collect();

        let samples = (0..bin_len).map(|b| {
            let mut rem = b;
            for a in (0..dimension).rev() {
                in_index[a] = base[a] + rem % array_factors[a];
                rem /= array_factors[a];
            }
            image.data[IxDyn(&in_index)]
        });

        if is_label {
            mode(samples)
        } else {
            samples.sum::<f64>() / bin_len as f64
        }
    });

    let spacing: Vec<f64> = image
        .spacing
        .iter()
        .zip(factors)
        .map(|(s, &f)| s * f as f64)
        .collect();

    // keep the bin centre at the same physical position
    let shift: Vec<f64> = image
        .spacing
        .iter()
        .zip(factors)
        .map(|(s, &f)| (f as f64 - 1.0) / 2.0 * s)
        .collect();
    let origin: Vec<f64> = (0..dimension)
        .map(|row| {
            let offset: f64 = (0..dimension)
                .map(|col| image.direction[row * dimension + col] * shift[col])
                .sum();
            image.origin[row] + offset
        })
        .collect();

    Image {
        name: image.name.clone(),
        image_type: image.image_type.clone(),
        size: out_size,
        spacing,
        origin,
        direction: image.direction.clone(),
        data,
    }
}

/// Most frequent label; ties go to the smallest label
fn mode(samples: impl Iterator<Item = f64>) -> f64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in samples {
        *counts.entry(v.round() as i64).or_insert(0) += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (&label, &count) in &counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label as f64).unwrap_or(0.0)
}

fn chunk_grid(size: &[usize], chunk_size: usize) -> Vec<usize> {
    size.iter().map(|&s| s.div_ceil(chunk_size)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ndarray_to_image, NdarrayOptions};
    use ndarray::{Array2, Array3};

    fn options(chunk_size: usize) -> MultiscaleOptions {
        MultiscaleOptions {
            chunk_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_levels_until_single_chunk() {
        let image = ndarray_to_image(&Array2::<f32>::zeros((256, 256)), &NdarrayOptions::default())
            .unwrap();
        let multiscale = to_multiscale_chunked_image(&image, &options(64)).unwrap();

        let sizes: Vec<_> = multiscale.scales.iter().map(|s| s.image.size.clone()).collect();
        assert_eq!(sizes, vec![vec![256, 256], vec![128, 128], vec![64, 64]]);
        assert_eq!(multiscale.scales[0].chunk_count(), 16);
        assert_eq!(multiscale.coarsest().chunk_count(), 1);
        assert_eq!(multiscale.coarsest().factors, vec![4, 4]);
    }

    #[test]
    fn test_anisotropic_shrink() {
        // x = 100, y = 10
        let image = ndarray_to_image(&Array2::<f32>::zeros((10, 100)), &NdarrayOptions::default())
            .unwrap();
        let multiscale = to_multiscale_chunked_image(&image, &options(16)).unwrap();

        assert_eq!(multiscale.num_levels(), 4);
        assert_eq!(multiscale.coarsest().image.size, vec![12, 10]);
        assert_eq!(multiscale.coarsest().factors, vec![8, 1]);
        assert_eq!(multiscale.coarsest().image.spacing, vec![8.0, 1.0]);
    }

    #[test]
    fn test_empty_axis_rejected() {
        let result =
            ndarray_to_image(&Array2::<f32>::zeros((0, 100)), &NdarrayOptions::default());
        assert!(matches!(result, Err(IoError::InvalidFormat(_))));

        // Fields are public, so a hand-built image can still carry an empty axis
        let mut image = ndarray_to_image(&Array2::<f32>::zeros((1, 100)), &NdarrayOptions::default())
            .unwrap();
        image.data = ndarray::ArrayD::zeros(IxDyn(&[0, 100]));
        image.size = vec![100, 0];
        assert!(matches!(
            to_multiscale_chunked_image(&image, &MultiscaleOptions::default()),
            Err(IoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_max_levels() {
        let image = ndarray_to_image(&Array2::<f32>::zeros((256, 256)), &NdarrayOptions::default())
            .unwrap();
        let opts = MultiscaleOptions {
            chunk_size: 8,
            max_levels: 1,
            is_label: None,
        };
        let multiscale = to_multiscale_chunked_image(&image, &opts).unwrap();
        assert_eq!(multiscale.num_levels(), 1);
    }

    #[test]
    fn test_intensity_mean() {
        let array = Array2::from_shape_vec((2, 2), vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let image = ndarray_to_image(&array, &NdarrayOptions::default()).unwrap();
        let multiscale = to_multiscale_chunked_image(&image, &options(1)).unwrap();

        assert!(!multiscale.is_label);
        assert_eq!(multiscale.coarsest().image.pixel(&[0, 0]), Some(2.5));
    }

    #[test]
    fn test_label_mode() {
        let array = Array2::from_shape_vec((2, 4), vec![5u8, 5, 3, 9, 7, 1, 9, 3]).unwrap();
        let image = ndarray_to_image(&array, &NdarrayOptions::default()).unwrap();
        let multiscale = to_multiscale_chunked_image(&image, &options(1)).unwrap();

        assert!(multiscale.is_label);
        let coarse = &multiscale.scales[1].image;
        assert_eq!(coarse.size, vec![2, 1]);
        assert_eq!(coarse.pixel(&[0, 0]), Some(5.0));
        // tie between 3 and 9
        assert_eq!(coarse.pixel(&[1, 0]), Some(3.0));
    }

    #[test]
    fn test_origin_keeps_bin_centre() {
        let array = Array2::<f32>::zeros((4, 4));
        let image = ndarray_to_image(
            &array,
            &NdarrayOptions::default()
                .with_spacing(vec![1.0, 3.0])
                .with_origin(vec![10.0, 0.0]),
        )
        .unwrap();

        let shrunk = bin_shrink(&image, &[2, 2], false);
        assert_eq!(shrunk.size, vec![2, 2]);
        assert_eq!(shrunk.spacing, vec![2.0, 6.0]);
        assert_eq!(shrunk.origin, vec![10.5, 1.5]);
    }

    #[test]
    fn test_vector_pixels_shrink_per_component() {
        let mut array = Array3::<f32>::zeros((2, 2, 2));
        array[[0, 0, 1]] = 4.0;
        let image =
            ndarray_to_image(&array, &NdarrayOptions::default().with_components(2)).unwrap();

        let shrunk = bin_shrink(&image, &[2, 2], false);
        assert_eq!(shrunk.data.shape(), &[1, 1, 2]);
        assert_eq!(shrunk.data[IxDyn(&[0, 0, 1])], 1.0);
    }

    #[test]
    fn test_chunk_extraction() {
        let image = ndarray_to_image(&Array2::<f32>::ones((10, 100)), &NdarrayOptions::default())
            .unwrap();
        let multiscale = to_multiscale_chunked_image(&image, &options(16)).unwrap();

        assert_eq!(multiscale.scales[0].chunk_grid, vec![7, 1]);
        let edge = multiscale.chunk(0, &[6, 0]).unwrap();
        assert_eq!(edge.shape(), &[10, 4]);

        assert!(matches!(
            multiscale.chunk(0, &[7, 0]),
            Err(IoError::OutOfBounds { index: 7, size: 7 })
        ));
        assert!(multiscale.chunk(9, &[0, 0]).is_err());
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let image = ndarray_to_image(&Array2::<f32>::zeros((4, 4)), &NdarrayOptions::default())
            .unwrap();
        assert!(to_multiscale_chunked_image(&image, &options(0)).is_err());
    }
}
