//! Image and pixel types

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::reader::{IoError, IoResult};

/// Storage type of a single pixel component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ComponentType {
    /// Size in bytes of one component
    pub fn byte_size(&self) -> usize {
        match self {
            ComponentType::Int8 | ComponentType::UInt8 => 1,
            ComponentType::Int16 | ComponentType::UInt16 => 2,
            ComponentType::Int32 | ComponentType::UInt32 | ComponentType::Float32 => 4,
            ComponentType::Int64 | ComponentType::UInt64 | ComponentType::Float64 => 8,
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        !matches!(self, ComponentType::Float32 | ComponentType::Float64)
    }

    /// Short name, e.g. `uint16`
    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::Int8 => "int8",
            ComponentType::UInt8 => "uint8",
            ComponentType::Int16 => "int16",
            ComponentType::UInt16 => "uint16",
            ComponentType::Int32 => "int32",
            ComponentType::UInt32 => "uint32",
            ComponentType::Int64 => "int64",
            ComponentType::UInt64 => "uint64",
            ComponentType::Float32 => "float32",
            ComponentType::Float64 => "float64",
        }
    }
}

/// Element types that can be converted into image pixels
pub trait Component: Copy + 'static {
    const COMPONENT_TYPE: ComponentType;

    fn to_f64(self) -> f64;
}

macro_rules! impl_component {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Component for $t {
                const COMPONENT_TYPE: ComponentType = ComponentType::$variant;

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_component!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

/// How the components of a pixel are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelType {
    Scalar,
    Rgb,
    Rgba,
    Vector,
}

impl PixelType {
    /// Default interpretation for a component count
    pub fn from_components(components: usize, component_type: ComponentType) -> Self {
        match (components, component_type) {
            (1, _) => PixelType::Scalar,
            (3, ComponentType::UInt8) => PixelType::Rgb,
            (4, ComponentType::UInt8) => PixelType::Rgba,
            _ => PixelType::Vector,
        }
    }
}

/// Type description of an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageType {
    /// Number of spatial dimensions (2 or 3)
    pub dimension: usize,

    /// Storage type of each component
    pub component_type: ComponentType,

    /// Pixel interpretation
    pub pixel_type: PixelType,

    /// Components per pixel
    pub components: usize,
}

impl ImageType {
    pub fn new(dimension: usize, component_type: ComponentType, components: usize) -> Self {
        Self {
            dimension,
            component_type,
            pixel_type: PixelType::from_components(components, component_type),
            components,
        }
    }
}

/// An image with its physical placement
///
/// `size`, `spacing` and `origin` are x-fastest. `direction` is a row-major
/// `dimension x dimension` matrix. `data` is C-ordered with axes `[z, y, x]`,
/// followed by a component axis when `components > 1`.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: String,
    pub image_type: ImageType,
    pub size: Vec<usize>,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub direction: Vec<f64>,
    pub data: ArrayD<f64>,
}

impl Image {
    /// Create an image with unit spacing, zero origin and identity direction
    pub fn new(name: impl Into<String>, image_type: ImageType, data: ArrayD<f64>) -> IoResult<Self> {
        let dimension = image_type.dimension;
        let component_axes = usize::from(image_type.components > 1);

        if data.ndim() != dimension + component_axes {
            return Err(IoError::InvalidFormat(format!(
                "expected {} axes for a {}D image with {} components, got {}",
                dimension + component_axes,
                dimension,
                image_type.components,
                data.ndim()
            )));
        }
        if component_axes == 1 && data.shape()[dimension] != image_type.components {
            return Err(IoError::InvalidFormat(format!(
                "component axis has length {}, expected {}",
                data.shape()[dimension],
                image_type.components
            )));
        }

        let size: Vec<usize> = data.shape()[..dimension].iter().rev().copied().collect();
        check_extents(&size)?;

        Ok(Self {
            name: name.into(),
            image_type,
            size,
            spacing: vec![1.0; dimension],
            origin: vec![0.0; dimension],
            direction: identity_direction(dimension),
            data,
        })
    }

    /// Set the pixel spacing
    pub fn with_spacing(mut self, spacing: Vec<f64>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the origin
    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Set the direction matrix
    pub fn with_direction(mut self, direction: Vec<f64>) -> Self {
        self.direction = direction;
        self
    }

    /// Number of spatial dimensions
    pub fn dimension(&self) -> usize {
        self.image_type.dimension
    }

    /// Number of pixels (not components)
    pub fn num_pixels(&self) -> usize {
        self.size.iter().product()
    }

    /// Label images hold integer scalar pixels
    pub fn is_label(&self) -> bool {
        self.image_type.component_type.is_integer() && self.image_type.components == 1
    }

    /// First component of the pixel at an x-fastest index
    pub fn pixel(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.dimension() {
            return None;
        }
        let mut array_index: Vec<usize> = index.iter().rev().copied().collect();
        if self.image_type.components > 1 {
            array_index.push(0);
        }
        self.data.get(IxDyn(&array_index)).copied()
    }

    /// Minimum and maximum pixel value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Every spatial axis must hold at least one pixel
pub(crate) fn check_extents(size: &[usize]) -> IoResult<()> {
    if size.contains(&0) {
        return Err(IoError::InvalidFormat(format!(
            "image has an empty axis (size {:?})",
            size
        )));
    }
    Ok(())
}

/// Row-major identity matrix
pub fn identity_direction(dimension: usize) -> Vec<f64> {
    (0..dimension * dimension)
        .map(|i| if i / dimension == i % dimension { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    #[test]
    fn test_size_is_reversed_shape() {
        let data = Array::zeros(IxDyn(&[4, 3, 2]));
        let image = Image::new("vol", ImageType::new(3, ComponentType::Float32, 1), data).unwrap();
        assert_eq!(image.size, vec![2, 3, 4]);
        assert_eq!(image.num_pixels(), 24);
        assert_eq!(image.direction, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_axis_count_mismatch() {
        let data = Array::zeros(IxDyn(&[4, 3]));
        let result = Image::new("bad", ImageType::new(3, ComponentType::UInt8, 1), data);
        assert!(matches!(result, Err(IoError::InvalidFormat(_))));
    }

    #[test]
    fn test_component_axis() {
        let data = Array::zeros(IxDyn(&[5, 6, 3]));
        let image = Image::new("rgb", ImageType::new(2, ComponentType::UInt8, 3), data).unwrap();
        assert_eq!(image.size, vec![6, 5]);
        assert_eq!(image.image_type.pixel_type, PixelType::Rgb);
        assert!(!image.is_label());
    }

    #[test]
    fn test_pixel_lookup() {
        let data = Array::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let image = Image::new("img", ImageType::new(2, ComponentType::Int16, 1), data).unwrap();
        // x = 2, y = 1
        assert_eq!(image.pixel(&[2, 1]), Some(5.0));
        assert_eq!(image.pixel(&[3, 0]), None);
        assert!(image.is_label());
        assert_eq!(image.value_range(), Some((0.0, 5.0)));
    }

    #[test]
    fn test_component_type() {
        assert_eq!(ComponentType::UInt16.byte_size(), 2);
        assert!(ComponentType::Int32.is_integer());
        assert!(!ComponentType::Float64.is_integer());
        assert_eq!(<u16 as Component>::COMPONENT_TYPE, ComponentType::UInt16);
    }
}
