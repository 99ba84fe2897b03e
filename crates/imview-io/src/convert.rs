//! Conversion from `ndarray` arrays to images
//!
//! Arrays follow numpy's C order (`[z, y, x]`), images report their size
//! x-fastest. The axes are reversed when reading the shape; the buffer itself
//! is kept in C order.

use ndarray::{Array, ArrayBase, Data, Dimension, IxDyn, ShapeBuilder};

use crate::image::{Component, Image, ImageType};
use crate::reader::{IoError, IoResult};

/// Options for `ndarray_to_image`
#[derive(Debug, Clone, Default)]
pub struct NdarrayOptions {
    /// Image name (defaults to `"image"`)
    pub name: Option<String>,

    /// Components per pixel. When greater than one the last axis holds them.
    pub components: usize,

    /// Spacing, x-fastest
    pub spacing: Option<Vec<f64>>,

    /// Origin, x-fastest
    pub origin: Option<Vec<f64>>,
}

impl NdarrayOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }

    pub fn with_spacing(mut self, spacing: Vec<f64>) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Convert an n-dimensional array into an image
pub fn ndarray_to_image<S, D>(array: &ArrayBase<S, D>, options: &NdarrayOptions) -> IoResult<Image>
where
    S: Data,
    S::Elem: Component,
    D: Dimension,
{
    let components = options.components.max(1);
    let component_axes = usize::from(components > 1);
    let dimension = array.ndim().checked_sub(component_axes).unwrap_or(0);

    if !(2..=3).contains(&dimension) {
        return Err(IoError::InvalidFormat(format!(
            "only 2D and 3D images are supported, got {} spatial axes",
            dimension
        )));
    }

    let data = array.map(|v| v.to_f64()).into_dyn();
    let image_type = ImageType::new(dimension, S::Elem::COMPONENT_TYPE, components);
    let name = options.name.clone().unwrap_or_else(|| "image".to_string());
    let mut image = Image::new(name, image_type, data)?;

    if let Some(spacing) = &options.spacing {
        check_len("spacing", spacing.len(), dimension)?;
        image.spacing = spacing.clone();
    }
    if let Some(origin) = &options.origin {
        check_len("origin", origin.len(), dimension)?;
        image.origin = origin.clone();
    }

    Ok(image)
}

/// Build an image from a flat buffer in C or Fortran order
pub fn raw_to_image<T: Component>(
    values: Vec<T>,
    shape: &[usize],
    fortran_order: bool,
    options: &NdarrayOptions,
) -> IoResult<Image> {
    let array = Array::from_shape_vec(IxDyn(shape).set_f(fortran_order), values)
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
    ndarray_to_image(&array.as_standard_layout(), options)
}

fn check_len(what: &str, len: usize, dimension: usize) -> IoResult<()> {
    if len != dimension {
        return Err(IoError::InvalidFormat(format!(
            "{} has {} entries for a {}D image",
            what, len, dimension
        )));
    }
    Ok(())
}
