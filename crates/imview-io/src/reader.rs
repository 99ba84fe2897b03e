//! File reading entry points
//!
//! `read_files` turns a list of paths into images. The format is detected
//! from the file extension.

use std::path::Path;
use thiserror::Error;

use crate::image::Image;
use crate::npy_reader;

/// Errors that can occur during I/O operations
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported dtype: {0}")]
    UnsupportedDtype(String),

    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds { index: usize, size: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err.to_string())
    }
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;

/// Options for `read_files`
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Treat the second of two images as a label map when it holds integers
    pub use_label_map: bool,

    /// Number of components per pixel for arrays read from disk
    pub components: usize,
}

/// Images read from a set of files
#[derive(Debug, Clone, Default)]
pub struct ReadResult {
    pub images: Vec<Image>,
    pub label_image: Option<Image>,
}

impl ReadResult {
    /// Whether nothing was read
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.label_image.is_none()
    }
}

/// Read images from files
///
/// Every file contributes one image, except `.npz` archives which
/// contribute one image per array.
pub fn read_files<P: AsRef<Path>>(paths: &[P], options: &ReadOptions) -> IoResult<ReadResult> {
    let mut images = Vec::new();
    for path in paths {
        images.extend(open_images(path.as_ref(), options)?);
    }

    let label_image = if options.use_label_map
        && images.len() == 2
        && images[1].image_type.component_type.is_integer()
    {
        images.pop()
    } else {
        None
    };

    tracing::debug!(
        images = images.len(),
        label = label_image.is_some(),
        "read {} file(s)",
        paths.len()
    );

    Ok(ReadResult {
        images,
        label_image,
    })
}

/// Open a file and return the images it contains
pub fn open_images(path: &Path, options: &ReadOptions) -> IoResult<Vec<Image>> {
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "npy" => Ok(vec![npy_reader::read_npy(path, options.components)?]),

        #[cfg(feature = "npz")]
        "npz" => npy_reader::read_npz(path, options.components),

        _ => Err(IoError::InvalidFormat(format!(
            "Unknown file extension: {}",
            extension
        ))),
    }
}

/// List supported file extensions
pub fn supported_extensions() -> Vec<&'static str> {
    let mut extensions = vec!["npy"];

    #[cfg(feature = "npz")]
    extensions.push("npz");

    extensions
}
