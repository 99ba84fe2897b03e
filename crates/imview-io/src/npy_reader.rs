//! NumPy `.npy` and `.npz` readers

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use npyz::{DType, NpyFile, Order, TypeChar};

use crate::convert::{raw_to_image, NdarrayOptions};
use crate::image::Image;
use crate::reader::{IoError, IoResult};

/// Read a single `.npy` file
pub fn read_npy(path: &Path, components: usize) -> IoResult<Image> {
    let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
    let npy = NpyFile::new(BufReader::new(file))
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;

    decode(npy, &file_stem(path), components)
}

/// Read every array of an `.npz` archive
#[cfg(feature = "npz")]
pub fn read_npz(path: &Path, components: usize) -> IoResult<Vec<Image>> {
    let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;

    let mut images = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
        let name = entry
            .name()
            .strip_suffix(".npy")
            .unwrap_or(entry.name())
            .to_string();
        let npy = NpyFile::new(entry).map_err(|e| IoError::InvalidFormat(e.to_string()))?;
        images.push(decode(npy, &name, components)?);
    }

    Ok(images)
}

fn decode<R: Read>(npy: NpyFile<R>, name: &str, components: usize) -> IoResult<Image> {
    let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
    let fortran_order = npy.order() == Order::Fortran;
    let options = NdarrayOptions::named(name).with_components(components);

    let type_str = match npy.dtype() {
        DType::Plain(type_str) => type_str,
        other => {
            return Err(IoError::UnsupportedDtype(format!(
                "structured or array dtype {:?}",
                other
            )))
        }
    };

    macro_rules! read_as {
        ($t:ty) => {{
            let values = npy
                .into_vec::<$t>()
                .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
            raw_to_image(values, &shape, fortran_order, &options)
        }};
    }

    match (type_str.type_char(), type_str.size_field()) {
        (TypeChar::Int, 1) => read_as!(i8),
        (TypeChar::Uint, 1) => read_as!(u8),
        (TypeChar::Int, 2) => read_as!(i16),
        (TypeChar::Uint, 2) => read_as!(u16),
        (TypeChar::Int, 4) => read_as!(i32),
        (TypeChar::Uint, 4) => read_as!(u32),
        (TypeChar::Int, 8) => read_as!(i64),
        (TypeChar::Uint, 8) => read_as!(u64),
        (TypeChar::Float, 4) => read_as!(f32),
        (TypeChar::Float, 8) => read_as!(f64),
        _ => Err(IoError::UnsupportedDtype(type_str.to_string())),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
