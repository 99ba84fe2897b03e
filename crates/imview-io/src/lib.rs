//! imview-io - Image I/O for the imview viewer
//!
//! This crate provides the image side of the viewer:
//!
//! - **Image**: pixel buffer with spacing, origin and direction
//! - **NumPy readers**: `.npy` files and (with the `npz` feature) `.npz` archives
//! - **Conversion**: `ndarray` arrays to images, numpy axis order to x-fastest
//! - **Multiscale**: bin-shrink pyramids split into fixed-size chunks
//!
//! # Design
//!
//! Pixels are stored as `f64` in C order with axes `[z, y, x]` (plus a
//! trailing component axis for vector pixels). The source component type is
//! kept in [`ImageType`] so label images can be recognised after conversion.

pub mod convert;
pub mod coordinate;
pub mod image;
pub mod multiscale;
pub mod npy_reader;
pub mod reader;

pub use convert::*;
pub use coordinate::*;
pub use image::*;
pub use multiscale::*;
pub use reader::*;
