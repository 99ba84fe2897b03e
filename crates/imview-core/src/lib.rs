//! imview-core - Viewer state for the imview image viewer
//!
//! This crate holds everything a viewer front-end needs besides pixels on
//! screen:
//!
//! - **Layers**: per-layer rendering state and the pair of visibility controls
//! - **Registry**: keeps each layer's controls in step with its visibility flag
//! - **Screenshot**: the screenshot button and pluggable capture backends
//! - **Service**: typed commands queued on a channel and applied in order
//! - **Config**: viewer settings loaded from TOML or JSON
//!
//! # Flow
//!
//! Controls send [`ViewerCommand`]s through a [`ViewerHandle`]. The front-end
//! drains them with [`ViewerService::process_pending`] on its UI thread, so
//! the [`ViewerContext`] is only ever touched from one place.

pub mod config;
pub mod context;
pub mod error;
pub mod layer;
pub mod registry;
pub mod screenshot;
pub mod service;
pub mod style;
pub mod utils;

pub use config::*;
pub use context::*;
pub use error::*;
pub use layer::*;
pub use registry::*;
pub use screenshot::*;
pub use service::*;
pub use style::*;
