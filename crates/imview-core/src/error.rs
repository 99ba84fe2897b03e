//! Error types for imview-core
//!
//! Provides error handling for:
//! - Layer lookups and registration
//! - Screenshot capture
//! - Configuration
//! - The command service

use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::screenshot::CaptureError;

/// Main error type for viewer operations
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Layer errors
    #[error("Layer error: {0}")]
    Layer(#[from] LayerError),

    /// Screenshot capture errors
    #[error("Screenshot failed: {0}")]
    Capture(#[from] CaptureError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Image loading errors
    #[error("Image I/O failed: {0}")]
    Image(#[from] imview_io::IoError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command service was dropped
    #[error("Viewer service is no longer running")]
    ServiceClosed,
}

impl From<NotFoundError> for ViewerError {
    fn from(err: NotFoundError) -> Self {
        ViewerError::Layer(LayerError::NotFound(err))
    }
}

/// Store a layer lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStore {
    /// Per-layer rendering state
    ActorContext,
    /// Per-layer UI controls
    UiLayers,
}

impl fmt::Display for LayerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerStore::ActorContext => write!(f, "actor context"),
            LayerStore::UiLayers => write!(f, "UI layer map"),
        }
    }
}

/// A layer name is missing from one of the stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Layer '{name}' not found in {store}")]
pub struct NotFoundError {
    pub name: String,
    pub store: LayerStore,
}

impl NotFoundError {
    pub fn new(name: impl Into<String>, store: LayerStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

/// Errors related to layer management
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Layer missing from a store
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Layer name already in use
    #[error("Layer '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// Opacity outside [0, 1]
    #[error("Invalid opacity {opacity} for layer '{name}'")]
    InvalidOpacity { name: String, opacity: f32 },
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Result type alias for layer operations
pub type LayerResult<T> = Result<T, LayerError>;
