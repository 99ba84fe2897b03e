//! TUI views

mod image_view;
mod layer_view;

pub use image_view::ImageView;
pub use layer_view::LayerView;
