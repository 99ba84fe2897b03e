//! Viewer context passed to every handler
//!
//! The context groups the state the UI handlers read and write:
//! - the viewer id used to build control ids
//! - the layers context (actor state + UI controls)
//! - the main row context (screenshot button)
//! - the contrast style derived from the background colour

use serde::Serialize;

use crate::config::ViewerConfig;
use crate::layer::{ActorContextStore, LayerKind};
use crate::registry::LayerVisibilityRegistry;
use crate::screenshot::ScreenshotButton;
use crate::style::ContrastStyle;

/// Layer state shared by the layer handlers
#[derive(Debug, Clone, Default)]
pub struct LayersContext {
    /// Per-layer rendering state (owns the visibility flags)
    pub actor_context: ActorContextStore,

    /// Per-layer visibility controls
    pub ui_layers: LayerVisibilityRegistry,
}

/// State of the main UI row
#[derive(Debug, Clone, Default)]
pub struct MainContext {
    pub screenshot_button: Option<ScreenshotButton>,
}

/// A horizontal row of controls, addressed by control id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiRow {
    children: Vec<String>,
}

impl UiRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_child(&mut self, id: impl Into<String>) {
        self.children.push(id.into());
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }
}

/// Everything a viewer handler needs
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub id: String,
    pub layers: LayersContext,
    pub main: MainContext,
    pub contrast: ContrastStyle,
}

impl ViewerContext {
    /// Create an empty context
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layers: LayersContext::default(),
            main: MainContext::default(),
            contrast: ContrastStyle::default(),
        }
    }

    /// Create a context from configuration
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut context = Self::new(config.viewer_id.clone());
        context.contrast = ContrastStyle::for_background(config.ui.background_color);
        context
    }

    /// Snapshot of every layer's rendering state, in UI order
    pub fn layer_snapshots(&self) -> Vec<LayerSnapshot> {
        self.layers
            .ui_layers
            .iter()
            .filter_map(|entry| {
                let actor = self.layers.actor_context.get(&entry.name)?;
                Some(LayerSnapshot {
                    name: entry.name.clone(),
                    kind: actor.kind,
                    visible: actor.visible,
                    opacity: actor.opacity,
                })
            })
            .collect()
    }
}

/// Serializable view of one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub opacity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::register_layer;

    #[test]
    fn test_from_config_picks_contrast() {
        let mut config = ViewerConfig::default();
        config.ui.background_color = [0.95, 0.95, 0.95];
        let context = ViewerContext::from_config(&config);

        assert_eq!(context.id, config.viewer_id);
        assert_eq!(context.contrast, ContrastStyle::Dark);
    }

    #[test]
    fn test_layer_snapshots_in_ui_order() {
        let mut context = ViewerContext::new("viewer");
        register_layer(&mut context, "image", LayerKind::Image, true).unwrap();
        register_layer(&mut context, "labels", LayerKind::Labels, false).unwrap();

        let snapshots = context.layer_snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].name, "image");
        assert_eq!(snapshots[1].kind, LayerKind::Labels);
        assert!(!snapshots[1].visible);
    }

    #[test]
    fn test_ui_row() {
        let mut row = UiRow::new();
        row.append_child("a");
        row.append_child("b");
        assert_eq!(row.children(), &["a".to_string(), "b".to_string()]);
    }
}
