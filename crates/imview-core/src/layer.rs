//! Layers and their visibility controls
//!
//! Each layer has two toggle controls: one shown while the layer is visible
//! and one shown while it is hidden. Exactly one of them is displayed at any
//! time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LayerError, LayerResult, LayerStore, NotFoundError};
use crate::style::Styled;

/// Display state of a control, mirroring CSS `display`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Flex,
    None,
}

/// An on-screen toggle control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleControl {
    pub id: String,
    pub display: Display,
    pub tooltip: String,
    pub style_class: String,
}

impl ToggleControl {
    pub fn new(id: impl Into<String>, tooltip: impl Into<String>, display: Display) -> Self {
        Self {
            id: id.into(),
            display,
            tooltip: tooltip.into(),
            style_class: String::new(),
        }
    }

    pub fn is_shown(&self) -> bool {
        self.display != Display::None
    }
}

impl Styled for ToggleControl {
    fn set_style_class(&mut self, class: String) {
        self.style_class = class;
    }
}

/// UI entry for one layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub name: String,

    /// Shown while the layer is visible
    pub visible_control: ToggleControl,

    /// Shown while the layer is hidden
    pub invisible_control: ToggleControl,
}

impl LayerEntry {
    /// Create an entry showing the visible control
    pub fn new(viewer_id: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            visible_control: ToggleControl::new(
                format!("{}-{}-visibleButton", viewer_id, name),
                "Hide layer",
                Display::Flex,
            ),
            invisible_control: ToggleControl::new(
                format!("{}-{}-invisibleButton", viewer_id, name),
                "Show layer",
                Display::None,
            ),
            name,
        }
    }

    /// Show the control matching `visible` and hide the other
    pub fn render(&mut self, visible: bool) {
        if visible {
            self.visible_control.display = Display::Flex;
            self.invisible_control.display = Display::None;
        } else {
            self.visible_control.display = Display::None;
            self.invisible_control.display = Display::Flex;
        }
        debug_assert!(self.is_consistent());
    }

    /// Exactly one control is shown
    pub fn is_consistent(&self) -> bool {
        self.visible_control.is_shown() ^ self.invisible_control.is_shown()
    }

    /// The control currently on screen
    pub fn shown_control(&self) -> &ToggleControl {
        if self.visible_control.is_shown() {
            &self.visible_control
        } else {
            &self.invisible_control
        }
    }

    /// Whether the controls currently say "visible"
    pub fn shows_visible(&self) -> bool {
        self.visible_control.is_shown()
    }
}

/// Kind of data a layer renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    #[default]
    Image,
    Labels,
    Geometry,
    PointSet,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Image => "image",
            LayerKind::Labels => "labels",
            LayerKind::Geometry => "geometry",
            LayerKind::PointSet => "point set",
        }
    }
}

/// Rendering state of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerActorContext {
    pub visible: bool,
    pub kind: LayerKind,
    pub opacity: f32,
}

impl LayerActorContext {
    pub fn new(kind: LayerKind, visible: bool) -> Self {
        Self {
            visible,
            kind,
            opacity: 1.0,
        }
    }
}

/// Per-layer rendering state, keyed by layer name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorContextStore {
    layers: BTreeMap<String, LayerActorContext>,
}

impl ActorContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&LayerActorContext> {
        self.layers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut LayerActorContext> {
        self.layers.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, actor: LayerActorContext) {
        self.layers.insert(name.into(), actor);
    }

    pub fn remove(&mut self, name: &str) -> Option<LayerActorContext> {
        self.layers.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LayerActorContext)> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Current visibility flag of a layer
    pub fn visible(&self, name: &str) -> Result<bool, NotFoundError> {
        self.get(name)
            .map(|actor| actor.visible)
            .ok_or_else(|| NotFoundError::new(name, LayerStore::ActorContext))
    }

    /// Set the visibility flag
    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<(), NotFoundError> {
        let actor = self
            .get_mut(name)
            .ok_or_else(|| NotFoundError::new(name, LayerStore::ActorContext))?;
        actor.visible = visible;
        Ok(())
    }

    /// Invert the visibility flag, returning the new value
    pub fn invert_visible(&mut self, name: &str) -> Result<bool, NotFoundError> {
        let actor = self
            .get_mut(name)
            .ok_or_else(|| NotFoundError::new(name, LayerStore::ActorContext))?;
        actor.visible = !actor.visible;
        Ok(actor.visible)
    }

    /// Set a layer's opacity, which must lie in [0, 1]
    pub fn set_opacity(&mut self, name: &str, opacity: f32) -> LayerResult<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(LayerError::InvalidOpacity {
                name: name.to_string(),
                opacity,
            });
        }
        let actor = self
            .get_mut(name)
            .ok_or_else(|| NotFoundError::new(name, LayerStore::ActorContext))?;
        actor.opacity = opacity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_consistent() {
        let entry = LayerEntry::new("viewer", "ct-scan");
        assert!(entry.is_consistent());
        assert!(entry.shows_visible());
        assert_eq!(entry.visible_control.id, "viewer-ct-scan-visibleButton");
        assert_eq!(entry.invisible_control.id, "viewer-ct-scan-invisibleButton");
    }

    #[test]
    fn test_render_hidden() {
        let mut entry = LayerEntry::new("viewer", "ct-scan");
        entry.render(false);
        assert_eq!(entry.visible_control.display, Display::None);
        assert_eq!(entry.invisible_control.display, Display::Flex);
        assert_eq!(entry.shown_control().id, "viewer-ct-scan-invisibleButton");
    }

    #[test]
    fn test_invert_visible() {
        let mut store = ActorContextStore::new();
        store.insert("mask", LayerActorContext::new(LayerKind::Labels, true));

        assert_eq!(store.invert_visible("mask"), Ok(false));
        assert_eq!(store.visible("mask"), Ok(false));
        assert_eq!(store.invert_visible("mask"), Ok(true));
    }

    #[test]
    fn test_missing_layer_in_store() {
        let mut store = ActorContextStore::new();
        let err = store.set_visible("ghost-layer", true).unwrap_err();
        assert_eq!(err.store, LayerStore::ActorContext);
        assert_eq!(err.name, "ghost-layer");
    }

    #[test]
    fn test_opacity_range() {
        let mut store = ActorContextStore::new();
        store.insert("mask", LayerActorContext::new(LayerKind::Labels, true));

        assert!(store.set_opacity("mask", 0.25).is_ok());
        assert_eq!(store.get("mask").unwrap().opacity, 0.25);
        assert!(matches!(
            store.set_opacity("mask", 1.5),
            Err(LayerError::InvalidOpacity { .. })
        ));
        assert!(matches!(
            store.set_opacity("ghost-layer", 0.5),
            Err(LayerError::NotFound(_))
        ));
    }
}
