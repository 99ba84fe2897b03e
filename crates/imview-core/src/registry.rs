//! Layer visibility registry
//!
//! The registry keeps each layer's pair of visibility controls in step with
//! the visibility flag held in the [`ActorContextStore`]. It never changes the
//! flag itself: `toggle_visibility` renders whatever the store currently
//! says. Callers that want a real toggle invert the flag in the store first
//! (see [`crate::service::ViewerService`]).

use crate::context::ViewerContext;
use crate::error::{LayerError, LayerResult, LayerStore, NotFoundError};
use crate::layer::{ActorContextStore, LayerActorContext, LayerEntry, LayerKind, ToggleControl};
use crate::style::apply_contrast_sensitive_style;

/// UI entries for every registered layer, in registration order
#[derive(Debug, Clone, Default)]
pub struct LayerVisibilityRegistry {
    entries: Vec<LayerEntry>,
}

impl LayerVisibilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UI entry
    pub fn register(&mut self, entry: LayerEntry) -> LayerResult<()> {
        if self.contains(&entry.name) {
            return Err(LayerError::AlreadyRegistered { name: entry.name });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove a UI entry
    pub fn remove(&mut self, name: &str) -> Option<LayerEntry> {
        let pos = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(pos))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entry(&self, name: &str) -> Option<&LayerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut LayerEntry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The control currently on screen for a layer
    pub fn shown_control(&self, name: &str) -> Option<&ToggleControl> {
        self.entry(name).map(LayerEntry::shown_control)
    }

    /// Render a layer's controls from its current visibility flag
    ///
    /// Fails without touching any control when the layer is missing from
    /// either store.
    pub fn toggle_visibility(
        &mut self,
        actor_context: &ActorContextStore,
        layer_name: &str,
    ) -> Result<(), NotFoundError> {
        let visible = actor_context.visible(layer_name)?;
        let entry = self
            .entry_mut(layer_name)
            .ok_or_else(|| NotFoundError::new(layer_name, LayerStore::UiLayers))?;

        entry.render(visible);
        tracing::debug!(layer = layer_name, visible, "synced layer visibility controls");
        Ok(())
    }

    /// Render every registered layer
    ///
    /// Every flag is looked up before any control changes, so a missing
    /// layer leaves all controls as they were.
    pub fn sync_all(&mut self, actor_context: &ActorContextStore) -> Result<(), NotFoundError> {
        let flags = self
            .entries
            .iter()
            .map(|entry| actor_context.visible(&entry.name))
            .collect::<Result<Vec<_>, _>>()?;

        for (entry, visible) in self.entries.iter_mut().zip(flags) {
            entry.render(visible);
        }
        Ok(())
    }
}

/// Render a layer's visibility controls from the context's actor state
pub fn toggle_layer_visibility(
    context: &mut ViewerContext,
    layer_name: &str,
) -> Result<(), NotFoundError> {
    let layers = &mut context.layers;
    layers
        .ui_layers
        .toggle_visibility(&layers.actor_context, layer_name)
}

/// Add a layer to both the actor context and the UI, then sync its controls
pub fn register_layer(
    context: &mut ViewerContext,
    name: &str,
    kind: LayerKind,
    visible: bool,
) -> LayerResult<()> {
    if context.layers.actor_context.contains(name) || context.layers.ui_layers.contains(name) {
        return Err(LayerError::AlreadyRegistered {
            name: name.to_string(),
        });
    }

    let mut entry = LayerEntry::new(&context.id, name);
    apply_contrast_sensitive_style(context, "invertibleButton", &mut entry.visible_control);
    apply_contrast_sensitive_style(context, "invertibleButton", &mut entry.invisible_control);

    context
        .layers
        .actor_context
        .insert(name, LayerActorContext::new(kind, visible));
    context.layers.ui_layers.register(entry)?;
    toggle_layer_visibility(context, name)?;

    tracing::debug!(layer = name, kind = kind.name(), visible, "registered layer");
    Ok(())
}

/// Remove a layer from both stores
pub fn remove_layer(context: &mut ViewerContext, name: &str) -> Result<(), NotFoundError> {
    let layers = &mut context.layers;
    if !layers.actor_context.contains(name) {
        return Err(NotFoundError::new(name, LayerStore::ActorContext));
    }
    if !layers.ui_layers.contains(name) {
        return Err(NotFoundError::new(name, LayerStore::UiLayers));
    }

    layers.actor_context.remove(name);
    layers.ui_layers.remove(name);
    tracing::debug!(layer = name, "removed layer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Display;

    fn store_with(layers: &[(&str, bool)]) -> (ActorContextStore, LayerVisibilityRegistry) {
        let mut store = ActorContextStore::new();
        let mut registry = LayerVisibilityRegistry::new();
        for &(name, visible) in layers {
            store.insert(name, LayerActorContext::new(LayerKind::Image, visible));
            registry.register(LayerEntry::new("viewer", name)).unwrap();
        }
        (store, registry)
    }

    #[test]
    fn test_sync_hidden_layer() {
        let (store, mut registry) = store_with(&[("ct-scan", false)]);
        registry.toggle_visibility(&store, "ct-scan").unwrap();

        let entry = registry.entry("ct-scan").unwrap();
        assert_eq!(entry.visible_control.display, Display::None);
        assert_eq!(entry.invisible_control.display, Display::Flex);
    }

    #[test]
    fn test_sync_renders_current_flag_without_flipping() {
        let (store, mut registry) = store_with(&[("ct-scan", true)]);
        registry.toggle_visibility(&store, "ct-scan").unwrap();
        assert!(registry.entry("ct-scan").unwrap().shows_visible());
        assert_eq!(store.visible("ct-scan"), Ok(true));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let (store, mut registry) = store_with(&[("a", true), ("b", false)]);
        registry.sync_all(&store).unwrap();
        let first: Vec<LayerEntry> = registry.iter().cloned().collect();

        registry.sync_all(&store).unwrap();
        registry.toggle_visibility(&store, "b").unwrap();
        let second: Vec<LayerEntry> = registry.iter().cloned().collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_from_ui_map() {
        let (mut store, mut registry) = store_with(&[("a", true)]);
        store.insert("orphan", LayerActorContext::new(LayerKind::Image, true));

        let err = registry.toggle_visibility(&store, "orphan").unwrap_err();
        assert_eq!(err.store, LayerStore::UiLayers);
    }

    #[test]
    fn test_missing_from_actor_context() {
        let (store, mut registry) = store_with(&[("a", true)]);
        registry.register(LayerEntry::new("viewer", "orphan")).unwrap();

        let err = registry.toggle_visibility(&store, "orphan").unwrap_err();
        assert_eq!(err.store, LayerStore::ActorContext);
    }

    #[test]
    fn test_sync_all_missing_actor_changes_nothing() {
        let (mut store, mut registry) = store_with(&[("a", true), ("b", true)]);
        registry.register(LayerEntry::new("viewer", "orphan")).unwrap();
        store.set_visible("a", false).unwrap();
        let before: Vec<LayerEntry> = registry.iter().cloned().collect();

        let err = registry.sync_all(&store).unwrap_err();
        assert_eq!(err.name, "orphan");
        assert_eq!(err.store, LayerStore::ActorContext);

        let after: Vec<LayerEntry> = registry.iter().cloned().collect();
        assert_eq!(before, after);
        assert!(registry.entry("a").unwrap().shows_visible());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = LayerVisibilityRegistry::new();
        registry.register(LayerEntry::new("viewer", "a")).unwrap();
        assert!(matches!(
            registry.register(LayerEntry::new("viewer", "a")),
            Err(LayerError::AlreadyRegistered { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order() {
        let (_, registry) = store_with(&[("zeta", true), ("alpha", true), ("mid", false)]);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    }
}
