//! Viewer command service
//!
//! UI controls never mutate the viewer directly. They send a
//! [`ViewerCommand`] through a [`ViewerHandle`]; the front-end then calls
//! [`ViewerService::process_pending`] on its UI thread, which applies the
//! queued commands in delivery order.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::ViewerConfig;
use crate::context::ViewerContext;
use crate::error::{LayerStore, NotFoundError, ViewerError, ViewerResult};
use crate::registry::toggle_layer_visibility;
use crate::screenshot::{Screenshot, ScreenshotCapture, ViewSnapshotCapture};

/// Commands accepted by the viewer service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Invert a layer's visibility and update its controls
    ToggleLayerVisibility(String),
    /// Set a layer's visibility and update its controls
    SetLayerVisibility { name: String, visible: bool },
    /// Capture the current view
    TakeScreenshot,
}

impl ViewerCommand {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            ViewerCommand::ToggleLayerVisibility(_) => "TOGGLE_LAYER_VISIBILITY",
            ViewerCommand::SetLayerVisibility { .. } => "SET_LAYER_VISIBILITY",
            ViewerCommand::TakeScreenshot => "TAKE_SCREENSHOT",
        }
    }
}

/// Sending side of the command channel
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    sender: Sender<ViewerCommand>,
}

impl ViewerHandle {
    /// Queue a command. Fails only when the service is gone.
    pub fn send(&self, command: ViewerCommand) -> ViewerResult<()> {
        self.sender
            .send(command)
            .map_err(|_| ViewerError::ServiceClosed)
    }
}

/// What the service is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MachineState {
    #[default]
    Idle,
    CapturingScreenshot,
}

/// Owns the viewer context and applies queued commands
pub struct ViewerService<C: ScreenshotCapture = ViewSnapshotCapture> {
    context: ViewerContext,
    capture: C,
    config: ViewerConfig,
    state: MachineState,
    sender: Sender<ViewerCommand>,
    receiver: Receiver<ViewerCommand>,
    screenshots: Vec<Screenshot>,
    last_error: Option<ViewerError>,
}

impl<C: ScreenshotCapture> ViewerService<C> {
    /// Create a service around an existing context
    pub fn new(context: ViewerContext, capture: C, config: ViewerConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            context,
            capture,
            config,
            state: MachineState::Idle,
            sender,
            receiver,
            screenshots: Vec::new(),
            last_error: None,
        }
    }

    /// Get a handle for sending commands
    pub fn handle(&self) -> ViewerHandle {
        ViewerHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn context(&self) -> &ViewerContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ViewerContext {
        &mut self.context
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Screenshots taken so far, oldest first
    pub fn screenshots(&self) -> &[Screenshot] {
        &self.screenshots
    }

    /// The most recent command failure
    pub fn last_error(&self) -> Option<&ViewerError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<ViewerError> {
        self.last_error.take()
    }

    /// Apply every queued command
    ///
    /// Returns the number of commands processed. A failing command is logged
    /// and recorded as the last error; later commands still run.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;

        while let Ok(command) = self.receiver.try_recv() {
            let name = command.name();
            match self.dispatch(command) {
                Ok(()) => tracing::debug!(command = name, "processed viewer command"),
                Err(e) => {
                    tracing::warn!(command = name, error = %e, "viewer command failed");
                    self.last_error = Some(e);
                }
            }
            processed += 1;
        }

        processed
    }

    /// Apply one command immediately
    pub fn dispatch(&mut self, command: ViewerCommand) -> ViewerResult<()> {
        match command {
            ViewerCommand::ToggleLayerVisibility(name) => {
                self.require_layer(&name)?;
                self.context.layers.actor_context.invert_visible(&name)?;
                toggle_layer_visibility(&mut self.context, &name)?;
            }
            ViewerCommand::SetLayerVisibility { name, visible } => {
                self.require_layer(&name)?;
                self.context
                    .layers
                    .actor_context
                    .set_visible(&name, visible)?;
                toggle_layer_visibility(&mut self.context, &name)?;
            }
            ViewerCommand::TakeScreenshot => {
                self.take_screenshot()?;
            }
        }
        Ok(())
    }

    /// Both stores must know the layer before its flag changes
    fn require_layer(&self, name: &str) -> Result<(), NotFoundError> {
        self.context.layers.actor_context.visible(name)?;
        if self.context.layers.ui_layers.contains(name) {
            Ok(())
        } else {
            Err(NotFoundError::new(name, LayerStore::UiLayers))
        }
    }

    fn take_screenshot(&mut self) -> ViewerResult<()> {
        self.state = MachineState::CapturingScreenshot;
        let result = self.capture_and_store();
        self.state = MachineState::Idle;
        result
    }

    fn capture_and_store(&mut self) -> ViewerResult<()> {
        let request = self.config.screenshot.request();
        let mut screenshot = self.capture.capture(&self.context, &request)?;

        if let Some(dir) = &self.config.screenshot.output_dir {
            let path = self.screenshot_path(dir, &screenshot);
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, &screenshot.data)?;
            tracing::info!(path = %path.display(), bytes = screenshot.data.len(), "wrote screenshot");
            screenshot.path = Some(path);
        }

        self.screenshots.push(screenshot);
        Ok(())
    }

    fn screenshot_path(&self, dir: &std::path::Path, screenshot: &Screenshot) -> PathBuf {
        dir.join(format!(
            "{}-screenshot-{}.{}",
            self.context.id,
            self.screenshots.len() + 1,
            screenshot.format.extension()
        ))
    }
}

impl ViewerService<ViewSnapshotCapture> {
    /// Create a service with the JSON snapshot capture
    pub fn from_config(config: ViewerConfig) -> Self {
        let context = ViewerContext::from_config(&config);
        Self::new(context, ViewSnapshotCapture, config)
    }
}
