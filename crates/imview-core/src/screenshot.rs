//! Screenshot button and capture
//!
//! The button only asks the viewer service for a screenshot. The pixels come
//! from a [`ScreenshotCapture`] implementation supplied by the front-end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::context::{UiRow, ViewerContext};
use crate::error::ViewerResult;
use crate::service::{ViewerCommand, ViewerHandle};
use crate::style::{apply_contrast_sensitive_style, Styled};

/// Errors that can occur while capturing a screenshot
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Format {format} is not supported by this capture backend")]
    Unsupported { format: String },

    #[error("Encoding failed: {message}")]
    Encoding { message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Screenshot file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    /// PNG raster image
    Png,
    /// JSON description of the visible layers
    #[default]
    Json,
}

impl ScreenshotFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ScreenshotFormat::Png => "png",
            ScreenshotFormat::Json => "json",
        }
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            ScreenshotFormat::Png => "image/png",
            ScreenshotFormat::Json => "application/json",
        }
    }
}

/// What the capture backend should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenshotRequest {
    pub format: ScreenshotFormat,
    pub width: u32,
    pub height: u32,
}

/// A captured screenshot
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub id: String,
    pub taken_at: String,
    pub format: ScreenshotFormat,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,

    /// Set once the screenshot is written to disk
    pub path: Option<PathBuf>,
}

impl Screenshot {
    pub fn new(request: &ScreenshotRequest, data: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: chrono::Utc::now().to_rfc3339(),
            format: request.format,
            width: request.width,
            height: request.height,
            data,
            path: None,
        }
    }
}

/// Produces screenshot bytes from the current viewer state
pub trait ScreenshotCapture {
    fn capture(
        &self,
        context: &ViewerContext,
        request: &ScreenshotRequest,
    ) -> Result<Screenshot, CaptureError>;
}

/// Captures the layer table as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewSnapshotCapture;

#[derive(Serialize)]
struct ViewSnapshot<'a> {
    viewer_id: &'a str,
    width: u32,
    height: u32,
    layers: Vec<crate::context::LayerSnapshot>,
}

impl ScreenshotCapture for ViewSnapshotCapture {
    fn capture(
        &self,
        context: &ViewerContext,
        request: &ScreenshotRequest,
    ) -> Result<Screenshot, CaptureError> {
        if request.format != ScreenshotFormat::Json {
            return Err(CaptureError::Unsupported {
                format: request.format.extension().to_string(),
            });
        }

        let snapshot = ViewSnapshot {
            viewer_id: &context.id,
            width: request.width,
            height: request.height,
            layers: context.layer_snapshots(),
        };
        let data = serde_json::to_vec_pretty(&snapshot).map_err(|e| CaptureError::Encoding {
            message: e.to_string(),
        })?;

        Ok(Screenshot::new(request, data))
    }
}

/// Checkbox-style button in the main UI row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotButton {
    pub input_id: String,
    pub checked: bool,
    pub tooltip: String,
    pub style_class: String,
}

impl ScreenshotButton {
    /// Request a screenshot and mark the button checked
    pub fn activate(&mut self, handle: &ViewerHandle) -> ViewerResult<()> {
        handle.send(ViewerCommand::TakeScreenshot)?;
        self.checked = true;
        Ok(())
    }
}

impl Styled for ScreenshotButton {
    fn set_style_class(&mut self, class: String) {
        self.style_class = class;
    }
}

/// Build the screenshot button, store it in the context and add it to a row
pub fn create_screenshot_button(context: &mut ViewerContext, main_row: &mut UiRow) {
    let mut button = ScreenshotButton {
        input_id: format!("{}-screenshotButton", context.id),
        checked: true,
        tooltip: "Screenshot".to_string(),
        style_class: String::new(),
    };
    apply_contrast_sensitive_style(context, "invertibleButton", &mut button);

    main_row.append_child(button.input_id.clone());
    context.main.screenshot_button = Some(button);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;
    use crate::registry::register_layer;

    #[test]
    fn test_create_screenshot_button() {
        let mut context = ViewerContext::new("viewer-1");
        let mut row = UiRow::new();
        create_screenshot_button(&mut context, &mut row);

        let button = context.main.screenshot_button.as_ref().unwrap();
        assert_eq!(button.input_id, "viewer-1-screenshotButton");
        assert!(button.checked);
        assert_eq!(button.tooltip, "Screenshot");
        assert_eq!(button.style_class, "invertibleButtonLight");
        assert_eq!(row.children(), &["viewer-1-screenshotButton".to_string()]);
    }

    #[test]
    fn test_json_capture() {
        let mut context = ViewerContext::new("viewer-1");
        register_layer(&mut context, "ct-scan", LayerKind::Image, false).unwrap();

        let request = ScreenshotRequest {
            format: ScreenshotFormat::Json,
            width: 640,
            height: 480,
        };
        let screenshot = ViewSnapshotCapture.capture(&context, &request).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&screenshot.data).unwrap();

        assert_eq!(value["viewer_id"], "viewer-1");
        assert_eq!(value["layers"][0]["name"], "ct-scan");
        assert_eq!(value["layers"][0]["visible"], false);
        assert_eq!(screenshot.width, 640);
    }

    #[test]
    fn test_png_unsupported_by_snapshot_capture() {
        let context = ViewerContext::new("viewer-1");
        let request = ScreenshotRequest {
            format: ScreenshotFormat::Png,
            width: 1,
            height: 1,
        };
        assert!(matches!(
            ViewSnapshotCapture.capture(&context, &request),
            Err(CaptureError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ScreenshotFormat::Png.extension(), "png");
        assert_eq!(ScreenshotFormat::Json.mime_type(), "application/json");
    }
}
