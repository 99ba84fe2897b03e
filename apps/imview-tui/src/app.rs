//! Application state and main render loop

use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use imview_core::utils::{
    read_files, to_multiscale_chunked_image, MultiscaleChunkedImage, ReadOptions,
};
use imview_core::{
    create_screenshot_button, register_layer, LayerKind, UiRow, ViewerCommand, ViewerConfig,
    ViewerHandle, ViewerResult, ViewerService,
};

use crate::keybindings::{normal_mode_action, Action};
use crate::views::{ImageView, LayerView};

/// An image loaded from disk and registered as a layer
pub struct LoadedLayer {
    pub name: String,
    pub kind: LayerKind,
    pub pyramid: MultiscaleChunkedImage,
}

/// Main application state
pub struct App {
    /// Owns the viewer context and applies commands
    pub service: ViewerService,
    /// Sending side used by every control
    pub handle: ViewerHandle,
    /// Ids of the controls in the main row
    pub main_row: UiRow,
    /// Loaded images, in layer order
    pub layers: Vec<LoadedLayer>,
    /// Selected layer index
    pub selected: usize,
    /// Pyramid level shown in the image panel
    pub level: usize,
    /// Status message
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
    pub layer_view: LayerView,
    pub image_view: ImageView,
}

impl App {
    /// Create an application with no layers
    pub fn new(config: ViewerConfig) -> Self {
        let background = config.ui.background_color;
        let mut service = ViewerService::from_config(config);
        let handle = service.handle();
        let mut main_row = UiRow::new();
        create_screenshot_button(service.context_mut(), &mut main_row);

        Self {
            service,
            handle,
            main_row,
            layers: Vec::new(),
            selected: 0,
            level: 0,
            status_message: None,
            show_help: false,
            layer_view: LayerView::new(background),
            image_view: ImageView::new(),
        }
    }

    /// Read image files and register one layer per image
    ///
    /// A second integer-typed image is loaded as a label map.
    pub fn load(&mut self, paths: &[PathBuf]) -> ViewerResult<()> {
        let read = read_files(
            paths,
            &ReadOptions {
                use_label_map: true,
                components: 1,
            },
        )?;

        let images = read
            .images
            .into_iter()
            .map(|image| (image, None))
            .chain(read.label_image.map(|image| (image, Some(LayerKind::Labels))));

        for (image, kind) in images {
            let kind = kind.unwrap_or(if image.is_label() {
                LayerKind::Labels
            } else {
                LayerKind::Image
            });
            let name = self.unique_name(&image.name);
            let pyramid =
                to_multiscale_chunked_image(&image, &self.service.config().multiscale_options())?;
            let visible = self.service.config().ui.layers_visible_by_default;

            register_layer(self.service.context_mut(), &name, kind, visible)?;
            tracing::info!(
                layer = %name,
                levels = pyramid.num_levels(),
                "loaded layer"
            );
            self.layers.push(LoadedLayer { name, kind, pyramid });
        }

        Ok(())
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.layers.iter().any(|l| l.name == name);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn selected_layer(&self) -> Option<&LoadedLayer> {
        self.layers.get(self.selected)
    }

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Main row
                Constraint::Min(0),    // Layers and image
                Constraint::Length(1), // Status line
            ])
            .split(size);

        self.render_main_row(frame, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(chunks[1]);

        self.layer_view
            .render(frame, content_chunks[0], self.service.context(), self.selected);
        self.image_view.render(
            frame,
            content_chunks[1],
            self.selected_layer(),
            self.level,
        );

        self.render_status_line(frame, chunks[2]);

        if self.show_help {
            self.render_help_overlay(frame, size);
        }
    }

    fn render_main_row(&self, frame: &mut Frame, area: Rect) {
        let context = self.service.context();
        let mut spans = vec![Span::styled(
            format!(" {} ", context.id),
            Style::default().add_modifier(Modifier::BOLD),
        )];

        for id in self.main_row.children() {
            spans.push(Span::raw("| "));
            spans.push(Span::styled(
                self.main_row_label(id),
                self.layer_view.control_style(),
            ));
        }

        spans.push(Span::raw(format!(
            " | {} screenshot(s)",
            self.service.screenshots().len()
        )));

        let row = Paragraph::new(Line::from(spans)).style(self.layer_view.background_style());
        frame.render_widget(row, area);
    }

    /// Label for a control in the main row, looked up by id
    fn main_row_label(&self, id: &str) -> String {
        match &self.service.context().main.screenshot_button {
            Some(button) if button.input_id == id => {
                let marker = if button.checked { "[x]" } else { "[ ]" };
                format!("{} {} (s)", marker, button.tooltip)
            }
            _ => id.to_string(),
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let (content, style) = match (&self.status_message, self.service.last_error()) {
            (Some(message), _) => (message.clone(), Style::default()),
            (None, Some(error)) => (error.to_string(), Style::default().fg(Color::Red)),
            (None, None) => (
                "j/k select | space toggle | s screenshot | ? help".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        };

        frame.render_widget(Paragraph::new(content).style(style), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_text = r#"
imview - Help

Layers:
  j/k       - Move up/down
  space/v   - Toggle visibility of the selected layer
  o         - Show only the selected layer
  a         - Show all layers

Image:
  h/l       - Previous/next pyramid level

Other:
  s         - Take a screenshot
  ?         - Toggle this help
  q         - Quit
"#;

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let help_area = centered_rect(60, 70, area);
        frame.render_widget(Clear, help_area);
        frame.render_widget(Paragraph::new(help_text).block(block), help_area);
    }

    /// Handle a key press, returns true if app should quit
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let Some(action) = normal_mode_action(code) else {
            return false;
        };
        self.status_message = None;

        let result = match action {
            Action::Quit => return true,
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                Ok(())
            }
            Action::Cancel => {
                self.show_help = false;
                Ok(())
            }
            Action::MoveDown => {
                if self.selected + 1 < self.layers.len() {
                    self.selected += 1;
                    self.level = 0;
                }
                Ok(())
            }
            Action::MoveUp => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.level = 0;
                }
                Ok(())
            }
            Action::NextLevel => {
                if let Some(layer) = self.selected_layer() {
                    self.level = (self.level + 1).min(layer.pyramid.num_levels() - 1);
                }
                Ok(())
            }
            Action::PrevLevel => {
                self.level = self.level.saturating_sub(1);
                Ok(())
            }
            Action::ToggleVisibility => self.toggle_selected(),
            Action::Solo => self.solo_selected(),
            Action::ShowAll => self.show_all(),
            Action::Screenshot => self.press_screenshot_button(),
        };

        if let Err(e) = result {
            self.status_message = Some(e.to_string());
        }
        self.tick();
        false
    }

    /// Apply queued commands
    pub fn tick(&mut self) {
        let before = self.service.screenshots().len();
        self.service.process_pending();

        if let Some(error) = self.service.take_last_error() {
            self.status_message = Some(error.to_string());
        } else if let Some(shot) = self.service.screenshots()[before..].last() {
            self.status_message = Some(match &shot.path {
                Some(path) => format!("Screenshot saved to {}", path.display()),
                None => format!("Screenshot {} captured", shot.id),
            });
        }
    }

    fn toggle_selected(&self) -> ViewerResult<()> {
        let Some(layer) = self.selected_layer() else {
            return Ok(());
        };
        self.handle
            .send(ViewerCommand::ToggleLayerVisibility(layer.name.clone()))
    }

    fn solo_selected(&self) -> ViewerResult<()> {
        for (i, layer) in self.layers.iter().enumerate() {
            self.handle.send(ViewerCommand::SetLayerVisibility {
                name: layer.name.clone(),
                visible: i == self.selected,
            })?;
        }
        Ok(())
    }

    fn show_all(&self) -> ViewerResult<()> {
        for layer in &self.layers {
            self.handle.send(ViewerCommand::SetLayerVisibility {
                name: layer.name.clone(),
                visible: true,
            })?;
        }
        Ok(())
    }

    fn press_screenshot_button(&mut self) -> ViewerResult<()> {
        let handle = self.handle.clone();
        let Some(button) = self.service.context_mut().main.screenshot_button.as_mut() else {
            return Ok(());
        };
        button.activate(&handle)
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
