//! Layer list
//!
//! One row per registered layer, in registration order, showing the
//! visibility control currently on screen plus the layer kind and opacity.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use imview_core::{ContrastStyle, ViewerContext};

use crate::widgets::ControlIndicator;

/// Layer list state
pub struct LayerView {
    /// Configured background colour, RGB in [0, 1]
    background: [f32; 3],
    contrast: ContrastStyle,
}

impl LayerView {
    pub fn new(background: [f32; 3]) -> Self {
        Self {
            background,
            contrast: ContrastStyle::for_background(background),
        }
    }

    pub fn background_color(&self) -> Color {
        let [r, g, b] = self.background.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Color::Rgb(r, g, b)
    }

    pub fn background_style(&self) -> Style {
        Style::default().bg(self.background_color())
    }

    /// Style for contrast-sensitive controls
    pub fn control_style(&self) -> Style {
        self.background_style()
            .fg(ControlIndicator::glyph_color(self.contrast))
    }

    /// Render the layer list
    pub fn render(&self, frame: &mut Frame, area: Rect, context: &ViewerContext, selected: usize) {
        let items: Vec<ListItem> = context
            .layers
            .ui_layers
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let indicator = ControlIndicator::new(entry, context.contrast);
                let (kind, opacity) = context
                    .layers
                    .actor_context
                    .get(&entry.name)
                    .map(|actor| (actor.kind.name(), actor.opacity))
                    .unwrap_or(("?", 0.0));

                let mut name_style = Style::default();
                if i == selected {
                    name_style = name_style.add_modifier(Modifier::REVERSED);
                }

                ListItem::new(Line::from(vec![
                    indicator.as_span(),
                    Span::raw(" "),
                    Span::styled(entry.name.clone(), name_style),
                    Span::styled(
                        format!(" {} {:.0}%", kind, opacity * 100.0),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let title = format!("Layers ({})", context.layers.ui_layers.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(self.background_style());

        frame.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_color() {
        let view = LayerView::new([1.0, 0.0, 0.5]);
        assert_eq!(view.background_color(), Color::Rgb(255, 0, 128));
    }

    #[test]
    fn test_contrast_from_background() {
        let view = LayerView::new([0.9, 0.9, 0.9]);
        assert_eq!(view.control_style().fg, Some(Color::Black));
    }
}
