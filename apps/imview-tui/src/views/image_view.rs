//! Image panel
//!
//! Shows one pyramid level of the selected layer:
//! - geometry (size, spacing, origin, world centre)
//! - chunk layout
//! - a character preview of the middle slice

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use imview_core::utils::{index_to_world, Image};

use crate::app::LoadedLayer;

const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Image panel state
pub struct ImageView;

impl ImageView {
    pub fn new() -> Self {
        Self
    }

    /// Render the image panel
    pub fn render(&self, frame: &mut Frame, area: Rect, layer: Option<&LoadedLayer>, level: usize) {
        let Some(layer) = layer else {
            let block = Block::default().title("No Layer").borders(Borders::ALL);
            let paragraph =
                Paragraph::new("Pass .npy or .npz files on the command line").block(block);
            frame.render_widget(paragraph, area);
            return;
        };
        let Some(scale) = layer.pyramid.scales.get(level) else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);

        let title = format!(
            "{} - level {}/{}",
            layer.name,
            level + 1,
            layer.pyramid.num_levels()
        );
        let mut lines = geometry_lines(&scale.image);
        lines.push(Line::from(vec![
            Span::raw("Chunks: "),
            Span::styled(
                format!(
                    "{} of {} px (grid {})",
                    scale.chunk_count(),
                    layer.pyramid.chunk_size,
                    join(&scale.chunk_grid)
                ),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(" | shrink {}", join(&scale.factors))),
        ]));
        lines.push(Line::from(vec![
            Span::raw("Kind: "),
            Span::raw(layer.kind.name()),
            Span::raw(if layer.pyramid.is_label {
                " (mode downsampling)"
            } else {
                " (mean downsampling)"
            }),
        ]));

        let header = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let inner = chunks[1];
        let preview = preview_lines(
            &scale.image,
            inner.width.saturating_sub(2) as usize,
            inner.height.saturating_sub(2) as usize,
        );
        let block = Block::default().title("Preview").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(preview).block(block), inner);
    }
}

fn geometry_lines(image: &Image) -> Vec<Line<'static>> {
    let centre: Vec<f64> = image.size.iter().map(|&s| (s as f64 - 1.0) / 2.0).collect();
    let world = index_to_world(image, &centre)
        .map(|w| format_floats(&w))
        .unwrap_or_else(|e| e.to_string());
    let range = image
        .value_range()
        .map(|(lo, hi)| format!("{:.3} .. {:.3}", lo, hi))
        .unwrap_or_else(|| "empty".to_string());

    vec![
        Line::from(vec![
            Span::raw("Size: "),
            Span::styled(join(&image.size), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " {} {}",
                image.image_type.component_type.name(),
                image.image_type.components
            )),
        ]),
        Line::from(format!("Spacing: {}", format_floats(&image.spacing))),
        Line::from(format!("Origin: {}", format_floats(&image.origin))),
        Line::from(format!("Centre (world): {}", world)),
        Line::from(format!("Range: {}", range)),
    ]
}

/// Character rendering of the middle slice, nearest-neighbour scaled
fn preview_lines(image: &Image, width: usize, height: usize) -> Vec<Line<'static>> {
    let (Some(&nx), Some(&ny)) = (image.size.first(), image.size.get(1)) else {
        return Vec::new();
    };
    let Some((lo, hi)) = image.value_range() else {
        return Vec::new();
    };
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let z = image.size.get(2).map(|&nz| nz / 2);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let rows = height.min(ny);
    let cols = width.min(nx);
    (0..rows)
        .map(|r| {
            let y = r * ny / rows;
            let line: String = (0..cols)
                .map(|c| {
                    let x = c * nx / cols;
                    let mut index = vec![x, y];
                    index.extend(z);
                    let v = image.pixel(&index).unwrap_or(lo);
                    let t = ((v - lo) / span).clamp(0.0, 1.0);
                    RAMP[(t * (RAMP.len() - 1) as f64).round() as usize]
                })
                .collect();
            Line::from(line)
        })
        .collect()
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

fn format_floats(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.2}", v)).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use imview_core::utils::{ndarray, ndarray_to_image, NdarrayOptions};

    #[test]
    fn test_preview_ramp() {
        let array = ndarray::Array2::from_shape_vec((1, 2), vec![0.0f32, 1.0]).unwrap();
        let image = ndarray_to_image(&array, &NdarrayOptions::default()).unwrap();

        let lines = preview_lines(&image, 10, 10);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), " @");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&[64, 32, 8]), "64x32x8");
    }
}
