//! Visibility toggle indicator widget for the TUI.

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use imview_core::{ContrastStyle, LayerEntry};

/// Draws whichever of a layer's two controls is currently shown.
///
/// The glyph colour follows the contrast style so the icon stays readable
/// on the configured background:
/// - Light: white glyphs for dark backgrounds
/// - Dark: black glyphs for light backgrounds
pub struct ControlIndicator<'a> {
    entry: &'a LayerEntry,
    contrast: ContrastStyle,
}

impl<'a> ControlIndicator<'a> {
    pub fn new(entry: &'a LayerEntry, contrast: ContrastStyle) -> Self {
        Self { entry, contrast }
    }

    /// Glyph colour for a contrast style.
    pub fn glyph_color(contrast: ContrastStyle) -> Color {
        match contrast {
            ContrastStyle::Light => Color::White,
            ContrastStyle::Dark => Color::Black,
        }
    }

    /// Glyph for the control on screen.
    pub fn glyph(&self) -> &'static str {
        if self.entry.shows_visible() {
            "[o]"
        } else {
            "[-]"
        }
    }

    pub fn as_span(&self) -> Span<'static> {
        let mut style = Style::default().fg(Self::glyph_color(self.contrast));
        if self.entry.shows_visible() {
            style = style.add_modifier(Modifier::BOLD);
        } else {
            style = style.add_modifier(Modifier::DIM);
        }
        Span::styled(self.glyph(), style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_follows_shown_control() {
        let mut entry = LayerEntry::new("viewer", "ct-scan");
        assert_eq!(ControlIndicator::new(&entry, ContrastStyle::Light).glyph(), "[o]");

        entry.render(false);
        assert_eq!(ControlIndicator::new(&entry, ContrastStyle::Light).glyph(), "[-]");
    }

    #[test]
    fn test_glyph_colors() {
        assert_eq!(ControlIndicator::glyph_color(ContrastStyle::Light), Color::White);
        assert_eq!(ControlIndicator::glyph_color(ContrastStyle::Dark), Color::Black);
    }
}
