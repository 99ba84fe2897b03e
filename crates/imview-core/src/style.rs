//! Contrast-sensitive styling
//!
//! Icons are drawn light on dark backgrounds and dark on light ones. Controls
//! carry a style class such as `invertibleButtonDark` so a front-end can pick
//! the matching artwork.

use serde::{Deserialize, Serialize};

use crate::context::ViewerContext;

/// Icon style chosen from the background luminance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContrastStyle {
    /// Light icons, for dark backgrounds
    #[default]
    Light,
    /// Dark icons, for light backgrounds
    Dark,
}

impl ContrastStyle {
    /// Pick the style for an RGB background in [0, 1]
    pub fn for_background(rgb: [f32; 3]) -> Self {
        if relative_luminance(rgb) > 0.5 {
            ContrastStyle::Dark
        } else {
            ContrastStyle::Light
        }
    }

    /// Suffix appended to style class names
    pub fn suffix(&self) -> &'static str {
        match self {
            ContrastStyle::Light => "Light",
            ContrastStyle::Dark => "Dark",
        }
    }
}

/// Rec. 709 luma of an RGB colour
pub fn relative_luminance([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Controls that accept a style class
pub trait Styled {
    fn set_style_class(&mut self, class: String);
}

/// Give a control the contrast-sensitive variant of `class_name`
pub fn apply_contrast_sensitive_style(
    context: &ViewerContext,
    class_name: &str,
    control: &mut impl Styled,
) {
    control.set_style_class(format!("{}{}", class_name, context.contrast.suffix()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case([0.1, 0.1, 0.1], ContrastStyle::Light)]
    #[case([0.0, 0.0, 0.0], ContrastStyle::Light)]
    #[case([1.0, 1.0, 1.0], ContrastStyle::Dark)]
    #[case([0.0, 1.0, 0.0], ContrastStyle::Dark)]
    #[case([0.0, 0.0, 1.0], ContrastStyle::Light)]
    fn test_style_for_background(#[case] rgb: [f32; 3], #[case] expected: ContrastStyle) {
        assert_eq!(ContrastStyle::for_background(rgb), expected);
    }
}
