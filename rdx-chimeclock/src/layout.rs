//! Orientation-adaptive layout parameters for the clock screen.

use crate::common::Orientation;
use crate::config::LayoutConfig;

/// Padding around the logo image, in dp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub start: f32,
    pub end: f32,
}

/// The layout of one pass. Recomputed every time the host lays out the
/// screen; nothing is carried over between passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    pub orientation: Orientation,
    /// Clock text size, in sp.
    pub font_size: f32,
    /// Logo image height, in dp.
    pub image_height: f32,
    pub image_padding: Padding,
}

const PORTRAIT_FONT_SIZE: f32 = 70.0;
const LANDSCAPE_FONT_SIZE: f32 = 150.0;
const PORTRAIT_IMAGE_HEIGHT: f32 = 200.0;
const LANDSCAPE_IMAGE_HEIGHT: f32 = 150.0;
const PORTRAIT_EXTRA_TOP: f32 = 30.0;
const LANDSCAPE_TOP: f32 = 16.0;
const SIDE_PADDING: f32 = 16.0;

impl DisplayConfig {
    pub fn for_orientation(orientation: Orientation, layout: &LayoutConfig) -> Self {
        match orientation {
            Orientation::Portrait => Self {
                orientation,
                font_size: PORTRAIT_FONT_SIZE,
                image_height: PORTRAIT_IMAGE_HEIGHT,
                // Portrait draws under the status bar, so clear it first.
                image_padding: Padding {
                    top: layout.status_bar_inset + PORTRAIT_EXTRA_TOP,
                    start: SIDE_PADDING,
                    end: SIDE_PADDING,
                },
            },
            Orientation::Landscape => Self {
                orientation,
                font_size: LANDSCAPE_FONT_SIZE,
                image_height: LANDSCAPE_IMAGE_HEIGHT,
                image_padding: Padding {
                    top: LANDSCAPE_TOP,
                    start: SIDE_PADDING,
                    end: SIDE_PADDING,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_clears_the_status_bar() {
        let layout = LayoutConfig {
            status_bar_inset: 28.0,
            ..Default::default()
        };
        let display = DisplayConfig::for_orientation(Orientation::Portrait, &layout);
        assert_eq!(display.font_size, 70.0);
        assert_eq!(display.image_height, 200.0);
        assert_eq!(display.image_padding.top, 58.0);
        assert_eq!(display.image_padding.start, 16.0);
    }

    #[test]
    fn landscape_ignores_the_status_bar() {
        let layout = LayoutConfig {
            status_bar_inset: 28.0,
            ..Default::default()
        };
        let display = DisplayConfig::for_orientation(Orientation::Landscape, &layout);
        assert_eq!(display.orientation, Orientation::Landscape);
        assert_eq!(display.font_size, 150.0);
        assert_eq!(display.image_height, 150.0);
        assert_eq!(display.image_padding.top, 16.0);
        assert_eq!(display.image_padding.end, 16.0);
    }

    #[test]
    fn same_input_same_layout() {
        let layout = LayoutConfig::default();
        assert_eq!(
            DisplayConfig::for_orientation(Orientation::Portrait, &layout),
            DisplayConfig::for_orientation(Orientation::Portrait, &layout)
        );
    }
}
