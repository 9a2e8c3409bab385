use daybook_shared::Point;
use serde::{Deserialize, Serialize};

/// Tunables for gesture classification, hit-testing and sticker placement.
/// Distances are in pixels.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Movement below this on both axes makes a drag a tap.
    pub tap_slop: f32,
    pub hit_padding: f32,
    pub text_font_size: f32,
    pub emoji_size: f32,
    pub default_sticker_position: Point,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            tap_slop: 5.0,
            hit_padding: 20.0,
            text_font_size: 24.0,
            emoji_size: 48.0,
            default_sticker_position: Point::new(0.5, 0.5),
        }
    }
}

impl CanvasConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
