use daybook_shared::{Point, Size, Sticker, StickerKind};

use crate::config::CanvasConfig;

/// Axis-aligned box in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn around(center: Point, size: Size) -> Self {
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        Self {
            min_x: center.x - half_w,
            min_y: center.y - half_h,
            max_x: center.x + half_w,
            max_y: center.y + half_h,
        }
    }

    pub fn expand(self, padding: f32) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Unscaled size of a sticker's glyph box.
pub fn glyph_size(config: &CanvasConfig, sticker: &Sticker) -> Size {
    match sticker.kind {
        StickerKind::Text => {
            let chars = sticker.content.chars().count().max(1) as f32;
            Size::new(
                chars * config.text_font_size * 0.6,
                config.text_font_size * 1.2,
            )
        }
        StickerKind::Emoji => Size::new(config.emoji_size, config.emoji_size),
    }
}

pub fn sticker_bounds(config: &CanvasConfig, sticker: &Sticker, container: Size) -> Bounds {
    let (center, scale) = sticker.transform.to_pixel_space(container);
    let glyph = glyph_size(config, sticker);
    let scale = scale.abs();
    Bounds::around(
        center,
        Size::new(glyph.width * scale, glyph.height * scale),
    )
}

pub fn hit_bounds(config: &CanvasConfig, sticker: &Sticker, container: Size) -> Bounds {
    sticker_bounds(config, sticker, container).expand(config.hit_padding)
}

/// Topmost sticker whose padded box contains `point` (pixels).
pub fn hit_test<'a>(
    stickers: &'a [Sticker],
    config: &CanvasConfig,
    container: Size,
    point: Point,
) -> Option<&'a Sticker> {
    stickers
        .iter()
        .rev()
        .find(|sticker| hit_bounds(config, sticker, container).contains(point))
}

pub fn is_tap(config: &CanvasConfig, translation: Point) -> bool {
    translation.x.abs() < config.tap_slop && translation.y.abs() < config.tap_slop
}

pub fn normalized_delta(translation: Point, container: Size) -> Point {
    let per_axis = |value: f32, extent: f32| if extent > 0.0 { value / extent } else { 0.0 };
    Point::new(
        per_axis(translation.x, container.width),
        per_axis(translation.y, container.height),
    )
}

pub fn offset(point: Point, delta: Point) -> Point {
    Point::new(point.x + delta.x, point.y + delta.y)
}

#[cfg(test)]
mod tests {
    use daybook_shared::{NormalizedTransform, StickerId};

    use super::*;

    fn emoji_at(id: &str, x: f32, y: f32) -> Sticker {
        Sticker {
            id: StickerId::new(id),
            kind: StickerKind::Emoji,
            content: "🙂".to_string(),
            transform: NormalizedTransform::at(Point::new(x, y)),
        }
    }

    #[test]
    fn padding_extends_hit_area() {
        let config = CanvasConfig::default();
        let container = Size::new(400.0, 400.0);
        let sticker = emoji_at("a", 0.5, 0.5);
        // 48px glyph centred on 200: edge at 224, padded edge at 244.
        let near = Point::new(240.0, 200.0);
        let far = Point::new(245.0, 200.0);
        assert!(hit_bounds(&config, &sticker, container).contains(near));
        assert!(!sticker_bounds(&config, &sticker, container).contains(near));
        assert!(!hit_bounds(&config, &sticker, container).contains(far));
    }

    #[test]
    fn scale_grows_the_box() {
        let config = CanvasConfig::default();
        let mut sticker = emoji_at("a", 0.5, 0.5);
        sticker.transform.scale = 2.0;
        let bounds = sticker_bounds(&config, &sticker, Size::new(400.0, 400.0));
        assert_eq!(bounds.max_x - bounds.min_x, 96.0);
    }

    #[test]
    fn text_box_tracks_length() {
        let config = CanvasConfig::default();
        let mut sticker = emoji_at("t", 0.5, 0.5);
        sticker.kind = StickerKind::Text;
        sticker.content = "Hello".to_string();
        let size = glyph_size(&config, &sticker);
        assert!((size.width - 72.0).abs() < 1e-4);
        assert!((size.height - 28.8).abs() < 1e-4);
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let config = CanvasConfig::default();
        let stickers = vec![emoji_at("below", 0.5, 0.5), emoji_at("above", 0.55, 0.5)];
        let hit = hit_test(&stickers, &config, Size::new(400.0, 400.0), Point::new(210.0, 200.0));
        assert_eq!(hit.map(|s| s.id.as_str()), Some("above"));
    }

    #[test]
    fn tap_boundary_is_exclusive() {
        let config = CanvasConfig::default();
        assert!(is_tap(&config, Point::new(4.0, 0.0)));
        assert!(is_tap(&config, Point::new(-4.9, 4.9)));
        assert!(!is_tap(&config, Point::new(5.0, 0.0)));
        assert!(!is_tap(&config, Point::new(0.0, -5.0)));
    }

    #[test]
    fn zero_container_yields_zero_delta() {
        let delta = normalized_delta(Point::new(30.0, 30.0), Size::new(0.0, 300.0));
        assert_eq!(delta, Point::new(0.0, 0.1));
    }
}
