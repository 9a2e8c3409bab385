use std::collections::HashSet;

use daybook_shared::{DayKey, NormalizedTransform, Point, Sticker, SurfaceRecord};

pub const MAX_STICKERS: usize = 500;
pub const MAX_ID_LEN: usize = 64;

pub fn parse_day(value: &str) -> Option<DayKey> {
    value.parse().ok()
}

/// Cleans a record received from a client before it is stored.
pub fn sanitize_record(record: SurfaceRecord) -> SurfaceRecord {
    let mut background = sanitize_transform(record.background);
    background.rotation_degrees = 0.0;
    let mut stickers = sanitize_stickers(record.stickers);
    let overflow = stickers.len().saturating_sub(MAX_STICKERS);
    if overflow > 0 {
        stickers.drain(0..overflow);
    }
    SurfaceRecord {
        background_image: record.background_image.filter(|bytes| !bytes.is_empty()),
        background,
        stickers,
        drawing: record.drawing.filter(|bytes| !bytes.is_empty()),
    }
}

fn sanitize_stickers(stickers: Vec<Sticker>) -> Vec<Sticker> {
    let mut unique = HashSet::new();
    stickers
        .into_iter()
        .filter_map(sanitize_sticker)
        .filter(|sticker| unique.insert(sticker.id.clone()))
        .collect()
}

fn sanitize_sticker(mut sticker: Sticker) -> Option<Sticker> {
    let id = sticker.id.as_str();
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return None;
    }
    if sticker.content.trim().is_empty() {
        return None;
    }
    sticker.transform = sanitize_transform(sticker.transform);
    Some(sticker)
}

fn sanitize_transform(transform: NormalizedTransform) -> NormalizedTransform {
    let defaults = NormalizedTransform::default();
    NormalizedTransform {
        position: normalize_point(transform.position).unwrap_or(defaults.position),
        scale: finite_or(transform.scale, defaults.scale),
        rotation_degrees: finite_or(transform.rotation_degrees, defaults.rotation_degrees),
    }
}

fn normalize_point(point: Point) -> Option<Point> {
    if !point.is_finite() {
        return None;
    }
    Some(point)
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
