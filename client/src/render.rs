//! Pixel-space layout of a surface. The model stays normalized; conversion
//! to pixels happens only here, once per frame, for whatever draws it.

use daybook_shared::{decode_ink, InkDrawing, Point, Size, StickerId, StickerKind};
use tracing::debug;

use crate::config::CanvasConfig;
use crate::geometry::{hit_bounds, Bounds};
use crate::state::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Heic,
}

impl ImageFormat {
    /// Identifies an image by its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            let brand = &bytes[8..12];
            if [b"heic", b"heix", b"mif1", b"msf1"]
                .iter()
                .any(|known| brand == known.as_slice())
            {
                return Some(Self::Heic);
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundLayout {
    pub format: ImageFormat,
    pub center: Point,
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StickerLayout {
    pub id: StickerId,
    pub kind: StickerKind,
    pub content: String,
    pub center: Point,
    pub scale: f32,
    pub rotation_degrees: f32,
    pub hit_box: Bounds,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokePath {
    pub color: String,
    pub width: f32,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceLayout {
    pub background: Option<BackgroundLayout>,
    /// Bottom to top.
    pub stickers: Vec<StickerLayout>,
    pub drawing: Option<Vec<StrokePath>>,
    pub pending_text: Option<String>,
}

pub fn layout(surface: &Surface, config: &CanvasConfig, container: Size) -> SurfaceLayout {
    SurfaceLayout {
        background: background_layout(surface, container),
        stickers: surface
            .stickers()
            .iter()
            .map(|sticker| {
                let (center, scale) = sticker.transform.to_pixel_space(container);
                StickerLayout {
                    id: sticker.id.clone(),
                    kind: sticker.kind,
                    content: sticker.content.clone(),
                    center,
                    scale,
                    rotation_degrees: sticker.transform.rotation_degrees,
                    hit_box: hit_bounds(config, sticker, container),
                    selected: surface.selected() == Some(&sticker.id),
                }
            })
            .collect(),
        drawing: drawing_layout(surface, container),
        pending_text: Some(surface.pending_text())
            .filter(|text| !text.is_empty())
            .map(str::to_string),
    }
}

fn background_layout(surface: &Surface, container: Size) -> Option<BackgroundLayout> {
    let bytes = surface.background_image()?;
    let Some(format) = ImageFormat::sniff(bytes) else {
        debug!(day = %surface.day(), len = bytes.len(), "background image not recognised");
        return None;
    };
    let (center, scale) = surface.background().to_pixel_space(container);
    Some(BackgroundLayout {
        format,
        center,
        scale,
    })
}

fn drawing_layout(surface: &Surface, container: Size) -> Option<Vec<StrokePath>> {
    let bytes = surface.drawing()?;
    let drawing = match decode_ink(bytes) {
        Ok(drawing) => drawing,
        Err(error) => {
            debug!(day = %surface.day(), %error, "drawing not decodable");
            return None;
        }
    };
    Some(stroke_paths(&drawing, container))
}

fn stroke_paths(drawing: &InkDrawing, container: Size) -> Vec<StrokePath> {
    drawing
        .strokes
        .iter()
        .filter(|stroke| !stroke.points.is_empty())
        .map(|stroke| StrokePath {
            color: stroke.color.clone(),
            width: stroke.size,
            points: stroke
                .points
                .iter()
                .map(|point| Point::new(point.x * container.width, point.y * container.height))
                .collect(),
        })
        .collect()
}
