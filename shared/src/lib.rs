use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub mod ink;
pub mod surface_format;

pub use ink::{decode_ink, encode_ink, InkDecodeError, InkDrawing, InkStroke};
pub use surface_format::{decode_surface_file, encode_surface_file, SurfaceFileDecodeError};

/// A position. Depending on context it is either normalized (0..1 of the
/// container) or in pixels.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn clamp(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn clamp_unit(value: f32) -> f32 {
    value.max(0.0).min(1.0)
}

/// Pixel size of the container a surface is rendered into.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Resolution-independent placement: position as a fraction of the
/// container, a unitless scale and a rotation in degrees.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct NormalizedTransform {
    pub position: Point,
    pub scale: f32,
    pub rotation_degrees: f32,
}

impl Default for NormalizedTransform {
    fn default() -> Self {
        Self {
            position: Point::new(0.5, 0.5),
            scale: 1.0,
            rotation_degrees: 0.0,
        }
    }
}

impl NormalizedTransform {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Pixel position and scale inside `container`. Scale is
    /// resolution-independent and passes through unchanged.
    pub fn to_pixel_space(&self, container: Size) -> (Point, f32) {
        (
            Point::new(
                self.position.x * container.width,
                self.position.y * container.height,
            ),
            self.scale,
        )
    }

    /// Inverse of the position half of [`Self::to_pixel_space`]. An empty
    /// container axis maps to 0.
    pub fn from_pixel_position(pixel: Point, container: Size) -> Point {
        Point::new(
            per_axis(pixel.x, container.width),
            per_axis(pixel.y, container.height),
        )
    }

    pub fn clamp_position(&mut self) {
        self.position = self.position.clamp();
    }
}

fn per_axis(value: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        value / extent
    } else {
        0.0
    }
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct StickerId(String);

impl StickerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StickerKind {
    Text,
    Emoji,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Sticker {
    pub id: StickerId,
    pub kind: StickerKind,
    pub content: String,
    pub transform: NormalizedTransform,
}

/// Everything about a day's surface that survives across sessions.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, Default, PartialEq)]
pub struct SurfaceRecord {
    pub background_image: Option<Vec<u8>>,
    pub background: NormalizedTransform,
    pub stickers: Vec<Sticker>,
    pub drawing: Option<Vec<u8>>,
}

impl SurfaceRecord {
    pub fn is_empty(&self) -> bool {
        self.background_image.is_none() && self.stickers.is_empty() && self.drawing.is_none()
    }
}

/// Identity of a day record: the calendar date it starts on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Any instant during a day maps to that day.
    pub fn containing(moment: NaiveDateTime) -> Self {
        Self(moment.date())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn start(self) -> NaiveDateTime {
        self.0.and_time(chrono::NaiveTime::MIN)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(value.trim(), Self::FORMAT).map(Self)
    }
}
