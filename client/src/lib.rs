//! Per-day annotation canvas: background photo, stickers and a freehand
//! drawing on one normalized surface, edited through drag, pinch and rotate
//! gestures that act on exactly one target at a time.

mod actions;
mod config;
mod geometry;
mod persistence;
mod render;
mod state;
mod text;
mod util;

pub use actions::{GestureEvent, GestureRouter, SurfaceChange};
pub use config::CanvasConfig;
pub use geometry::{glyph_size, hit_bounds, hit_test, is_tap, sticker_bounds, Bounds};
pub use persistence::{DayStore, FileStore, Journal, MemoryStore, StoreError};
pub use render::{
    layout, BackgroundLayout, ImageFormat, StickerLayout, StrokePath, SurfaceLayout,
};
pub use state::{CanvasError, GesturePhase, GestureTarget, PhotoTicket, Surface};
pub use text::PendingText;

pub use daybook_shared as shared;
