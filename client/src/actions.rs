use daybook_shared::{Point, Size, StickerId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CanvasConfig;
use crate::geometry::{hit_test, is_tap, normalized_delta, offset};
use crate::state::{GestureTarget, Surface};

/// Raw input from the three simultaneous gesture streams. A stream begins
/// with its first event. Drag values are in pixels; `translation` is the
/// offset from the pointer-down point.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum GestureEvent {
    #[serde(rename = "drag:change")]
    DragChange { translation: Point, location: Point },
    #[serde(rename = "drag:end")]
    DragEnd { translation: Point, location: Point },
    #[serde(rename = "pinch:change")]
    PinchChange { ratio: f32 },
    #[serde(rename = "pinch:end")]
    PinchEnd { ratio: f32 },
    #[serde(rename = "rotate:change")]
    RotateChange { degrees: f32 },
    #[serde(rename = "rotate:end")]
    RotateEnd { degrees: f32 },
}

/// A committed change produced by a finished gesture or tap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceChange {
    Moved(GestureTarget),
    Scaled(GestureTarget),
    Rotated(StickerId),
    Selected(Option<StickerId>),
    StickerAdded(StickerId),
}

impl SurfaceChange {
    /// Selection is transient; everything else must reach the store.
    pub fn needs_save(&self) -> bool {
        !matches!(self, SurfaceChange::Selected(_))
    }
}

#[derive(Clone, Debug)]
pub struct GestureRouter {
    config: CanvasConfig,
    container: Size,
}

impl GestureRouter {
    pub fn new(config: CanvasConfig, container: Size) -> Self {
        Self { config, container }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Applies one event. Live updates mutate the surface and return
    /// `None`; stream ends and taps return what they committed.
    pub fn dispatch(&self, surface: &mut Surface, event: GestureEvent) -> Option<SurfaceChange> {
        match event {
            GestureEvent::DragChange { translation, .. } => {
                self.drag_to(surface, translation);
                None
            }
            GestureEvent::DragEnd {
                translation,
                location,
            } => self.end_drag(surface, translation, location),
            GestureEvent::PinchChange { ratio } => {
                self.scale_to(surface, ratio);
                None
            }
            GestureEvent::PinchEnd { ratio } => {
                let target = self.scale_to(surface, ratio);
                surface.release_scale();
                target.map(SurfaceChange::Scaled)
            }
            GestureEvent::RotateChange { degrees } => {
                self.rotate_to(surface, degrees);
                None
            }
            GestureEvent::RotateEnd { degrees } => {
                let id = self.rotate_to(surface, degrees);
                surface.release_rotation();
                id.map(SurfaceChange::Rotated)
            }
        }
    }

    fn drag_to(&self, surface: &mut Surface, translation: Point) -> Option<GestureTarget> {
        if surface.is_gesture_detached() {
            return None;
        }
        let (target, start) = surface.capture_drag_start()?;
        let position = offset(start, normalized_delta(translation, self.container));
        surface.transform_mut(&target)?.position = position;
        surface.touch();
        Some(target)
    }

    fn end_drag(
        &self,
        surface: &mut Surface,
        translation: Point,
        location: Point,
    ) -> Option<SurfaceChange> {
        if surface.is_gesture_detached() {
            surface.release_drag();
            return None;
        }
        let (target, start) = surface.capture_drag_start()?;
        if is_tap(&self.config, translation) {
            let sole_stream = surface
                .gesture
                .as_ref()
                .is_some_and(|session| session.drag_is_only_stream());
            let restored = match surface.transform_mut(&target) {
                Some(transform) if transform.position != start => {
                    transform.position = start;
                    true
                }
                _ => false,
            };
            if restored {
                surface.touch();
            }
            surface.release_drag();
            if !sole_stream {
                return None;
            }
            return Some(self.tap(surface, location));
        }

        let position = offset(start, normalized_delta(translation, self.container));
        if let Some(transform) = surface.transform_mut(&target) {
            transform.position = position;
            if let GestureTarget::Sticker(_) = target {
                transform.clamp_position();
            }
        }
        surface.release_drag();
        surface.touch();
        debug!(day = %surface.day(), ?target, "drag committed");
        Some(SurfaceChange::Moved(target))
    }

    fn tap(&self, surface: &mut Surface, location: Point) -> SurfaceChange {
        let hit = hit_test(surface.stickers(), &self.config, self.container, location)
            .map(|sticker| sticker.id.clone());
        if let Some(id) = hit {
            surface.set_selection(Some(id.clone()));
            return SurfaceChange::Selected(Some(id));
        }
        surface.set_selection(None);
        match surface.commit_pending_text(self.config.default_sticker_position) {
            Some(id) => SurfaceChange::StickerAdded(id),
            None => SurfaceChange::Selected(None),
        }
    }

    fn scale_to(&self, surface: &mut Surface, ratio: f32) -> Option<GestureTarget> {
        if surface.is_gesture_detached() {
            return None;
        }
        let (target, initial) = surface.capture_initial_scale()?;
        surface.transform_mut(&target)?.scale = initial * ratio.max(0.0);
        surface.touch();
        Some(target)
    }

    fn rotate_to(&self, surface: &mut Surface, degrees: f32) -> Option<StickerId> {
        if surface.is_gesture_detached() {
            return None;
        }
        let (id, initial) = surface.capture_initial_rotation()?;
        let target = GestureTarget::Sticker(id.clone());
        surface.transform_mut(&target)?.rotation_degrees = initial + degrees;
        surface.touch();
        Some(id)
    }
}
