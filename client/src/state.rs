use daybook_shared::{
    DayKey, NormalizedTransform, Point, Sticker, StickerId, StickerKind, SurfaceRecord,
};
use thiserror::Error;
use tracing::debug;

use crate::text::PendingText;
use crate::util::make_id;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("a gesture is in progress")]
    GestureInProgress,
    #[error("no sticker with id {0}")]
    UnknownSticker(StickerId),
    #[error("sticker content is empty")]
    EmptyContent,
}

/// What a gesture mutates. Fixed for as long as any gesture stream is live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureTarget {
    Background,
    Sticker(StickerId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    DraggingBackground,
    DraggingSticker(StickerId),
    ScalingBackground,
    ScalingSticker(StickerId),
    RotatingSticker(StickerId),
}

/// Start-of-gesture values, captured once per stream. A detached session
/// lost its target to a reset and only waits for its streams to end.
#[derive(Clone, Debug)]
pub(crate) struct GestureSession {
    pub(crate) target: GestureTarget,
    pub(crate) drag_start: Option<Point>,
    pub(crate) initial_scale: Option<f32>,
    pub(crate) initial_rotation: Option<f32>,
    pub(crate) detached: bool,
}

impl GestureSession {
    fn new(target: GestureTarget) -> Self {
        Self {
            target,
            drag_start: None,
            initial_scale: None,
            initial_rotation: None,
            detached: false,
        }
    }

    fn is_finished(&self) -> bool {
        self.drag_start.is_none() && self.initial_scale.is_none() && self.initial_rotation.is_none()
    }

    pub(crate) fn drag_is_only_stream(&self) -> bool {
        self.initial_scale.is_none() && self.initial_rotation.is_none()
    }
}

/// Handed out when a photo pick starts; required to apply its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhotoTicket(u64);

/// One day's editable surface: background photo, stickers, and drawing.
#[derive(Debug)]
pub struct Surface {
    day: DayKey,
    pub(crate) background_image: Option<Vec<u8>>,
    pub(crate) background: NormalizedTransform,
    pub(crate) stickers: Vec<Sticker>,
    pub(crate) drawing: Option<Vec<u8>>,
    pub(crate) selected: Option<StickerId>,
    pub(crate) pending_text: PendingText,
    pub(crate) gesture: Option<GestureSession>,
    photo_picks_issued: u64,
    photo_pick_applied: u64,
    revision: u64,
}

impl Surface {
    pub fn new(day: DayKey) -> Self {
        Self::from_record(day, SurfaceRecord::default())
    }

    pub fn from_record(day: DayKey, record: SurfaceRecord) -> Self {
        let mut background = record.background;
        background.rotation_degrees = 0.0;
        Self {
            day,
            background_image: record.background_image.filter(|bytes| !bytes.is_empty()),
            background,
            stickers: record.stickers,
            drawing: record.drawing.filter(|bytes| !bytes.is_empty()),
            selected: None,
            pending_text: PendingText::default(),
            gesture: None,
            photo_picks_issued: 0,
            photo_pick_applied: 0,
            revision: 0,
        }
    }

    pub fn to_record(&self) -> SurfaceRecord {
        SurfaceRecord {
            background_image: self.background_image.clone(),
            background: self.background,
            stickers: self.stickers.clone(),
            drawing: self.drawing.clone(),
        }
    }

    pub fn day(&self) -> DayKey {
        self.day
    }

    pub fn background_image(&self) -> Option<&[u8]> {
        self.background_image.as_deref()
    }

    pub fn background(&self) -> &NormalizedTransform {
        &self.background
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn sticker(&self, id: &StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|sticker| &sticker.id == id)
    }

    pub fn drawing(&self) -> Option<&[u8]> {
        self.drawing.as_deref()
    }

    pub fn selected(&self) -> Option<&StickerId> {
        self.selected.as_ref()
    }

    pub fn pending_text(&self) -> &str {
        self.pending_text.as_str()
    }

    /// Bumped on every change a view could observe.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture_target(&self) -> Option<&GestureTarget> {
        self.gesture.as_ref().map(|session| &session.target)
    }

    pub(crate) fn is_gesture_detached(&self) -> bool {
        self.gesture.as_ref().is_some_and(|session| session.detached)
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        let Some(session) = &self.gesture else {
            return GesturePhase::Idle;
        };
        match &session.target {
            GestureTarget::Background => {
                if session.drag_start.is_some() {
                    GesturePhase::DraggingBackground
                } else if session.initial_scale.is_some() {
                    GesturePhase::ScalingBackground
                } else {
                    GesturePhase::Idle
                }
            }
            GestureTarget::Sticker(id) => {
                if session.drag_start.is_some() {
                    GesturePhase::DraggingSticker(id.clone())
                } else if session.initial_scale.is_some() {
                    GesturePhase::ScalingSticker(id.clone())
                } else if session.initial_rotation.is_some() {
                    GesturePhase::RotatingSticker(id.clone())
                } else {
                    GesturePhase::Idle
                }
            }
        }
    }

    pub fn select_sticker(&mut self, id: &StickerId) -> Result<(), CanvasError> {
        if self.gesture.is_some() {
            return Err(CanvasError::GestureInProgress);
        }
        if self.sticker(id).is_none() {
            return Err(CanvasError::UnknownSticker(id.clone()));
        }
        self.set_selection(Some(id.clone()));
        Ok(())
    }

    pub fn deselect(&mut self) -> Result<(), CanvasError> {
        if self.gesture.is_some() {
            return Err(CanvasError::GestureInProgress);
        }
        self.set_selection(None);
        Ok(())
    }

    pub(crate) fn set_selection(&mut self, selected: Option<StickerId>) {
        if self.selected != selected {
            self.selected = selected;
            self.touch();
        }
    }

    /// Feeds typed characters into the pending buffer one at a time.
    pub fn type_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        for ch in text.chars() {
            self.pending_text.push(ch);
        }
        self.touch();
    }

    /// Turns the pending buffer into a text sticker placed at `at`.
    pub fn commit_pending_text(&mut self, at: Point) -> Option<StickerId> {
        let had_text = !self.pending_text.is_empty();
        let Some(content) = self.pending_text.take() else {
            if had_text {
                self.touch();
            }
            return None;
        };
        Some(self.push_sticker(StickerKind::Text, content, at))
    }

    pub fn add_emoji(&mut self, glyph: &str, at: Point) -> Result<StickerId, CanvasError> {
        let glyph = glyph.trim();
        if glyph.is_empty() {
            return Err(CanvasError::EmptyContent);
        }
        Ok(self.push_sticker(StickerKind::Emoji, glyph.to_string(), at))
    }

    fn push_sticker(&mut self, kind: StickerKind, content: String, at: Point) -> StickerId {
        let id = make_id();
        debug!(day = %self.day, sticker = %id, ?kind, "sticker added");
        self.stickers.push(Sticker {
            id: id.clone(),
            kind,
            content,
            transform: NormalizedTransform::at(at),
        });
        self.touch();
        id
    }

    pub fn delete_sticker(&mut self, id: &StickerId) -> Result<Sticker, CanvasError> {
        if self.gesture.is_some() {
            return Err(CanvasError::GestureInProgress);
        }
        let index = self
            .stickers
            .iter()
            .position(|sticker| &sticker.id == id)
            .ok_or_else(|| CanvasError::UnknownSticker(id.clone()))?;
        let removed = self.stickers.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.touch();
        Ok(removed)
    }

    pub fn begin_photo_pick(&mut self) -> PhotoTicket {
        self.photo_picks_issued += 1;
        PhotoTicket(self.photo_picks_issued)
    }

    /// Applies a finished pick. Image bytes, scale and offsets are replaced
    /// together. A cancelled pick, or one older than the last applied pick,
    /// changes nothing.
    pub fn finish_photo_pick(&mut self, ticket: PhotoTicket, bytes: Option<Vec<u8>>) -> bool {
        let Some(bytes) = bytes.filter(|bytes| !bytes.is_empty()) else {
            return false;
        };
        if ticket.0 < self.photo_pick_applied {
            debug!(day = %self.day, ticket = ticket.0, "dropping superseded photo pick");
            return false;
        }
        self.photo_pick_applied = ticket.0;
        self.background_image = Some(bytes);
        self.reset_background();
        true
    }

    pub fn clear_background(&mut self) -> bool {
        if self.background_image.is_none() && self.background == NormalizedTransform::default() {
            return false;
        }
        self.background_image = None;
        self.reset_background();
        true
    }

    /// A live background gesture stops applying once the background resets.
    fn reset_background(&mut self) {
        self.background = NormalizedTransform::default();
        if let Some(session) = self
            .gesture
            .as_mut()
            .filter(|session| session.target == GestureTarget::Background)
        {
            debug!(day = %self.day, "background reset detached the live gesture");
            session.detached = true;
        }
        self.touch();
    }

    pub fn set_drawing(&mut self, drawing: Option<Vec<u8>>) {
        self.drawing = drawing.filter(|bytes| !bytes.is_empty());
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn transform(&self, target: &GestureTarget) -> Option<&NormalizedTransform> {
        match target {
            GestureTarget::Background => Some(&self.background),
            GestureTarget::Sticker(id) => self.sticker(id).map(|sticker| &sticker.transform),
        }
    }

    pub(crate) fn transform_mut(
        &mut self,
        target: &GestureTarget,
    ) -> Option<&mut NormalizedTransform> {
        match target {
            GestureTarget::Background => Some(&mut self.background),
            GestureTarget::Sticker(id) => self
                .stickers
                .iter_mut()
                .find(|sticker| &sticker.id == id)
                .map(|sticker| &mut sticker.transform),
        }
    }

    /// Starts a gesture if none is live: the selected sticker if any,
    /// otherwise the background.
    fn begin_gesture(&mut self) -> GestureTarget {
        if let Some(session) = &self.gesture {
            return session.target.clone();
        }
        let target = match &self.selected {
            Some(id) => GestureTarget::Sticker(id.clone()),
            None => GestureTarget::Background,
        };
        self.gesture = Some(GestureSession::new(target.clone()));
        target
    }

    pub(crate) fn capture_drag_start(&mut self) -> Option<(GestureTarget, Point)> {
        let target = self.begin_gesture();
        if let Some(start) = self.gesture.as_ref().and_then(|session| session.drag_start) {
            return Some((target, start));
        }
        let Some(start) = self.transform(&target).map(|transform| transform.position) else {
            self.release_if_finished();
            return None;
        };
        if let Some(session) = self.gesture.as_mut() {
            session.drag_start = Some(start);
        }
        Some((target, start))
    }

    pub(crate) fn capture_initial_scale(&mut self) -> Option<(GestureTarget, f32)> {
        let target = self.begin_gesture();
        if let Some(scale) = self.gesture.as_ref().and_then(|session| session.initial_scale) {
            return Some((target, scale));
        }
        let Some(scale) = self.transform(&target).map(|transform| transform.scale) else {
            self.release_if_finished();
            return None;
        };
        if let Some(session) = self.gesture.as_mut() {
            session.initial_scale = Some(scale);
        }
        Some((target, scale))
    }

    /// The background never rotates, so this yields nothing for it.
    pub(crate) fn capture_initial_rotation(&mut self) -> Option<(StickerId, f32)> {
        let GestureTarget::Sticker(id) = self.begin_gesture() else {
            self.release_if_finished();
            return None;
        };
        if let Some(rotation) = self
            .gesture
            .as_ref()
            .and_then(|session| session.initial_rotation)
        {
            return Some((id, rotation));
        }
        let Some(rotation) = self.sticker(&id).map(|sticker| sticker.transform.rotation_degrees)
        else {
            self.release_if_finished();
            return None;
        };
        if let Some(session) = self.gesture.as_mut() {
            session.initial_rotation = Some(rotation);
        }
        Some((id, rotation))
    }

    pub(crate) fn release_drag(&mut self) {
        if let Some(session) = self.gesture.as_mut() {
            session.drag_start = None;
        }
        self.release_if_finished();
    }

    pub(crate) fn release_scale(&mut self) {
        if let Some(session) = self.gesture.as_mut() {
            session.initial_scale = None;
        }
        self.release_if_finished();
    }

    pub(crate) fn release_rotation(&mut self) {
        if let Some(session) = self.gesture.as_mut() {
            session.initial_rotation = None;
        }
        self.release_if_finished();
    }

    fn release_if_finished(&mut self) {
        if self
            .gesture
            .as_ref()
            .is_some_and(GestureSession::is_finished)
        {
            self.gesture = None;
        }
    }
}
