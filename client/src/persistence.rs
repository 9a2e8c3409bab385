use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use daybook_shared::{
    decode_surface_file, encode_surface_file, DayKey, Sticker, StickerId, SurfaceFileDecodeError,
    SurfaceRecord,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::actions::{GestureEvent, GestureRouter, SurfaceChange};
use crate::state::{CanvasError, PhotoTicket, Surface};

pub const SURFACE_FILE_EXTENSION: &str = "dbs";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored surface for {day} is unreadable: {source}")]
    Decode {
        day: DayKey,
        #[source]
        source: SurfaceFileDecodeError,
    },
}

/// Day records keyed by start-of-day date. A record owns its stickers, so
/// deleting it deletes them.
pub trait DayStore {
    fn get_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StoreError>;
    fn save_surface(&mut self, day: DayKey, record: &SurfaceRecord) -> Result<(), StoreError>;
    fn delete_surface(&mut self, day: DayKey) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<DayKey, SurfaceRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DayStore for MemoryStore {
    fn get_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StoreError> {
        Ok(self.records.get(&day).cloned())
    }

    fn save_surface(&mut self, day: DayKey, record: &SurfaceRecord) -> Result<(), StoreError> {
        self.records.insert(day, record.clone());
        Ok(())
    }

    fn delete_surface(&mut self, day: DayKey) -> Result<bool, StoreError> {
        Ok(self.records.remove(&day).is_some())
    }
}

/// One surface file per day inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, day: DayKey) -> PathBuf {
        self.dir.join(format!("{day}.{SURFACE_FILE_EXTENSION}"))
    }
}

impl DayStore for FileStore {
    fn get_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StoreError> {
        let payload = match std::fs::read(self.path_for(day)) {
            Ok(payload) => payload,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        decode_surface_file(&payload)
            .map(Some)
            .map_err(|source| StoreError::Decode { day, source })
    }

    fn save_surface(&mut self, day: DayKey, record: &SurfaceRecord) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(day);
        let staging = path.with_extension(format!("{SURFACE_FILE_EXTENSION}.tmp"));
        std::fs::write(&staging, encode_surface_file(record))?;
        std::fs::rename(&staging, &path)?;
        Ok(())
    }

    fn delete_surface(&mut self, day: DayKey) -> Result<bool, StoreError> {
        match std::fs::remove_file(self.path_for(day)) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

/// Ties a store to a gesture router: opens day surfaces and writes them back
/// after every committed change. Saves are best-effort; failures are logged
/// and never retried.
#[derive(Debug)]
pub struct Journal<S> {
    store: S,
    router: GestureRouter,
}

impl<S: DayStore> Journal<S> {
    pub fn new(store: S, router: GestureRouter) -> Self {
        Self { store, router }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn router(&self) -> &GestureRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut GestureRouter {
        &mut self.router
    }

    /// A missing or unreadable record opens as a new, unsaved surface.
    pub fn open_day(&self, day: DayKey) -> Surface {
        match self.store.get_surface(day) {
            Ok(Some(record)) => {
                debug!(%day, stickers = record.stickers.len(), "surface loaded");
                Surface::from_record(day, record)
            }
            Ok(None) => Surface::new(day),
            Err(error) => {
                warn!(%day, %error, "failed to load surface, starting empty");
                Surface::new(day)
            }
        }
    }

    pub fn handle(&mut self, surface: &mut Surface, event: GestureEvent) -> Option<SurfaceChange> {
        let change = self.router.dispatch(surface, event);
        if change.as_ref().is_some_and(SurfaceChange::needs_save) {
            self.save(surface);
        }
        change
    }

    /// The "Done" action of text entry.
    pub fn commit_text(&mut self, surface: &mut Surface) -> Option<StickerId> {
        let id = surface.commit_pending_text(self.router.config().default_sticker_position)?;
        self.save(surface);
        Some(id)
    }

    pub fn add_emoji(
        &mut self,
        surface: &mut Surface,
        glyph: &str,
    ) -> Result<StickerId, CanvasError> {
        let id = surface.add_emoji(glyph, self.router.config().default_sticker_position)?;
        self.save(surface);
        Ok(id)
    }

    pub fn finish_photo_pick(
        &mut self,
        surface: &mut Surface,
        ticket: PhotoTicket,
        bytes: Option<Vec<u8>>,
    ) -> bool {
        let applied = surface.finish_photo_pick(ticket, bytes);
        if applied {
            self.save(surface);
        }
        applied
    }

    pub fn set_drawing(&mut self, surface: &mut Surface, drawing: Option<Vec<u8>>) {
        surface.set_drawing(drawing);
        self.save(surface);
    }

    pub fn clear_background(&mut self, surface: &mut Surface) -> bool {
        let cleared = surface.clear_background();
        if cleared {
            self.save(surface);
        }
        cleared
    }

    pub fn delete_sticker(
        &mut self,
        surface: &mut Surface,
        id: &StickerId,
    ) -> Result<Sticker, CanvasError> {
        let removed = surface.delete_sticker(id)?;
        self.save(surface);
        Ok(removed)
    }

    /// Removes the day record together with everything it owns.
    pub fn delete_day(&mut self, day: DayKey) -> bool {
        match self.store.delete_surface(day) {
            Ok(deleted) => deleted,
            Err(error) => {
                warn!(%day, %error, "failed to delete surface");
                false
            }
        }
    }

    pub fn save(&mut self, surface: &Surface) -> bool {
        let day = surface.day();
        match self.store.save_surface(day, &surface.to_record()) {
            Ok(()) => true,
            Err(error) => {
                warn!(%day, %error, "failed to save surface");
                false
            }
        }
    }
}
