//! Save slot implementations for [`crate::GameStorage`].
use std::cell::RefCell;
use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::GameStorage;
use crate::constants::DEFAULT_SAVE_FILE;
use crate::save::{SaveError, SaveState};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: SaveError,
    },
}

/// Plain-text save file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_FILE)
    }
}

impl GameStorage for FileStorage {
    type Error = StorageError;

    fn save_session(&self, state: &SaveState) -> Result<(), Self::Error> {
        fs::write(&self.path, state.to_text()).map_err(|err| self.io_error(err))
    }

    fn load_save(&self) -> Result<Option<SaveState>, Self::Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        SaveState::parse(&text)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn delete_save(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// In-memory slot. Clones share the slot, so a caller can keep a handle to
/// inspect what the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<SaveState>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn with_save(state: SaveState) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(state))),
        }
    }

    #[must_use]
    pub fn saved(&self) -> Option<SaveState> {
        *self.slot.borrow()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn save_session(&self, state: &SaveState) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(*state);
        Ok(())
    }

    fn load_save(&self) -> Result<Option<SaveState>, Self::Error> {
        Ok(*self.slot.borrow())
    }

    fn delete_save(&self) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}
