//! Durable storage for the raw entry text.

use std::cell::{Cell, RefCell};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::STORAGE_KEY;
use crate::error::StoreError;

/// A single key holding the newline-delimited roster.
pub trait EntryStore {
    /// `Ok(None)` when nothing was ever saved.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, text: &str) -> Result<(), StoreError>;
}

/// File-backed store, one file per storage key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/classspin/<STORAGE_KEY>`.
    pub fn at_default_location() -> Result<Self, StoreError> {
        let base = config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(base.join("classspin").join(STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}

impl EntryStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, text).map_err(io_err)
    }
}

/// In-process store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub value: RefCell<Option<String>>,
    pub fail_reads: bool,
    pub fail_writes: Cell<bool>,
    pub writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn with_value(text: &str) -> Self {
        Self {
            value: RefCell::new(Some(text.to_string())),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl EntryStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable);
        }
        Ok(self.value.borrow().clone())
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable);
        }
        *self.value.borrow_mut() = Some(text.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

impl<T: EntryStore + ?Sized> EntryStore for &T {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        (**self).save(text)
    }
}

impl<T: EntryStore + ?Sized> EntryStore for Box<T> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        (**self).save(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), None);
        store.save("Ava\nBen").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("Ava\nBen"));
        assert_eq!(*store.writes.borrow(), 1);
    }

    #[test]
    fn memory_store_failures_surface_as_unavailable() {
        let store = MemoryStore {
            fail_reads: true,
            fail_writes: Cell::new(true),
            ..MemoryStore::default()
        };
        assert!(matches!(store.load(), Err(StoreError::Unavailable)));
        assert!(matches!(store.save("x"), Err(StoreError::Unavailable)));
        assert_eq!(store.current(), None);
    }

    #[test]
    fn file_store_path_ends_with_storage_key() {
        let store = FileStore::new("/tmp/somewhere").path().to_path_buf();
        assert_eq!(store, PathBuf::from("/tmp/somewhere"));
        if let Ok(default) = FileStore::at_default_location() {
            assert!(default.path().ends_with(Path::new("classspin").join(STORAGE_KEY)));
        }
    }
}
