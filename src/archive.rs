//! High-level [`Archive`] API over an odc file on disk.
//!
//! ```no_run
//! use odcpio::archive::Archive;
//!
//! let mut ar = Archive::open("package.cpio")?;
//! for info in ar.list() {
//!     println!("{} ({} bytes)", info.name, info.size);
//! }
//! let text = ar.description()?;
//! println!("{}", String::from_utf8_lossy(&text));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::header::{EntryKind, HeaderRecord};
use crate::index::{ArchiveIndex, ExtractError, IndexOptions, OpenError, ScanStatus};

// ── EntryInfo ────────────────────────────────────────────────────────────────

/// Lightweight descriptor returned by [`Archive::list`].
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub name:        String,
    pub kind:        EntryKind,
    pub mode:        u32,
    pub uid:         u32,
    pub gid:         u32,
    pub size:        u64,
    pub data_offset: u64,
    pub modified:    Option<DateTime<Utc>>,
}

impl From<&HeaderRecord> for EntryInfo {
    fn from(h: &HeaderRecord) -> Self {
        EntryInfo {
            name:        h.name().to_owned(),
            kind:        h.kind(),
            mode:        h.mode(),
            uid:         h.uid(),
            gid:         h.gid(),
            size:        h.data_size(),
            data_offset: h.data_offset(),
            modified:    h.modified(),
        }
    }
}

// ── Archive ──────────────────────────────────────────────────────────────────

/// An indexed archive file.  The file handle is owned and closed on drop.
pub struct Archive {
    path:  PathBuf,
    index: ArchiveIndex<File>,
}

impl Archive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        Self::open_with(path, IndexOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, opts: IndexOptions) -> Result<Self, OpenError> {
        let path = path.as_ref().to_owned();
        let file = File::open(&path).map_err(|source| OpenError::File {
            path: path.clone(),
            source,
        })?;
        let index = ArchiveIndex::open_with(file, opts)?;
        Ok(Self { path, index })
    }

    pub fn list(&self) -> Vec<EntryInfo> {
        self.index.entries().into_iter().map(EntryInfo::from).collect()
    }

    pub fn stat(&self, name: &str) -> Option<&HeaderRecord> {
        self.index.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.has(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        self.index.read_entry_bytes(name)
    }

    pub fn description(&mut self) -> Result<Vec<u8>, ExtractError> {
        self.index.read_description()
    }

    pub fn status(&self) -> &ScanStatus {
        self.index.status()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
