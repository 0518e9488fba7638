//! Name-keyed index over the header chain of an odc archive.
//!
//! [`ArchiveIndex::open`] walks the chain from offset 0: decode a header,
//! jump to `data_offset + data_size`, repeat until the `TRAILER!!!` entry or
//! the end of the source.  Every read names its own offset, so lookups never
//! depend on where an earlier call left the cursor.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::header::HeaderRecord;

pub mod status;

pub use status::{DuplicatePolicy, ScanAbort, ScanStatus};

/// The well-known entry returned by [`ArchiveIndex::read_description`].
pub const DESCRIPTION_ENTRY: &str = "description";

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Could not open file {path:?}: {source}")]
    File { path: PathBuf, source: io::Error },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Seek to offset {offset} failed: {source}")]
    SeekFailed { offset: u64, source: io::Error },
    #[error("Short read for {name:?}: expected {expected} bytes, got {actual}")]
    ShortRead { name: String, expected: u64, actual: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── IndexOptions ─────────────────────────────────────────────────────────────

/// Configuration for [`ArchiveIndex::open_with`].
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub duplicates: DuplicatePolicy,
}

// ── ArchiveIndex ─────────────────────────────────────────────────────────────

pub struct ArchiveIndex<R: Read + Seek> {
    source:     R,
    source_len: u64,
    entries:    HashMap<String, HeaderRecord>,
    status:     ScanStatus,
}

impl<R: Read + Seek> ArchiveIndex<R> {
    pub fn open(source: R) -> Result<Self, OpenError> {
        Self::open_with(source, IndexOptions::default())
    }

    /// Scan the whole header chain of `source`.
    ///
    /// Only a failure to size the source is an `Err`.  Bad archive data stops
    /// the scan, keeps what was indexed so far, and is reported by
    /// [`ArchiveIndex::status`].
    pub fn open_with(mut source: R, opts: IndexOptions) -> Result<Self, OpenError> {
        let source_len = source.seek(SeekFrom::End(0))?;
        let mut entries: HashMap<String, HeaderRecord> = HashMap::new();
        let mut offset = 0u64;

        let status = loop {
            if offset >= source_len {
                break ScanStatus::Exhausted { offset };
            }

            let header = match HeaderRecord::decode(&mut source, offset) {
                Ok(h)  => h,
                Err(e) => break ScanStatus::Aborted { offset, reason: e.into() },
            };
            if header.is_trailer() {
                break ScanStatus::Complete;
            }

            let next = header.next_header_offset();
            if next > source_len {
                break ScanStatus::Aborted {
                    offset,
                    reason: ScanAbort::TruncatedPayload {
                        name:      header.name().to_owned(),
                        declared:  header.data_size(),
                        available: source_len.saturating_sub(header.data_offset()),
                    },
                };
            }

            if header.kind().is_sizeless() && header.data_size() > 0 {
                warn!(
                    name = header.name(),
                    kind = header.kind().name(),
                    data_size = header.data_size(),
                    "entry type should carry no payload"
                );
            }

            match entries.entry(header.name().to_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(header);
                }
                Entry::Occupied(mut slot) => match opts.duplicates {
                    DuplicatePolicy::KeepLast => {
                        warn!(name = header.name(), offset, "duplicate entry replaces earlier one");
                        slot.insert(header);
                    }
                    DuplicatePolicy::KeepFirst => {
                        warn!(name = header.name(), offset, "duplicate entry ignored");
                    }
                    DuplicatePolicy::Reject => {
                        break ScanStatus::Aborted {
                            offset,
                            reason: ScanAbort::DuplicateName(slot.key().clone()),
                        };
                    }
                },
            }

            offset = next;
        };

        if status.is_partial() {
            warn!(entries = entries.len(), %status, "archive only partially indexed");
        } else {
            debug!(entries = entries.len(), "archive indexed");
        }

        Ok(Self { source, source_len, entries, status })
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&HeaderRecord> {
        self.entries.get(name)
    }

    /// Indexed entries, excluding the trailer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All indexed headers in archive order.
    pub fn entries(&self) -> Vec<&HeaderRecord> {
        let mut out: Vec<&HeaderRecord> = self.entries.values().collect();
        out.sort_by_key(|h| h.header_offset());
        out
    }

    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    /// Size of the source at open time.
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    // ── Extraction ───────────────────────────────────────────────────────────

    /// Read the whole payload of `name`.
    ///
    /// The source cursor is left after the payload.
    pub fn read_entry_bytes(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        let (offset, size) = match self.entries.get(name) {
            Some(h) => (h.data_offset(), h.data_size()),
            None    => return Err(ExtractError::NotFound(name.to_owned())),
        };

        self.source
            .seek(SeekFrom::Start(offset))
            .map_err(|source| ExtractError::SeekFailed { offset, source })?;

        let mut buf = Vec::new();
        let got = (&mut self.source).take(size).read_to_end(&mut buf)? as u64;
        if got < size {
            return Err(ExtractError::ShortRead {
                name:     name.to_owned(),
                expected: size,
                actual:   got,
            });
        }
        Ok(buf)
    }

    /// Payload of the [`DESCRIPTION_ENTRY`] entry.
    pub fn read_description(&mut self) -> Result<Vec<u8>, ExtractError> {
        self.read_entry_bytes(DESCRIPTION_ENTRY)
    }
}
