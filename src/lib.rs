pub mod header;
pub mod index;
pub mod archive;

pub use header::{HeaderRecord, DecodeError, EntryKind, FIXED_HEADER_SIZE, TRAILER_NAME};
pub use index::{ArchiveIndex, IndexOptions, DuplicatePolicy, ScanStatus, ScanAbort, ExtractError, OpenError, DESCRIPTION_ENTRY};
pub use archive::{Archive, EntryInfo};
