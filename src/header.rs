//! odc header codec: one fixed-layout `070707` record at a time.
//!
//! # Layout
//!
//! | Field | Width | Encoding |
//! |-------|-------|----------|
//! | magic | 6 | literal `"070707"` |
//! | dev, ino, mode, uid, gid, nlink, rdev | 6 each | ASCII octal |
//! | mtime | 11 | ASCII octal |
//! | namesize | 6 | ASCII octal, counts the trailing NUL |
//! | filesize | 11 | ASCII octal |
//! | name | namesize | NUL-terminated text |
//!
//! The payload (`filesize` bytes) follows the name directly; there is no
//! padding in this variant.  Every field is decoded strictly: a character
//! outside `0` to `7` is a [`DecodeError::MalformedOctal`], never a silent zero.
//!
//! The codec knows nothing about the archive as a whole.  It decodes the
//! record at the offset it is given and leaves the source positioned just
//! past the name.

use std::io::{self, Read, Seek, SeekFrom};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const MAGIC: &[u8; 6] = b"070707";
/// Bytes before the name: magic + 7×6 + 11 + 6 + 11.
pub const FIXED_HEADER_SIZE: u64 = 76;
/// Name of the entry that marks the logical end of the archive.
pub const TRAILER_NAME: &str = "TRAILER!!!";

const SMALL_FIELD: usize = 6;
const LARGE_FIELD: usize = 11;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Bad magic at offset {offset}: expected \"070707\", found {found:?}")]
    BadMagic { offset: u64, found: String },
    #[error("Truncated {field} field in header at offset {offset}")]
    TruncatedField { field: &'static str, offset: u64 },
    #[error("Malformed octal in {field} field at offset {offset}: {text:?}")]
    MalformedOctal { field: &'static str, offset: u64, text: String },
    #[error("Invalid name length 0 in header at offset {offset}")]
    InvalidNameLength { offset: u64 },
    #[error("Truncated name in header at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedName { offset: u64, expected: u32, actual: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── EntryKind ────────────────────────────────────────────────────────────────

/// File type carried in the high bits of `mode`.  Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Fifo,
    CharDevice,
    BlockDevice,
    Socket,
    Unknown,
}

impl EntryKind {
    const TYPE_MASK: u32 = 0o170000;

    pub fn from_mode(mode: u32) -> Self {
        match mode & Self::TYPE_MASK {
            0o100000 => EntryKind::Regular,
            0o040000 => EntryKind::Directory,
            0o120000 => EntryKind::Symlink,
            0o010000 => EntryKind::Fifo,
            0o020000 => EntryKind::CharDevice,
            0o060000 => EntryKind::BlockDevice,
            0o140000 => EntryKind::Socket,
            _        => EntryKind::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntryKind::Regular     => "file",
            EntryKind::Directory   => "dir",
            EntryKind::Symlink     => "symlink",
            EntryKind::Fifo        => "fifo",
            EntryKind::CharDevice  => "chr",
            EntryKind::BlockDevice => "blk",
            EntryKind::Socket      => "socket",
            EntryKind::Unknown     => "?",
        }
    }

    /// Kinds whose `data_size` must be zero.
    pub fn is_sizeless(&self) -> bool {
        matches!(self, EntryKind::Directory | EntryKind::Fifo)
    }
}

// ── HeaderRecord ─────────────────────────────────────────────────────────────

/// One decoded header.  Write-once: fields are only set by [`HeaderRecord::decode`].
///
/// 6-character fields are held in `u32` and 11-character fields in `u64`, wide
/// enough for the largest value their digit count can express.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    name:          String,
    device:        u32,
    inode:         u32,
    mode:          u32,
    uid:           u32,
    gid:           u32,
    link_count:    u32,
    rdev:          u32,
    modify_time:   u64,
    name_length:   u32,
    data_size:     u64,
    header_offset: u64,
    data_offset:   u64,
}

impl HeaderRecord {
    /// Decode the header that starts at `offset`.
    ///
    /// Seeks `source` to `offset` first, so the caller's cursor position is
    /// irrelevant.  On success the cursor sits just past the name; the payload
    /// is not touched.
    pub fn decode<R: Read + Seek>(source: &mut R, offset: u64) -> Result<Self, DecodeError> {
        source.seek(SeekFrom::Start(offset))?;

        let magic: [u8; SMALL_FIELD] = read_field(source, "magic", offset)?;
        if &magic != MAGIC {
            return Err(DecodeError::BadMagic {
                offset,
                found: String::from_utf8_lossy(&magic).into_owned(),
            });
        }

        let device      = read_small(source, "device", offset)?;
        let inode       = read_small(source, "inode", offset)?;
        let mode        = read_small(source, "mode", offset)?;
        let uid         = read_small(source, "uid", offset)?;
        let gid         = read_small(source, "gid", offset)?;
        let link_count  = read_small(source, "link_count", offset)?;
        let rdev        = read_small(source, "rdev", offset)?;
        let modify_time = read_large(source, "modify_time", offset)?;
        let name_length = read_small(source, "name_length", offset)?;
        let data_size   = read_large(source, "data_size", offset)?;

        if name_length < 1 {
            return Err(DecodeError::InvalidNameLength { offset });
        }

        let mut name_buf = vec![0u8; name_length as usize];
        let got = read_up_to(source, &mut name_buf)?;
        if got < name_buf.len() {
            return Err(DecodeError::TruncatedName {
                offset,
                expected: name_length,
                actual:   got,
            });
        }
        let end  = name_buf.iter().position(|&b| b == 0).unwrap_or(name_buf.len());
        let name = String::from_utf8_lossy(&name_buf[..end]).into_owned();

        let data_offset = Self::data_offset_for(offset, name_length);
        debug!(name = %name, header_offset = offset, data_offset, data_size, "decoded odc header");

        Ok(Self {
            name,
            device,
            inode,
            mode,
            uid,
            gid,
            link_count,
            rdev,
            modify_time,
            name_length,
            data_size,
            header_offset: offset,
            data_offset,
        })
    }

    /// Where the payload of a header at `header_offset` begins.
    pub fn data_offset_for(header_offset: u64, name_length: u32) -> u64 {
        header_offset + FIXED_HEADER_SIZE + u64::from(name_length)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn device(&self) -> u32 { self.device }
    pub fn inode(&self) -> u32 { self.inode }
    pub fn mode(&self) -> u32 { self.mode }
    pub fn uid(&self) -> u32 { self.uid }
    pub fn gid(&self) -> u32 { self.gid }
    pub fn link_count(&self) -> u32 { self.link_count }
    pub fn rdev(&self) -> u32 { self.rdev }
    pub fn modify_time(&self) -> u64 { self.modify_time }
    pub fn name_length(&self) -> u32 { self.name_length }
    pub fn data_size(&self) -> u64 { self.data_size }
    pub fn header_offset(&self) -> u64 { self.header_offset }
    pub fn data_offset(&self) -> u64 { self.data_offset }

    /// Offset of the header that follows this entry's payload.
    pub fn next_header_offset(&self) -> u64 {
        self.data_offset + self.data_size
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mode(self.mode)
    }

    pub fn is_trailer(&self) -> bool {
        self.name == TRAILER_NAME
    }

    /// `modify_time` as a UTC timestamp, if representable.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.modify_time).ok().and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

// ── Field helpers ────────────────────────────────────────────────────────────

/// Decode an ASCII-octal field.  Every byte must be `0` to `7`.
pub fn parse_octal(field: &'static str, offset: u64, text: &[u8]) -> Result<u64, DecodeError> {
    text.iter().try_fold(0u64, |acc, &b| match b {
        b'0'..=b'7' => Ok((acc << 3) | u64::from(b - b'0')),
        _ => Err(DecodeError::MalformedOctal {
            field,
            offset,
            text: String::from_utf8_lossy(text).into_owned(),
        }),
    })
}

fn read_field<R: Read, const N: usize>(
    reader: &mut R,
    field:  &'static str,
    offset: u64,
) -> Result<[u8; N], DecodeError> {
    let mut buf = [0u8; N];
    if read_up_to(reader, &mut buf)? < N {
        return Err(DecodeError::TruncatedField { field, offset });
    }
    Ok(buf)
}

fn read_small<R: Read>(reader: &mut R, field: &'static str, offset: u64) -> Result<u32, DecodeError> {
    let raw: [u8; SMALL_FIELD] = read_field(reader, field, offset)?;
    // Six octal digits fit in 18 bits.
    Ok(parse_octal(field, offset, &raw)? as u32)
}

fn read_large<R: Read>(reader: &mut R, field: &'static str, offset: u64) -> Result<u64, DecodeError> {
    let raw: [u8; LARGE_FIELD] = read_field(reader, field, offset)?;
    parse_octal(field, offset, &raw)
}

/// Fill as much of `buf` as the reader can supply; returns the byte count.
/// Unlike `read_exact`, a short source is reported as a count, not an error.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
