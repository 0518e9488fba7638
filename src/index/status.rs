//! How a scan of the entry chain ended.
//!
//! A scan never fails as a whole because of bad archive data.  Whatever was
//! indexed before the problem is kept and the problem is recorded here.

use std::fmt;

use thiserror::Error;

use crate::header::DecodeError;

/// Why a scan stopped before reaching the trailer.
#[derive(Error, Debug)]
pub enum ScanAbort {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("payload of {name:?} declares {declared} bytes but only {available} remain")]
    TruncatedPayload { name: String, declared: u64, available: u64 },
    #[error("duplicate entry name {0:?}")]
    DuplicateName(String),
}

#[derive(Debug)]
pub enum ScanStatus {
    /// `TRAILER!!!` reached.
    Complete,
    /// The source ended on a header boundary with no trailer.
    Exhausted { offset: u64 },
    /// Scan stopped at the header starting at `offset`.
    Aborted { offset: u64, reason: ScanAbort },
}

impl ScanStatus {
    /// True unless the trailer was reached.
    pub fn is_partial(&self) -> bool {
        !matches!(self, ScanStatus::Complete)
    }

    pub fn abort_reason(&self) -> Option<&ScanAbort> {
        match self {
            ScanStatus::Aborted { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Complete => write!(f, "complete"),
            ScanStatus::Exhausted { offset } => {
                write!(f, "partial: archive ends at offset {offset} without a trailer")
            }
            ScanStatus::Aborted { offset, reason } => {
                write!(f, "partial: scan aborted at offset {offset}: {reason}")
            }
        }
    }
}

/// What to do when a name is seen a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Later entry replaces the earlier one.
    #[default]
    KeepLast,
    /// Later entry is skipped.
    KeepFirst,
    /// Scan aborts at the duplicate.
    Reject,
}
