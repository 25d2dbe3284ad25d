//! Batch list model: the ordered entries of one conversion screen.

mod entry;
mod list;

pub use entry::{format_megabytes, Dpi, EntryOptions, EntryStatus, FileEntry};
pub use list::{BatchList, BatchStep, BatchSummary, GlobalConversion, DEFAULT_CAPACITY};

use formshift_common::EntryId;

/// Errors returned by batch list operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),

    #[error("'{choice}' is not offered for {file}")]
    IllegalChoice { choice: String, file: String },

    #[error(transparent)]
    Choice(#[from] crate::registry::ChoiceError),
}
