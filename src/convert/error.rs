use crate::registry::ChoiceError;
use formshift_common::MediaKind;

/// Why a single conversion failed. The entry records the message; the batch
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Choice(#[from] ChoiceError),

    #[error("{kind} conversion cannot produce '{target}'")]
    Unsupported { kind: MediaKind, target: String },

    #[error("every page was deleted, nothing to write")]
    NothingToWrite,

    #[error(transparent)]
    Tool(#[from] formshift_av::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
