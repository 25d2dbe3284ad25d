//! Page and image edit state: rotations and deletions kept in a JSON sidecar.

mod session;
mod state;

pub use session::{count_text_pages, EditSession, EditSource, LINES_PER_PAGE};
pub use state::{DeletedKey, EditState};

/// Errors from reading or writing edit state.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sidecar: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tool(#[from] formshift_av::Error),

    #[error("rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),

    #[error("index {index} out of range ({count} pages)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("nothing to edit")]
    Empty,
}
