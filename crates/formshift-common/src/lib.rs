//! Formshift-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across formshift:
//!
//! - **Typed IDs**: A UUID wrapper identifying batch entries
//! - **Core Types**: Media kinds and the UI theme
//! - **Path Utilities**: Extension tables per media kind and output path derivation
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use formshift_common::{EntryId, MediaKind};
//! use formshift_common::paths::{converted_output_path, has_picker_extension};
//! use std::path::Path;
//!
//! let id = EntryId::new();
//! assert_ne!(id, EntryId::new());
//!
//! assert!(has_picker_extension(MediaKind::Audio, Path::new("song.MP3")));
//! assert_eq!(
//!     converted_output_path(Path::new("/music/a.mp3"), "wav"),
//!     Path::new("/music/a_converted.wav"),
//! );
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
