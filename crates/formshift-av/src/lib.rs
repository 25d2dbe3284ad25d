//! # formshift-av
//!
//! External tool management and file conversion actions.
//!
//! This crate provides functionality for:
//! - Locating external converters (ffmpeg, pandoc, poppler, LibreOffice, img2pdf)
//! - Running them synchronously with captured output
//! - Staging outputs in a temporary workspace and moving them into place
//! - Re-encoding and rotating raster images natively
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use formshift_av::{actions, Tool, ToolConfig};
//! use std::path::Path;
//!
//! let tools = ToolConfig::default();
//! let ffmpeg = tools.resolve(Tool::Ffmpeg)?;
//! actions::transcode(&ffmpeg, Path::new("a.mp3"), Path::new("a_converted.wav"))?;
//! # Ok::<(), formshift_av::Error>(())
//! ```

pub mod actions;
pub mod command;
mod error;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_tool, check_tools, require_tool, Tool, ToolConfig, ToolInfo};
pub use workspace::Workspace;
