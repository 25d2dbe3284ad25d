//! External tool detection and management.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// External programs formshift delegates conversions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Audio/video transcoder.
    Ffmpeg,
    /// Document converter.
    Pandoc,
    /// Poppler page rasterizer.
    Pdftoppm,
    /// Poppler text extractor.
    Pdftotext,
    /// Poppler metadata reader (page counts).
    Pdfinfo,
    /// LibreOffice, used headless for PDF import.
    Soffice,
    /// Lossless image-to-PDF wrapper.
    Img2pdf,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Ffmpeg,
        Tool::Pandoc,
        Tool::Pdftoppm,
        Tool::Pdftotext,
        Tool::Pdfinfo,
        Tool::Soffice,
        Tool::Img2pdf,
    ];

    /// Executable name looked up on PATH.
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Pandoc => "pandoc",
            Tool::Pdftoppm => "pdftoppm",
            Tool::Pdftotext => "pdftotext",
            Tool::Pdfinfo => "pdfinfo",
            Tool::Soffice => "soffice",
            Tool::Img2pdf => "img2pdf",
        }
    }

    /// Argument that makes the tool print its version and exit.
    pub fn version_arg(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "-version",
            Tool::Pdftoppm | Tool::Pdftotext | Tool::Pdfinfo => "-v",
            Tool::Pandoc | Tool::Soffice | Tool::Img2pdf => "--version",
        }
    }
}

/// Optional explicit paths for each tool; unset tools are looked up on PATH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,
    #[serde(default)]
    pub pandoc: Option<PathBuf>,
    #[serde(default)]
    pub pdftoppm: Option<PathBuf>,
    #[serde(default)]
    pub pdftotext: Option<PathBuf>,
    #[serde(default)]
    pub pdfinfo: Option<PathBuf>,
    #[serde(default)]
    pub soffice: Option<PathBuf>,
    #[serde(default)]
    pub img2pdf: Option<PathBuf>,
}

impl ToolConfig {
    /// Configured override for `tool`, if any.
    pub fn configured(&self, tool: Tool) -> Option<&Path> {
        let path = match tool {
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Pandoc => &self.pandoc,
            Tool::Pdftoppm => &self.pdftoppm,
            Tool::Pdftotext => &self.pdftotext,
            Tool::Pdfinfo => &self.pdfinfo,
            Tool::Soffice => &self.soffice,
            Tool::Img2pdf => &self.img2pdf,
        };
        path.as_deref()
    }

    /// Resolve the executable for `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] when neither the configured path nor
    /// PATH provide the tool.
    pub fn resolve(&self, tool: Tool) -> Result<PathBuf> {
        get_tool_path(tool.binary(), self.configured(tool))
    }
}

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use formshift_av::check_tool;
///
/// let info = check_tool("pandoc");
/// if info.available {
///     println!("pandoc version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "--version")
}

/// Check if a tool is available using a custom version argument.
///
/// Poppler utilities print their version on stderr, and older releases exit
/// non-zero after doing so, so the first non-empty line of either stream is
/// used and any output counts as available.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() || !output.stderr.is_empty() => {
            let first_line = |bytes: &[u8]| {
                String::from_utf8_lossy(bytes)
                    .lines()
                    .find(|l| !l.trim().is_empty())
                    .map(|s| s.to_string())
            };
            let version = first_line(&output.stdout).or_else(|| first_line(&output.stderr));

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(name).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every tool formshift can delegate to.
pub fn check_tools(config: &ToolConfig) -> Vec<ToolInfo> {
    Tool::ALL
        .iter()
        .map(|tool| {
            let program = config
                .configured(*tool)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| tool.binary().to_string());
            let mut info = check_tool_with_arg(&program, tool.version_arg());
            info.name = tool.binary().to_string();
            info
        })
        .collect()
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}
