//! Core type definitions shared by the registry, the batch model and the CLI.

use serde::{Deserialize, Serialize};

/// The conversion screen a batch belongs to.
///
/// Each kind has its own picker extensions, its own registry table, and its
/// own converter backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    /// Video container conversion through ffmpeg.
    Video,
    /// Audio conversion through ffmpeg.
    Audio,
    /// Raster image re-encoding.
    Image,
    /// Document conversion through pandoc.
    Document,
    /// PDF to DOCX or plain text.
    Pdf,
    /// PDF pages rendered to one image per page.
    PdfToImage,
    /// Images placed onto PDF pages.
    ImageToPdf,
}

impl MediaKind {
    /// Every media kind, in menu order.
    pub const ALL: [MediaKind; 7] = [
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Image,
        MediaKind::Document,
        MediaKind::Pdf,
        MediaKind::PdfToImage,
        MediaKind::ImageToPdf,
    ];

    /// Returns the string representation of this media kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Pdf => "pdf",
            MediaKind::PdfToImage => "pdf-to-image",
            MediaKind::ImageToPdf => "image-to-pdf",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "image" => Ok(MediaKind::Image),
            "document" | "doc" => Ok(MediaKind::Document),
            "pdf" => Ok(MediaKind::Pdf),
            "pdf-to-image" | "pdf2image" => Ok(MediaKind::PdfToImage),
            "image-to-pdf" | "image2pdf" => Ok(MediaKind::ImageToPdf),
            _ => Err(crate::Error::invalid_input(format!(
                "unknown media kind: {s}"
            ))),
        }
    }
}

/// Application colour theme persisted in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(crate::Error::invalid_input(format!("unknown theme: {s}"))),
        }
    }
}
