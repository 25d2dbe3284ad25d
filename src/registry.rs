//! Conversion registry: legal `"from → to"` choices per media kind and source extension.
//!
//! The tables are static. Unknown extensions yield no choices and the batch
//! list refuses to enqueue such files.

use formshift_common::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the source and target side of a choice label.
pub const ARROW: &str = "→";

/// Errors raised while interpreting a choice label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceError {
    /// The label lacks the separator or one side is blank.
    #[error("invalid format selection: '{0}'")]
    InvalidSelection(String),
}

/// One legal conversion, displayed as `"from → to"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionChoice {
    from: String,
    to: String,
}

impl ConversionChoice {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parse a `"from → to"` label. Both sides are trimmed and must be non-empty.
    ///
    /// ```
    /// use formshift::registry::ConversionChoice;
    ///
    /// let choice = ConversionChoice::parse("mp3 → wav").unwrap();
    /// assert_eq!(choice.to(), "wav");
    /// assert!(ConversionChoice::parse("").is_err());
    /// ```
    pub fn parse(label: &str) -> Result<Self, ChoiceError> {
        let invalid = || ChoiceError::InvalidSelection(label.to_string());
        let (from, to) = label.split_once(ARROW).ok_or_else(invalid)?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(from, to))
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConversionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, ARROW, self.to)
    }
}

impl std::str::FromStr for ConversionChoice {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Route {
    extensions: &'static [&'static str],
    canonical: &'static str,
    targets: &'static [&'static str],
}

const VIDEO_TARGETS: &[&str] = &["mp4", "avi", "mkv", "mov"];
const IMAGE_TARGETS: &[&str] = &["png", "jpeg", "bmp", "tiff", "webp"];

const VIDEO: &[Route] = &[
    Route { extensions: &["mp4"], canonical: "mp4", targets: VIDEO_TARGETS },
    Route { extensions: &["avi"], canonical: "avi", targets: VIDEO_TARGETS },
    Route { extensions: &["mkv"], canonical: "mkv", targets: VIDEO_TARGETS },
    Route { extensions: &["mov"], canonical: "mov", targets: VIDEO_TARGETS },
];

const AUDIO: &[Route] = &[
    Route { extensions: &["mp3"], canonical: "mp3", targets: &["wav", "flac", "ogg"] },
    Route { extensions: &["wav"], canonical: "wav", targets: &["mp3", "flac", "ogg"] },
    Route { extensions: &["flac"], canonical: "flac", targets: &["mp3", "wav"] },
    Route { extensions: &["ogg"], canonical: "ogg", targets: &["mp3", "wav"] },
];

const IMAGE: &[Route] = &[
    Route { extensions: &["png"], canonical: "png", targets: IMAGE_TARGETS },
    Route { extensions: &["jpg", "jpeg"], canonical: "jpeg", targets: IMAGE_TARGETS },
    Route { extensions: &["bmp"], canonical: "bmp", targets: IMAGE_TARGETS },
    Route { extensions: &["tiff"], canonical: "tiff", targets: IMAGE_TARGETS },
    Route { extensions: &["webp"], canonical: "webp", targets: IMAGE_TARGETS },
];

const DOCUMENT: &[Route] = &[
    Route { extensions: &["txt"], canonical: "markdown", targets: &["pdf", "docx", "odt"] },
    Route { extensions: &["docx"], canonical: "docx", targets: &["pdf", "markdown", "odt"] },
    Route { extensions: &["odt"], canonical: "odt", targets: &["pdf", "markdown", "docx"] },
    Route { extensions: &["md"], canonical: "markdown", targets: &["pdf", "html"] },
    Route { extensions: &["html"], canonical: "html", targets: &["pdf", "docx"] },
];

const PDF: &[Route] = &[Route { extensions: &["pdf"], canonical: "pdf", targets: &["docx", "txt"] }];

const PDF_TO_IMAGE: &[Route] = &[Route {
    extensions: &["pdf"],
    canonical: "pdf",
    targets: &["png", "jpeg", "tiff"],
}];

const IMAGE_TO_PDF: &[Route] = &[
    Route { extensions: &["png"], canonical: "png", targets: &["pdf"] },
    Route { extensions: &["jpg", "jpeg"], canonical: "jpeg", targets: &["pdf"] },
    Route { extensions: &["bmp"], canonical: "bmp", targets: &["pdf"] },
    Route { extensions: &["gif"], canonical: "gif", targets: &["pdf"] },
];

fn routes(kind: MediaKind) -> &'static [Route] {
    match kind {
        MediaKind::Video => VIDEO,
        MediaKind::Audio => AUDIO,
        MediaKind::Image => IMAGE,
        MediaKind::Document => DOCUMENT,
        MediaKind::Pdf => PDF,
        MediaKind::PdfToImage => PDF_TO_IMAGE,
        MediaKind::ImageToPdf => IMAGE_TO_PDF,
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn route(kind: MediaKind, ext: &str) -> Option<&'static Route> {
    let ext = normalize(ext);
    routes(kind)
        .iter()
        .find(|r| r.extensions.contains(&ext.as_str()))
}

/// Canonical format name for `ext` (`jpg` is `jpeg`, `md` is `markdown`).
pub fn canonical_format(kind: MediaKind, ext: &str) -> Option<&'static str> {
    route(kind, ext).map(|r| r.canonical)
}

/// Ordered choices for a source extension. Empty when the extension is unknown.
///
/// ```
/// use formshift::registry::choices_for;
/// use formshift_common::MediaKind;
///
/// let labels: Vec<String> = choices_for(MediaKind::Audio, "flac")
///     .iter()
///     .map(|c| c.label())
///     .collect();
/// assert_eq!(labels, ["flac → mp3", "flac → wav"]);
/// ```
pub fn choices_for(kind: MediaKind, ext: &str) -> Vec<ConversionChoice> {
    route(kind, ext)
        .map(|r| {
            r.targets
                .iter()
                .map(|t| ConversionChoice::new(r.canonical, *t))
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `choice` is offered for `ext`.
pub fn is_legal(kind: MediaKind, ext: &str, choice: &ConversionChoice) -> bool {
    choices_for(kind, ext).contains(choice)
}

/// Every target of a media kind in first-seen order, for the global selector.
pub fn targets(kind: MediaKind) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for r in routes(kind) {
        for t in r.targets {
            if !out.contains(t) {
                out.push(t);
            }
        }
    }
    out
}

/// File extension written for a target format.
///
/// Pandoc's `markdown` and `plain` writers produce text files.
pub fn output_extension(kind: MediaKind, target: &str) -> String {
    match (kind, target) {
        (MediaKind::Document, "markdown" | "plain") => "txt".to_string(),
        _ => target.to_string(),
    }
}
