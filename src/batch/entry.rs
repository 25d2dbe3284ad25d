use crate::registry::ConversionChoice;
use chrono::{DateTime, Utc};
use formshift_av::actions::PageSize;
use formshift_common::{EntryId, MediaKind};
use std::path::{Path, PathBuf};

/// Per-entry conversion state.
///
/// `Pending → InProgress → {Done, Failed}`. Converting again starts over
/// from `InProgress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    InProgress,
    Done,
    Failed(String),
}

impl EntryStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, EntryStatus::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntryStatus::Failed(_))
    }

    /// Short label for status columns.
    pub fn label(&self) -> &str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::InProgress => "converting",
            EntryStatus::Done => "done",
            EntryStatus::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Failed(reason) => write!(f, "failed: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Page render resolution for PDF to image conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dpi {
    /// Use the configured default.
    #[default]
    Auto,
    Fixed(u32),
}

impl Dpi {
    /// Resolutions offered besides `auto`.
    pub const CHOICES: [u32; 5] = [72, 96, 150, 300, 600];

    pub fn resolve(&self, auto: u32) -> u32 {
        match self {
            Dpi::Auto => auto,
            Dpi::Fixed(dpi) => *dpi,
        }
    }
}

impl std::fmt::Display for Dpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dpi::Auto => f.write_str("auto"),
            Dpi::Fixed(dpi) => write!(f, "{}", dpi),
        }
    }
}

impl std::str::FromStr for Dpi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Dpi::Auto);
        }
        match s.parse::<u32>() {
            Ok(dpi) if Dpi::CHOICES.contains(&dpi) => Ok(Dpi::Fixed(dpi)),
            _ => Err(format!(
                "unsupported dpi '{}' (expected auto, 72, 96, 150, 300 or 600)",
                s
            )),
        }
    }
}

/// Options that only some media kinds read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// PDF to image render resolution.
    pub dpi: Dpi,
    /// Page size for image to PDF.
    pub page_size: PageSize,
    /// Render document images in grayscale when producing a PDF.
    pub grayscale: bool,
}

/// One file enqueued for conversion.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: EntryId,
    pub kind: MediaKind,
    source_path: PathBuf,
    source_size_bytes: u64,
    pub choice: Option<ConversionChoice>,
    pub status: EntryStatus,
    pub output_path: Option<PathBuf>,
    pub output_size_bytes: Option<u64>,
    pub options: EntryOptions,
    pub added_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    pub fn new(kind: MediaKind, source_path: PathBuf, source_size_bytes: u64) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            source_path,
            source_size_bytes,
            choice: None,
            status: EntryStatus::Pending,
            output_path: None,
            output_size_bytes: None,
            options: EntryOptions::default(),
            added_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_size_bytes(&self) -> u64 {
        self.source_size_bytes
    }

    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn start(&mut self) {
        self.status = EntryStatus::InProgress;
        self.output_path = None;
        self.output_size_bytes = None;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
    }

    pub fn complete(&mut self, output_path: PathBuf, output_size_bytes: u64) {
        self.status = EntryStatus::Done;
        self.output_path = Some(output_path);
        self.output_size_bytes = Some(output_size_bytes);
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: &str) {
        self.status = EntryStatus::Failed(reason.to_string());
        self.output_path = None;
        self.output_size_bytes = None;
        self.finished_at = Some(Utc::now());
    }

    pub fn source_size_display(&self) -> String {
        format_megabytes(Some(self.source_size_bytes))
    }

    /// Output size, or the unknown-size placeholder when there is no output or it measured 0 bytes.
    pub fn output_size_display(&self) -> String {
        format_megabytes(self.output_size_bytes.filter(|b| *b > 0))
    }
}

/// Format a byte count as megabytes with two decimals.
pub fn format_megabytes(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{:.2} MB", b as f64 / (1024.0 * 1024.0)),
        None => "—".to_string(),
    }
}
