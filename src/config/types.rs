use formshift_av::actions::{PdfOptions, AUTO_DPI};
use formshift_av::ToolConfig;
use formshift_common::paths::DEFAULT_SIDECAR_SUFFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub tools: ToolConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub sidecar: SidecarConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory relative paths are resolved against (default: `~/.config/formshift`)
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Theme settings file
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.config/formshift").as_ref())
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("settings.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            settings_path: default_settings_path(),
        }
    }
}

impl PathsConfig {
    /// Settings file, resolved against `base_dir` when relative.
    pub fn settings_file(&self) -> PathBuf {
        let expanded = PathBuf::from(
            shellexpand::tilde(&self.settings_path.to_string_lossy()).as_ref(),
        );
        if expanded.is_absolute() {
            expanded
        } else {
            self.base_dir.join(expanded)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum entries per batch list
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    crate::batch::DEFAULT_CAPACITY
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SidecarConfig {
    /// Appended to the source stem to name the edit-state file
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_suffix() -> String {
    DEFAULT_SIDECAR_SUFFIX.to_string()
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_pdf_engine")]
    pub pdf_engine: String,

    #[serde(default = "default_main_font")]
    pub main_font: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_margin")]
    pub margin: String,
}

fn default_pdf_engine() -> String {
    PdfOptions::default().engine
}
fn default_main_font() -> String {
    PdfOptions::default().main_font
}
fn default_lang() -> String {
    PdfOptions::default().lang
}
fn default_margin() -> String {
    PdfOptions::default().margin
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pdf_engine: default_pdf_engine(),
            main_font: default_main_font(),
            lang: default_lang(),
            margin: default_margin(),
        }
    }
}

impl DocumentConfig {
    pub fn pdf_options(&self) -> PdfOptions {
        PdfOptions {
            engine: self.pdf_engine.clone(),
            main_font: self.main_font.clone(),
            lang: self.lang.clone(),
            margin: self.margin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PdfConfig {
    /// Resolution used when an entry's DPI is `auto`
    #[serde(default = "default_dpi")]
    pub default_dpi: u32,
}

fn default_dpi() -> u32 {
    AUTO_DPI
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            default_dpi: default_dpi(),
        }
    }
}
