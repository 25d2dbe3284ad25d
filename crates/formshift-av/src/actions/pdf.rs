//! PDF operations backed by poppler-utils and LibreOffice.
//!
//! Page rendering goes through the [`PageRenderer`] trait so callers can
//! substitute their own rasterizer.

use crate::{Error, Result, ToolCommand};
use std::path::{Path, PathBuf};

/// Resolution used when the user leaves DPI on "auto".
pub const AUTO_DPI: u32 = 200;

const RENDER_PREFIX: &str = "page";

/// A page rasterized to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: usize,
    pub path: PathBuf,
}

/// Rasterizes every page of a PDF into PNG files.
pub trait PageRenderer {
    /// Render all pages of `pdf` at `dpi` into `out_dir`, ordered by page number.
    fn render(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<RenderedPage>>;
}

/// [`PageRenderer`] using `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Poppler {
    pdftoppm: PathBuf,
}

impl Poppler {
    pub fn new(pdftoppm: impl Into<PathBuf>) -> Self {
        Self {
            pdftoppm: pdftoppm.into(),
        }
    }
}

impl PageRenderer for Poppler {
    fn render(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<RenderedPage>> {
        if !pdf.exists() {
            return Err(Error::file_not_found(pdf));
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Rendering {:?} at {} dpi", pdf, dpi);

        ToolCommand::new(&self.pdftoppm)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(out_dir.join(RENDER_PREFIX))
            .execute()?;

        collect_rendered(out_dir)
    }
}

/// pdftoppm names pages `page-1.png` or zero-padded `page-01.png`
/// depending on the page count.
pub fn parse_rendered_page_number(file_name: &str, prefix: &str) -> Option<usize> {
    file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

fn collect_rendered(out_dir: &Path) -> Result<Vec<RenderedPage>> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(out_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(number) = parse_rendered_page_number(&name.to_string_lossy(), RENDER_PREFIX) {
            pages.push(RenderedPage {
                number,
                path: entry.path(),
            });
        }
    }
    if pages.is_empty() {
        return Err(Error::tool_failed("pdftoppm", "no pages were rendered"));
    }
    pages.sort_by_key(|p| p.number);
    Ok(pages)
}

/// Extract the page count from `pdfinfo` output.
pub fn parse_page_count(output: &str) -> Result<usize> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| Error::parse_error("pdfinfo", "no Pages line in output"))
}

/// Count the pages of a PDF.
pub fn page_count(pdfinfo: &Path, pdf: &Path) -> Result<usize> {
    if !pdf.exists() {
        return Err(Error::file_not_found(pdf));
    }
    let output = ToolCommand::new(pdfinfo).arg(pdf).execute()?;
    parse_page_count(&output.stdout)
}

/// Extract the text layer of a PDF, keeping the physical layout.
pub fn extract_text(pdftotext: &Path, pdf: &Path, output: &Path) -> Result<()> {
    if !pdf.exists() {
        return Err(Error::file_not_found(pdf));
    }
    ToolCommand::new(pdftotext)
        .arg("-layout")
        .arg(pdf)
        .arg(output)
        .execute()?;
    Ok(())
}

/// Convert a PDF into an editable DOCX through LibreOffice's PDF import filter.
///
/// LibreOffice always names its output after the input stem, so the result
/// is written next to `output` and then renamed.
pub fn convert_to_docx(soffice: &Path, pdf: &Path, output: &Path) -> Result<()> {
    if !pdf.exists() {
        return Err(Error::file_not_found(pdf));
    }
    let out_dir = output
        .parent()
        .ok_or_else(|| Error::InvalidInput(format!("no parent directory: {}", output.display())))?;

    #[cfg(feature = "tracing")]
    tracing::info!("Importing {:?} into DOCX", pdf);

    ToolCommand::new(soffice)
        .args([
            "--headless",
            "--infilter=writer_pdf_import",
            "--convert-to",
            "docx",
            "--outdir",
        ])
        .arg(out_dir)
        .arg(pdf)
        .execute()?;

    let stem = pdf
        .file_stem()
        .ok_or_else(|| Error::InvalidInput(format!("no file name: {}", pdf.display())))?;
    let produced = out_dir.join(format!("{}.docx", stem.to_string_lossy()));
    if !produced.exists() {
        return Err(Error::tool_failed("soffice", "no DOCX was produced"));
    }
    if produced != output {
        std::fs::rename(&produced, output)?;
    }
    Ok(())
}
