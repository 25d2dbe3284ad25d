use super::ConversionError;
use crate::batch::{Dpi, FileEntry};
use crate::config::Config;
use crate::edit::EditState;
use crate::registry::{self, ChoiceError, ConversionChoice};
use formshift_av::actions::{
    self, ImageTarget, PageRenderer, PageSize, PandocRequest, PdfOptions, Poppler, AUTO_DPI,
};
use formshift_av::{Tool, ToolConfig, Workspace};
use formshift_common::paths::{converted_output_path, images_output_dir, sidecar_path, DEFAULT_SIDECAR_SUFFIX};
use formshift_common::MediaKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

type Result<T> = std::result::Result<T, ConversionError>;

/// Where a successful conversion wrote its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSuccess {
    pub output_path: PathBuf,
    /// 0 when the output could not be measured.
    pub output_size_bytes: u64,
}

/// Runs conversions synchronously, one entry at a time.
///
/// Every output is staged in a [`Workspace`] next to its destination and
/// moved into place only when the backend succeeds.
pub struct Invoker {
    tools: ToolConfig,
    pdf: PdfOptions,
    sidecar_suffix: String,
    auto_dpi: u32,
    renderer: Option<Box<dyn PageRenderer>>,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

impl Invoker {
    pub fn new(tools: ToolConfig) -> Self {
        Self {
            tools,
            pdf: PdfOptions::default(),
            sidecar_suffix: DEFAULT_SIDECAR_SUFFIX.to_string(),
            auto_dpi: AUTO_DPI,
            renderer: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            tools: config.tools.clone(),
            pdf: config.document.pdf_options(),
            sidecar_suffix: config.sidecar.suffix.clone(),
            auto_dpi: config.pdf.default_dpi,
            renderer: None,
        }
    }

    /// Render PDF pages with `renderer` instead of pdftoppm.
    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_sidecar_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.sidecar_suffix = suffix.into();
        self
    }

    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    pub fn sidecar_suffix(&self) -> &str {
        &self.sidecar_suffix
    }

    /// Convert one entry, recording the outcome on it.
    ///
    /// The entry ends up `Done` with its output path and size, or `Failed`
    /// with the error message. The error is also returned so callers can
    /// report it however they like.
    pub fn convert(&self, entry: &mut FileEntry) -> Result<ConversionSuccess> {
        entry.start();
        tracing::info!(
            "Converting {} ({})",
            entry.file_name(),
            entry.choice.as_ref().map(|c| c.label()).unwrap_or_default()
        );

        match self.run(entry) {
            Ok(success) => {
                tracing::info!(
                    "Converted {} -> {:?} ({} bytes)",
                    entry.file_name(),
                    success.output_path,
                    success.output_size_bytes
                );
                entry.complete(success.output_path.clone(), success.output_size_bytes);
                Ok(success)
            }
            Err(e) => {
                tracing::warn!("Conversion of {} failed: {}", entry.file_name(), e);
                entry.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn run(&self, entry: &FileEntry) -> Result<ConversionSuccess> {
        let choice = entry
            .choice
            .as_ref()
            .ok_or_else(|| ChoiceError::InvalidSelection(String::new()))?;
        let source = entry.source_path();

        let output = match entry.kind {
            MediaKind::Video | MediaKind::Audio => self.transcode(source, choice.to())?,
            MediaKind::Image => self.image(source, choice.to())?,
            MediaKind::Document => self.document(source, choice, entry.options.grayscale)?,
            MediaKind::Pdf => self.pdf(source, choice.to())?,
            MediaKind::PdfToImage => self.pdf_to_images(source, choice.to(), entry.options.dpi)?,
            MediaKind::ImageToPdf => {
                if choice.to() != "pdf" {
                    return Err(unsupported(MediaKind::ImageToPdf, choice.to()));
                }
                self.image_to_pdf(source, entry.options.page_size)?
            }
        };

        let output_size_bytes = output_size(&output);
        Ok(ConversionSuccess {
            output_path: output,
            output_size_bytes,
        })
    }

    fn transcode(&self, source: &Path, target: &str) -> Result<PathBuf> {
        let ffmpeg = self.tools.resolve(Tool::Ffmpeg)?;
        let workspace = Workspace::new(converted_output_path(source, target))?;
        actions::transcode(&ffmpeg, source, workspace.staged())?;
        Ok(workspace.finalize()?)
    }

    fn image(&self, source: &Path, target: &str) -> Result<PathBuf> {
        let format: ImageTarget = target
            .parse()
            .map_err(|_| unsupported(MediaKind::Image, target))?;
        let workspace = Workspace::new(converted_output_path(source, format.name()))?;
        actions::convert_image(source, workspace.staged(), format)?;
        Ok(workspace.finalize()?)
    }

    fn document(&self, source: &Path, choice: &ConversionChoice, grayscale: bool) -> Result<PathBuf> {
        let pandoc = self.tools.resolve(Tool::Pandoc)?;
        let target = choice.to();
        let extension = registry::output_extension(MediaKind::Document, target);
        let workspace = Workspace::new(converted_output_path(source, &extension))?;

        let mut input = source.to_path_buf();
        let mut reader = choice.from().to_string();
        if grayscale && target == "pdf" {
            match reader.as_str() {
                "markdown" => input = actions::grayscale_markdown(source, workspace.temp_dir())?,
                "docx" => {
                    let extracted =
                        actions::docx_to_markdown_with_media(&pandoc, source, workspace.temp_dir())?;
                    input = actions::grayscale_markdown(&extracted, workspace.temp_dir())?;
                    reader = "markdown".to_string();
                }
                other => tracing::debug!("Grayscale is not applied to {} sources", other),
            }
        }

        let mut request = PandocRequest::new(input, reader, target, workspace.staged());
        if let Some(dir) = source.parent() {
            request = request.with_resource_path(dir);
        }
        if target == "pdf" {
            request = request.with_pdf(self.pdf.clone());
        }
        request.run(&pandoc)?;

        Ok(workspace.finalize()?)
    }

    fn pdf(&self, source: &Path, target: &str) -> Result<PathBuf> {
        let workspace = Workspace::new(converted_output_path(source, target))?;
        match target {
            "txt" => {
                let pdftotext = self.tools.resolve(Tool::Pdftotext)?;
                actions::extract_text(&pdftotext, source, workspace.staged())?;
            }
            "docx" => {
                let soffice = self.tools.resolve(Tool::Soffice)?;
                actions::convert_to_docx(&soffice, source, workspace.staged())?;
            }
            other => return Err(unsupported(MediaKind::Pdf, other)),
        }
        Ok(workspace.finalize()?)
    }

    fn pdf_to_images(&self, source: &Path, target: &str, dpi: Dpi) -> Result<PathBuf> {
        let format: ImageTarget = target
            .parse()
            .map_err(|_| unsupported(MediaKind::PdfToImage, target))?;
        let state = EditState::load(&sidecar_path(source, &self.sidecar_suffix));

        let workspace = Workspace::new(images_output_dir(source))?;
        let render_dir = workspace.temp_file("render");
        std::fs::create_dir(&render_dir)?;
        std::fs::create_dir(workspace.staged())?;

        let dpi = dpi.resolve(self.auto_dpi);
        let pages = match &self.renderer {
            Some(renderer) => renderer.render(source, dpi, &render_dir)?,
            None => {
                let pdftoppm = self.tools.resolve(Tool::Pdftoppm)?;
                Poppler::new(pdftoppm).render(source, dpi, &render_dir)?
            }
        };

        let stale = state.stale_indices(pages.len());
        if !stale.is_empty() {
            tracing::warn!("Ignoring edits for missing pages {:?} of {:?}", stale, source);
        }

        let mut written = 0;
        for page in &pages {
            let index = page.number.saturating_sub(1);
            if state.is_deleted(index) {
                continue;
            }
            let img = actions::open_rotated(&page.path, state.angle(index))?;
            let name = format!("page_{}.{}", page.number, format.name());
            actions::save_image(&img, &workspace.staged().join(name), format)?;
            written += 1;
        }
        if written == 0 {
            return Err(ConversionError::NothingToWrite);
        }
        tracing::debug!("Wrote {} of {} pages for {:?}", written, pages.len(), source);

        Ok(workspace.finalize()?)
    }

    fn image_to_pdf(&self, source: &Path, page_size: PageSize) -> Result<PathBuf> {
        let state = EditState::load(&sidecar_path(source, &self.sidecar_suffix));
        if state.is_deleted(0) {
            return Err(ConversionError::NothingToWrite);
        }
        let img2pdf = self.tools.resolve(Tool::Img2pdf)?;
        let workspace = Workspace::new(converted_output_path(source, "pdf"))?;

        let page = workspace.temp_file("page_0.png");
        actions::prepare_page(source, state.angle(0), &page)?;
        actions::images_to_pdf(&img2pdf, &[page], page_size, workspace.staged())?;

        Ok(workspace.finalize()?)
    }

    /// Assemble `images` into one PDF at `output`, honoring an image-set edit
    /// state whose indices are positions in `images`.
    pub fn merge_images_to_pdf(
        &self,
        images: &[PathBuf],
        state: &EditState,
        page_size: PageSize,
        output: &Path,
    ) -> Result<ConversionSuccess> {
        let img2pdf = self.tools.resolve(Tool::Img2pdf)?;
        let workspace = Workspace::new(output)?;

        let mut pages = Vec::new();
        for index in state.retained(images.len()) {
            let page = workspace.temp_file(&format!("page_{}.png", index));
            actions::prepare_page(&images[index], state.angle(index), &page)?;
            pages.push(page);
        }
        if pages.is_empty() {
            return Err(ConversionError::NothingToWrite);
        }

        tracing::info!("Merging {} image(s) into {:?}", pages.len(), output);
        actions::images_to_pdf(&img2pdf, &pages, page_size, workspace.staged())?;
        let output_path = workspace.finalize()?;
        let output_size_bytes = output_size(&output_path);
        Ok(ConversionSuccess {
            output_path,
            output_size_bytes,
        })
    }
}

fn unsupported(kind: MediaKind, target: &str) -> ConversionError {
    ConversionError::Unsupported {
        kind,
        target: target.to_string(),
    }
}

fn output_size(path: &Path) -> u64 {
    if path.is_dir() {
        directory_size(path)
    } else {
        std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }
}

/// Total size of the regular files under `dir`.
pub fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::EntryStatus;
    use tempfile::tempdir;

    #[test]
    fn test_missing_choice_fails_entry() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.mp3");
        std::fs::write(&source, b"x").unwrap();
        let mut entry = FileEntry::new(MediaKind::Audio, source, 1);

        let err = Invoker::default().convert(&mut entry).unwrap_err();

        assert!(matches!(err, ConversionError::Choice(_)));
        match &entry.status {
            EntryStatus::Failed(reason) => assert!(reason.contains("invalid format selection")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!dir.path().join("a_converted.wav").exists());
    }

    #[test]
    fn test_unsupported_pdf_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("scan.pdf");
        std::fs::write(&source, b"%PDF").unwrap();
        let mut entry = FileEntry::new(MediaKind::Pdf, source, 4);
        entry.choice = Some(ConversionChoice::new("pdf", "epub"));

        let err = Invoker::default().convert(&mut entry).unwrap_err();
        assert!(matches!(err, ConversionError::Unsupported { .. }));
        assert!(entry.status.is_failed());
    }

    #[test]
    fn test_directory_size_is_recursive() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a"), [0u8; 10]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b"), [0u8; 5]).unwrap();
        assert_eq!(directory_size(dir.path()), 15);
        assert_eq!(output_size(&dir.path().join("missing")), 0);
    }
}
