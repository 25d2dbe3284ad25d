//! Document conversion through the pandoc CLI.

use crate::actions::raster::grayscale_copy;
use crate::{Error, Result, ToolCommand};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// PDF rendering settings passed to pandoc's LaTeX engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    pub engine: String,
    pub main_font: String,
    pub lang: String,
    pub margin: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            engine: "xelatex".to_string(),
            main_font: "Arial".to_string(),
            lang: "ru-RU".to_string(),
            margin: "1in".to_string(),
        }
    }
}

impl PdfOptions {
    fn args(&self) -> Vec<OsString> {
        vec![
            format!("--pdf-engine={}", self.engine).into(),
            "-V".into(),
            format!("mainfont={}", self.main_font).into(),
            "-V".into(),
            format!("lang={}", self.lang).into(),
            "-V".into(),
            format!("geometry=margin={}", self.margin).into(),
        ]
    }
}

/// A single pandoc invocation.
#[derive(Debug, Clone)]
pub struct PandocRequest {
    pub input: PathBuf,
    pub from: String,
    pub to: String,
    pub output: PathBuf,
    /// Extra directory searched for images referenced by the input.
    pub resource_path: Option<PathBuf>,
    /// Set when the output is a PDF.
    pub pdf: Option<PdfOptions>,
}

impl PandocRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        from: impl Into<String>,
        to: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            from: from.into(),
            to: to.into(),
            output: output.into(),
            resource_path: None,
            pdf: None,
        }
    }

    pub fn with_resource_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_path = Some(dir.into());
        self
    }

    pub fn with_pdf(mut self, options: PdfOptions) -> Self {
        self.pdf = Some(options);
        self
    }

    /// Build the pandoc argument list.
    ///
    /// pandoc has no `pdf` writer: PDF output is selected by the `.pdf`
    /// output extension and rendered through the LaTeX engine.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input.as_os_str().to_os_string(),
            "-f".into(),
            self.from.clone().into(),
        ];
        if self.to != "pdf" {
            args.push("-t".into());
            args.push(self.to.clone().into());
        }
        args.push("-o".into());
        args.push(self.output.as_os_str().to_os_string());
        if let Some(ref dir) = self.resource_path {
            let mut flag = OsString::from("--resource-path=");
            flag.push(dir.as_os_str());
            args.push(flag);
        }
        if let Some(ref pdf) = self.pdf {
            args.extend(pdf.args());
        }
        args
    }

    /// Run pandoc with this request.
    pub fn run(&self, pandoc: &Path) -> Result<()> {
        if !self.input.exists() {
            return Err(Error::file_not_found(&self.input));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            "pandoc {:?} ({} -> {}) -> {:?}",
            self.input,
            self.from,
            self.to,
            self.output
        );

        ToolCommand::new(pandoc).args(self.args()).execute()?;
        Ok(())
    }
}

/// Convert `input` to plain text and return it.
pub fn to_plain_text(pandoc: &Path, input: &Path, from: &str) -> Result<String> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }
    let output = ToolCommand::new(pandoc)
        .arg(input)
        .args(["-f", from, "-t", "plain"])
        .execute()?;
    Ok(output.stdout)
}

fn image_reference() -> Result<Regex> {
    Regex::new(r"!\[[^\]]*\]\(([^)]+)\)")
        .map_err(|e| Error::InvalidInput(format!("image reference pattern: {e}")))
}

fn is_raster_reference(target: &str) -> bool {
    let lower = target.to_lowercase();
    lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

/// Write a copy of a markdown file whose local PNG/JPEG images point at
/// grayscale copies placed in `work_dir`.
///
/// References that are remote, missing or not PNG/JPEG are left as they are.
/// Returns the path of the rewritten markdown file.
pub fn grayscale_markdown(source: &Path, work_dir: &Path) -> Result<PathBuf> {
    let text = std::fs::read_to_string(source)?;
    let base = source.parent().unwrap_or_else(|| Path::new("."));
    let pattern = image_reference()?;

    let mut rewritten = String::with_capacity(text.len());
    let mut last = 0;
    let mut copies = 0usize;

    for caps in pattern.captures_iter(&text) {
        let Some(target) = caps.get(1) else { continue };
        let reference = target.as_str().trim();
        if !is_raster_reference(reference) || reference.contains("://") {
            continue;
        }
        let original = base.join(reference);
        if !original.is_file() {
            continue;
        }

        let file_name = original
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image.png".to_string());
        let gray = work_dir.join(format!("gray_{}_{}", copies, file_name));
        grayscale_copy(&original, &gray)?;
        copies += 1;

        rewritten.push_str(&text[last..target.start()]);
        rewritten.push_str(&gray.to_string_lossy());
        last = target.end();
    }
    rewritten.push_str(&text[last..]);

    #[cfg(feature = "tracing")]
    tracing::debug!("Rewrote {} image reference(s) in {:?}", copies, source);

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let out = work_dir.join(format!("{}_gray.md", stem));
    std::fs::write(&out, rewritten)?;
    Ok(out)
}

/// Convert a DOCX file to markdown with its embedded media extracted into
/// `work_dir`, so the images can be post-processed before the final render.
pub fn docx_to_markdown_with_media(pandoc: &Path, input: &Path, work_dir: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }
    let markdown = work_dir.join("extracted.md");
    let mut media = OsString::from("--extract-media=");
    media.push(work_dir.as_os_str());

    ToolCommand::new(pandoc)
        .arg(input)
        .args(["-f", "docx", "-t", "markdown"])
        .arg(media)
        .arg("-o")
        .arg(&markdown)
        .execute()?;
    Ok(markdown)
}
