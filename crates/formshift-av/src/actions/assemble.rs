//! Assembling raster images into a single PDF through img2pdf.

use crate::actions::raster::open_rotated;
use crate::{Error, Result, ToolCommand};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Page size for assembled PDFs. Each image is fitted inside a 30pt border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
}

impl PageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A3" => Ok(PageSize::A3),
            "A4" => Ok(PageSize::A4),
            "A5" => Ok(PageSize::A5),
            _ => Err(Error::InvalidInput(format!("page size: {}", s))),
        }
    }
}

const BORDER: &str = "30pt";

fn img2pdf_args(images: &[PathBuf], size: PageSize, output: &Path) -> Vec<std::ffi::OsString> {
    let mut args: Vec<std::ffi::OsString> = vec![
        "--pagesize".into(),
        size.as_str().into(),
        "--border".into(),
        BORDER.into(),
        "-o".into(),
        output.as_os_str().to_os_string(),
    ];
    args.extend(images.iter().map(|p| p.as_os_str().to_os_string()));
    args
}

/// Write `source` rotated counter-clockwise by `degrees` as an opaque RGB PNG.
///
/// img2pdf rejects images with an alpha channel and formats such as BMP, so
/// every page goes through this step before assembly.
pub fn prepare_page(source: &Path, degrees: u16, destination: &Path) -> Result<()> {
    let img = open_rotated(source, degrees)?;
    DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(destination, image::ImageFormat::Png)?;
    Ok(())
}

/// Write `images` as consecutive pages of one PDF, in the given order.
pub fn images_to_pdf(img2pdf: &Path, images: &[PathBuf], size: PageSize, output: &Path) -> Result<()> {
    if images.is_empty() {
        return Err(Error::InvalidInput("no images to assemble".to_string()));
    }
    if let Some(missing) = images.iter().find(|p| !p.exists()) {
        return Err(Error::file_not_found(missing));
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Assembling {} image(s) into {:?} ({})", images.len(), output, size);

    ToolCommand::new(img2pdf)
        .args(img2pdf_args(images, size, output))
        .execute()?;
    Ok(())
}
