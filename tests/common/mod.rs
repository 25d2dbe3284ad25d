//! Shared helpers for integration tests.

#![allow(dead_code)]

use formshift_av::actions::{PageRenderer, RenderedPage};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Write a small RGB PNG (or any format the extension selects).
pub fn write_image(path: &Path, width: u32, height: u32) {
    let mut img = RgbImage::from_pixel(width, height, Rgb([240, 240, 240]));
    img.put_pixel(0, 0, Rgb([200, 0, 0]));
    DynamicImage::ImageRgb8(img).save(path).unwrap();
}

/// Write a file with arbitrary bytes.
pub fn touch(path: &Path) -> PathBuf {
    std::fs::write(path, b"not really media").unwrap();
    path.to_path_buf()
}

/// Whether an external tool is on PATH. Prints a skip notice when it is not.
pub fn tool_available(name: &str) -> bool {
    if which::which(name).is_ok() {
        true
    } else {
        eprintln!("Skipping: {} not found on PATH", name);
        false
    }
}

/// Renders `pages` PNG pages without touching the PDF. Page `n` is
/// `10 * n` pixels wide and 20 pixels tall so pages can be told apart.
pub struct FakeRenderer {
    pub pages: usize,
}

impl PageRenderer for FakeRenderer {
    fn render(
        &self,
        _pdf: &Path,
        _dpi: u32,
        out_dir: &Path,
    ) -> formshift_av::Result<Vec<RenderedPage>> {
        (1..=self.pages)
            .map(|number| {
                let path = out_dir.join(format!("page-{}.png", number));
                write_image(&path, 10 * number as u32, 20);
                Ok(RenderedPage { number, path })
            })
            .collect()
    }
}

/// A renderer that always fails like a broken pdftoppm.
pub struct FailingRenderer;

impl PageRenderer for FailingRenderer {
    fn render(&self, _pdf: &Path, _dpi: u32, _out_dir: &Path) -> formshift_av::Result<Vec<RenderedPage>> {
        Err(formshift_av::Error::tool_failed("pdftoppm", "Syntax Error: Couldn't read xref table"))
    }
}
