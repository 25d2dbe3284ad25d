//! Conversion actions.
//!
//! This module provides the individual conversion operations:
//! - Audio/video transcoding through ffmpeg
//! - Raster image re-encoding, rotation and grayscale copies
//! - Document conversion through pandoc
//! - PDF page rendering, text extraction and DOCX import
//! - Image-to-PDF assembly through img2pdf

mod assemble;
mod document;
mod raster;
mod pdf;
mod transcode;

pub use raster::{convert_image, grayscale_copy, open_rotated, rotate_ccw, save_image, ImageTarget};
pub use assemble::{images_to_pdf, prepare_page, PageSize};
pub use document::{
    docx_to_markdown_with_media, grayscale_markdown, to_plain_text, PandocRequest, PdfOptions,
};
pub use pdf::{
    convert_to_docx, extract_text, page_count, parse_page_count, parse_rendered_page_number,
    PageRenderer, Poppler, RenderedPage, AUTO_DPI,
};
pub use transcode::{ffmpeg_args, transcode};
