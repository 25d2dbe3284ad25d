//! Path utilities: picker extensions per media kind and output path derivation.
//!
//! All extension comparisons are case-insensitive and ignore the leading dot.

use crate::MediaKind;
use std::path::{Path, PathBuf};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov"];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg"];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "docx", "doc", "odt", "md", "html"];

const PDF_EXTENSIONS: &[&str] = &["pdf"];

const IMAGE_TO_PDF_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Suffix appended to the source stem for single-file outputs.
pub const CONVERTED_SUFFIX: &str = "_converted";

/// Suffix appended to the source stem for per-page image directories.
pub const IMAGES_DIR_SUFFIX: &str = "_images";

/// Default suffix for edit-state sidecar files.
pub const DEFAULT_SIDECAR_SUFFIX: &str = "_state.json";

/// Get the extensions offered by the file picker for a media kind.
///
/// # Examples
///
/// ```
/// use formshift_common::{paths::picker_extensions, MediaKind};
///
/// assert!(picker_extensions(MediaKind::Video).contains(&"mkv"));
/// assert_eq!(picker_extensions(MediaKind::Pdf), &["pdf"]);
/// ```
#[must_use]
pub fn picker_extensions(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Video => VIDEO_EXTENSIONS,
        MediaKind::Audio => AUDIO_EXTENSIONS,
        MediaKind::Image => IMAGE_EXTENSIONS,
        MediaKind::Document => DOCUMENT_EXTENSIONS,
        MediaKind::Pdf | MediaKind::PdfToImage => PDF_EXTENSIONS,
        MediaKind::ImageToPdf => IMAGE_TO_PDF_EXTENSIONS,
    }
}

/// Lower-cased extension of `path` without the dot.
///
/// # Examples
///
/// ```
/// use formshift_common::paths::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("/a/B.JPG")).as_deref(), Some("jpg"));
/// assert_eq!(extension_of(Path::new("README")), None);
/// ```
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a path has one of the picker extensions of `kind`.
pub fn has_picker_extension(kind: MediaKind, path: &Path) -> bool {
    extension_of(path)
        .map(|ext| picker_extensions(kind).contains(&ext.as_str()))
        .unwrap_or(false)
}

fn with_stem_suffix(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}"))
}

/// Output path next to `source`: stem + `_converted` + `.extension`.
pub fn converted_output_path(source: &Path, extension: &str) -> PathBuf {
    with_stem_suffix(source, &format!("{CONVERTED_SUFFIX}.{extension}"))
}

/// Directory receiving one image per page: stem + `_images`.
pub fn images_output_dir(source: &Path) -> PathBuf {
    with_stem_suffix(source, IMAGES_DIR_SUFFIX)
}

/// Edit-state sidecar next to `source`: stem + `suffix`.
pub fn sidecar_path(source: &Path, suffix: &str) -> PathBuf {
    with_stem_suffix(source, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_picker_extension() {
        assert!(has_picker_extension(MediaKind::Audio, Path::new("a.mp3")));
        assert!(has_picker_extension(MediaKind::Audio, Path::new("a.FLAC")));
        assert!(!has_picker_extension(MediaKind::Audio, Path::new("a.mp4")));
        assert!(has_picker_extension(MediaKind::Document, Path::new("r.doc")));
        assert!(has_picker_extension(MediaKind::ImageToPdf, Path::new("x.gif")));
        assert!(!has_picker_extension(MediaKind::Image, Path::new("x.gif")));
        assert!(!has_picker_extension(MediaKind::Video, Path::new("no_extension")));
        assert!(!has_picker_extension(MediaKind::Video, Path::new("")));
    }

    #[test]
    fn test_pdf_kinds_share_extensions() {
        assert_eq!(
            picker_extensions(MediaKind::Pdf),
            picker_extensions(MediaKind::PdfToImage)
        );
    }

    #[test]
    fn test_converted_output_path() {
        assert_eq!(
            converted_output_path(Path::new("/music/a.mp3"), "wav"),
            PathBuf::from("/music/a_converted.wav")
        );
        assert_eq!(
            converted_output_path(Path::new("notes.v2.md"), "txt"),
            PathBuf::from("notes.v2_converted.txt")
        );
    }

    #[test]
    fn test_images_output_dir() {
        assert_eq!(
            images_output_dir(Path::new("/docs/scan.pdf")),
            PathBuf::from("/docs/scan_images")
        );
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/docs/scan.pdf"), DEFAULT_SIDECAR_SUFFIX),
            PathBuf::from("/docs/scan_state.json")
        );
        assert_eq!(
            sidecar_path(Path::new("report.docx"), ".editstate"),
            PathBuf::from("report.editstate")
        );
    }
}
