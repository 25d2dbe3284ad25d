use super::{DeletedKey, EditError, EditState};
use crate::registry;
use formshift_av::{actions, Tool, ToolConfig};
use formshift_common::paths::{extension_of, has_picker_extension, sidecar_path};
use formshift_common::MediaKind;
use std::path::{Path, PathBuf};

/// Lines of plain text shown per document page.
pub const LINES_PER_PAGE: usize = 40;

/// What an edit session pages through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSource {
    /// Pages of a PDF.
    Pdf(PathBuf),
    /// A text-like document split into fixed-size pages.
    Document(PathBuf),
    /// An ordered set of images destined for one PDF.
    Images(Vec<PathBuf>),
}

impl EditSource {
    /// Classify input paths: one `.pdf` is a PDF, several files or image
    /// files form an image set, anything else is a document.
    pub fn from_paths(paths: Vec<PathBuf>) -> Result<Self, EditError> {
        let Some(first) = paths.first() else {
            return Err(EditError::Empty);
        };
        let all_images = paths
            .iter()
            .all(|p| has_picker_extension(MediaKind::ImageToPdf, p));

        if paths.len() > 1 || all_images {
            return Ok(EditSource::Images(paths));
        }
        if extension_of(first).as_deref() == Some("pdf") {
            Ok(EditSource::Pdf(first.clone()))
        } else {
            Ok(EditSource::Document(first.clone()))
        }
    }

    pub fn deleted_key(&self) -> DeletedKey {
        match self {
            EditSource::Images(_) => DeletedKey::Indices,
            _ => DeletedKey::Pages,
        }
    }

    /// File the sidecar is named after. Image sets use their first image.
    pub fn anchor(&self) -> Option<&Path> {
        match self {
            EditSource::Pdf(p) | EditSource::Document(p) => Some(p),
            EditSource::Images(paths) => paths.first().map(PathBuf::as_path),
        }
    }

    /// Number of pages or images.
    pub fn count_pages(&self, tools: &ToolConfig) -> Result<usize, EditError> {
        match self {
            EditSource::Images(paths) => Ok(paths.len()),
            EditSource::Pdf(path) => {
                let pdfinfo = tools.resolve(Tool::Pdfinfo)?;
                Ok(actions::page_count(&pdfinfo, path)?)
            }
            EditSource::Document(path) => {
                let ext = extension_of(path).unwrap_or_default();
                let text = match ext.as_str() {
                    "txt" | "md" => std::fs::read_to_string(path)?,
                    _ => {
                        let reader = registry::canonical_format(MediaKind::Document, &ext)
                            .unwrap_or(ext.as_str());
                        let pandoc = tools.resolve(Tool::Pandoc)?;
                        actions::to_plain_text(&pandoc, path, reader)?
                    }
                };
                Ok(count_text_pages(&text))
            }
        }
    }
}

/// Pages needed to show `text` at [`LINES_PER_PAGE`] lines each (at least one).
pub fn count_text_pages(text: &str) -> usize {
    text.lines().count().div_ceil(LINES_PER_PAGE).max(1)
}

/// An open editor over one source: navigation plus pending rotations and deletions.
///
/// Nothing is written until [`save`](Self::save). Navigation skips deleted
/// pages and wraps at both ends. When every page is deleted there is no
/// current page.
#[derive(Debug, Clone)]
pub struct EditSession {
    source: EditSource,
    sidecar: PathBuf,
    state: EditState,
    page_count: usize,
    current: Option<usize>,
}

impl EditSession {
    /// Open `source`, counting its pages with the external tools and loading
    /// the sidecar named with `suffix`.
    pub fn open(source: EditSource, tools: &ToolConfig, suffix: &str) -> Result<Self, EditError> {
        let anchor = source.anchor().ok_or(EditError::Empty)?;
        let sidecar = sidecar_path(anchor, suffix);
        let page_count = source.count_pages(tools)?;
        Ok(Self::with_page_count(source, page_count, sidecar))
    }

    /// Open with a known page count.
    pub fn with_page_count(source: EditSource, page_count: usize, sidecar: PathBuf) -> Self {
        let state = EditState::load(&sidecar);
        let stale = state.stale_indices(page_count);
        if !stale.is_empty() {
            tracing::warn!(
                "{:?} refers to pages {:?} beyond the current {} page(s); they are ignored",
                sidecar,
                stale,
                page_count
            );
        }
        let current = state.retained(page_count).next();
        Self {
            source,
            sidecar,
            state,
            page_count,
            current,
        }
    }

    pub fn source(&self) -> &EditSource {
        &self.source
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Current 0-based page, `None` when every page is removed.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn all_removed(&self) -> bool {
        self.current.is_none()
    }

    pub fn visible_count(&self) -> usize {
        self.state.retained(self.page_count).count()
    }

    fn step(&self, from: usize, forward: bool) -> Option<usize> {
        let n = self.page_count;
        (1..=n)
            .map(|k| if forward { (from + k) % n } else { (from + n - k) % n })
            .find(|i| !self.state.is_deleted(*i))
    }

    /// Move to the next visible page, wrapping to the start.
    pub fn next(&mut self) -> Option<usize> {
        if let Some(cur) = self.current {
            self.current = self.step(cur, true);
        }
        self.current
    }

    /// Move to the previous visible page, wrapping to the end.
    pub fn prev(&mut self) -> Option<usize> {
        if let Some(cur) = self.current {
            self.current = self.step(cur, false);
        }
        self.current
    }

    /// Jump to `index` if it exists and is not deleted.
    pub fn go_to(&mut self, index: usize) -> Result<usize, EditError> {
        if index >= self.page_count || self.state.is_deleted(index) {
            return Err(EditError::IndexOutOfRange {
                index,
                count: self.page_count,
            });
        }
        self.current = Some(index);
        Ok(index)
    }

    fn rotate_current(&mut self, delta: i32) -> Result<u16, EditError> {
        let index = self.current.ok_or(EditError::Empty)?;
        self.state.rotate(index, delta)
    }

    /// Rotate the current page 90 degrees counter-clockwise.
    pub fn rotate_left(&mut self) -> Result<u16, EditError> {
        self.rotate_current(90)
    }

    /// Rotate the current page 90 degrees clockwise.
    pub fn rotate_right(&mut self) -> Result<u16, EditError> {
        self.rotate_current(-90)
    }

    /// Delete the current page and move to the next visible one.
    pub fn delete_current(&mut self) -> Option<usize> {
        let cur = self.current?;
        self.state.delete(cur);
        self.current = self.step(cur, true);
        self.current
    }

    /// Undo every deletion.
    pub fn restore_all(&mut self) {
        self.state.restore_all();
        if self.current.is_none() && self.page_count > 0 {
            self.current = Some(0);
        }
    }

    /// Write the state to the sidecar.
    pub fn save(&self) -> Result<(), EditError> {
        self.state.save(&self.sidecar, self.source.deleted_key())
    }

    /// Close without writing.
    pub fn cancel(self) {
        tracing::debug!("Discarded edits for {:?}", self.sidecar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session(count: usize) -> (tempfile::TempDir, EditSession) {
        let dir = tempdir().unwrap();
        let sidecar = dir.path().join("scan_state.json");
        let s = EditSession::with_page_count(
            EditSource::Pdf(dir.path().join("scan.pdf")),
            count,
            sidecar,
        );
        (dir, s)
    }

    #[test]
    fn test_navigation_wraps_and_skips_deleted() {
        let (_dir, mut s) = session(4);
        assert_eq!(s.current(), Some(0));
        s.go_to(1).unwrap();
        assert_eq!(s.delete_current(), Some(2));
        assert_eq!(s.next(), Some(3));
        assert_eq!(s.next(), Some(0));
        assert_eq!(s.prev(), Some(3));
        assert_eq!(s.prev(), Some(2));
        assert_eq!(s.prev(), Some(0));
    }

    #[test]
    fn test_all_removed_is_noop() {
        let (_dir, mut s) = session(2);
        s.delete_current();
        assert_eq!(s.delete_current(), None);
        assert!(s.all_removed());
        assert_eq!(s.next(), None);
        assert_eq!(s.prev(), None);
        assert!(matches!(s.rotate_left(), Err(EditError::Empty)));

        s.restore_all();
        assert_eq!(s.current(), Some(0));
        assert_eq!(s.visible_count(), 2);
    }

    #[test]
    fn test_rotate_directions() {
        let (_dir, mut s) = session(1);
        assert_eq!(s.rotate_left().unwrap(), 90);
        assert_eq!(s.rotate_right().unwrap(), 0);
        assert_eq!(s.rotate_right().unwrap(), 270);
    }

    #[test]
    fn test_save_then_reopen() {
        let (dir, mut s) = session(3);
        s.rotate_left().unwrap();
        s.go_to(1).unwrap();
        s.delete_current();
        s.save().unwrap();

        let reopened = EditSession::with_page_count(
            EditSource::Pdf(dir.path().join("scan.pdf")),
            3,
            dir.path().join("scan_state.json"),
        );
        assert_eq!(reopened.state(), s.state());
        let text = std::fs::read_to_string(dir.path().join("scan_state.json")).unwrap();
        assert!(text.contains("deleted_pages"));
    }

    #[test]
    fn test_cancel_writes_nothing() {
        let (dir, mut s) = session(2);
        s.delete_current();
        s.cancel();
        assert!(!dir.path().join("scan_state.json").exists());
    }

    #[test]
    fn test_source_classification() {
        let pdf = EditSource::from_paths(vec![PathBuf::from("a.pdf")]).unwrap();
        assert_eq!(pdf.deleted_key(), DeletedKey::Pages);
        let doc = EditSource::from_paths(vec![PathBuf::from("a.docx")]).unwrap();
        assert!(matches!(doc, EditSource::Document(_)));
        let imgs =
            EditSource::from_paths(vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]).unwrap();
        assert_eq!(imgs.deleted_key(), DeletedKey::Indices);
        assert!(matches!(EditSource::from_paths(vec![]), Err(EditError::Empty)));
    }

    #[test]
    fn test_count_text_pages() {
        assert_eq!(count_text_pages(""), 1);
        assert_eq!(count_text_pages(&"line\n".repeat(40)), 1);
        assert_eq!(count_text_pages(&"line\n".repeat(41)), 2);
    }

    #[test]
    fn test_document_page_count_without_tools() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "x\n".repeat(85)).unwrap();
        let count = EditSource::Document(path)
            .count_pages(&ToolConfig::default())
            .unwrap();
        assert_eq!(count, 3);
    }
}
