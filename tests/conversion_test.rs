//! Conversion integration tests
//!
//! End-to-end conversions through the invoker. Tests that need external
//! tools skip when the tool is not installed.

mod common;

use assert_matches::assert_matches;
use common::{write_image, FailingRenderer, FakeRenderer};
use formshift::batch::{BatchList, EntryStatus, FileEntry};
use formshift::convert::{ConversionError, Invoker};
use formshift::edit::{DeletedKey, EditState};
use formshift_common::MediaKind;
use image::GenericImageView;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_png_to_jpeg() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("photo.png");
    write_image(&source, 12, 8);

    let mut list = BatchList::new(MediaKind::Image);
    let id = list.add(&source).unwrap();
    list.set_choice(id, "png → jpeg").unwrap();

    let summary = list.convert_all(&Invoker::default());
    assert_eq!(summary.done, 1);

    let entry = list.get(id).unwrap();
    let output = dir.path().join("photo_converted.jpeg");
    assert_eq!(entry.status, EntryStatus::Done);
    assert_eq!(
        entry.output_path.as_deref(),
        Some(std::fs::canonicalize(&output).unwrap().as_path())
    );
    assert!(entry.output_size_bytes.unwrap() > 0);
    assert_eq!(image::open(&output).unwrap().dimensions(), (12, 8));
    assert!(source.exists());
}

#[test]
fn test_empty_choice_marks_failed_without_output() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("photo.png");
    write_image(&source, 4, 4);
    let mut entry = FileEntry::new(MediaKind::Image, source, 10);
    entry.choice = "".parse().ok();

    let err = Invoker::default().convert(&mut entry).unwrap_err();

    assert_matches!(err, ConversionError::Choice(_));
    match &entry.status {
        EntryStatus::Failed(reason) => assert!(reason.contains("invalid format selection")),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(entry.output_path.is_none());
    assert_eq!(list_names(dir.path()), ["photo.png"]);
}

#[test]
fn test_reconvert_after_done_overwrites() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("icon.bmp");
    write_image(&source, 6, 6);

    let mut list = BatchList::new(MediaKind::Image);
    let id = list.add(&source).unwrap();
    list.set_choice(id, "bmp → png").unwrap();
    list.convert(id, &Invoker::default()).unwrap();

    write_image(&source, 9, 3);
    let entry = list.convert(id, &Invoker::default()).unwrap();

    assert_eq!(entry.status, EntryStatus::Done);
    let out = dir.path().join("icon_converted.png");
    assert_eq!(image::open(out).unwrap().dimensions(), (9, 3));
    assert_eq!(list_names(dir.path()), ["icon.bmp", "icon_converted.png"]);
}

#[test]
fn test_pdf_to_images_skips_deleted_pages() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    std::fs::write(
        dir.path().join("scan_state.json"),
        r#"{"rotation_angles": {}, "deleted_pages": [1]}"#,
    )
    .unwrap();

    let mut list = BatchList::new(MediaKind::PdfToImage);
    let id = list.add(&source).unwrap();
    list.set_choice(id, "pdf → png").unwrap();

    let invoker = Invoker::default().with_renderer(FakeRenderer { pages: 3 });
    list.convert(id, &invoker).unwrap();

    let out_dir = dir.path().join("scan_images");
    assert_eq!(list_names(&out_dir), ["page_1.png", "page_3.png"]);
    let entry = list.get(id).unwrap();
    assert_eq!(entry.status, EntryStatus::Done);
    assert_eq!(
        entry.output_size_bytes,
        Some(formshift::convert::directory_size(&out_dir))
    );
}

#[test]
fn test_pdf_to_images_applies_rotation() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    let mut state = EditState::new();
    state.rotate(0, 90).unwrap();
    state
        .save(&dir.path().join("scan_state.json"), DeletedKey::Pages)
        .unwrap();

    let mut list = BatchList::new(MediaKind::PdfToImage);
    let id = list.add(&source).unwrap();
    list.set_choice(id, "pdf → jpeg").unwrap();
    list.convert(id, &Invoker::default().with_renderer(FakeRenderer { pages: 2 }))
        .unwrap();

    let out_dir = dir.path().join("scan_images");
    assert_eq!(image::open(out_dir.join("page_1.jpeg")).unwrap().dimensions(), (20, 10));
    assert_eq!(image::open(out_dir.join("page_2.jpeg")).unwrap().dimensions(), (20, 20));
}

#[test]
fn test_pdf_to_images_rerun_replaces_directory() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();

    let mut list = BatchList::new(MediaKind::PdfToImage);
    let id = list.add(&source).unwrap();
    list.set_choice(id, "pdf → png").unwrap();
    list.convert(id, &Invoker::default().with_renderer(FakeRenderer { pages: 3 }))
        .unwrap();

    std::fs::write(dir.path().join("scan_state.json"), r#"{"deleted_pages": [0, 2]}"#).unwrap();
    list.convert(id, &Invoker::default().with_renderer(FakeRenderer { pages: 3 }))
        .unwrap();

    assert_eq!(list_names(&dir.path().join("scan_images")), ["page_2.png"]);
}

#[test]
fn test_pdf_to_images_all_deleted_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    std::fs::write(dir.path().join("scan_state.json"), r#"{"deleted_pages": [0, 1]}"#).unwrap();

    let mut list = BatchList::new(MediaKind::PdfToImage);
    let id = list.add(&source).unwrap();
    let err = list
        .convert(id, &Invoker::default().with_renderer(FakeRenderer { pages: 2 }))
        .unwrap()
        .status
        .clone();

    assert_matches!(err, EntryStatus::Failed(_));
    assert!(!dir.path().join("scan_images").exists());
}

#[test]
fn test_renderer_failure_leaves_previous_output() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    let out_dir = dir.path().join("scan_images");
    std::fs::create_dir(&out_dir).unwrap();
    std::fs::write(out_dir.join("page_1.png"), b"old").unwrap();

    let mut entry = FileEntry::new(MediaKind::PdfToImage, source, 8);
    entry.choice = "pdf → png".parse().ok();
    let err = Invoker::default()
        .with_renderer(FailingRenderer)
        .convert(&mut entry)
        .unwrap_err();

    assert!(err.to_string().contains("pdftoppm failed"));
    assert_eq!(std::fs::read(out_dir.join("page_1.png")).unwrap(), b"old");
    // No staging directories left behind
    assert_eq!(list_names(dir.path()), ["scan.pdf", "scan_images"]);
}

#[test]
fn test_custom_sidecar_suffix() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("book.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    std::fs::write(dir.path().join("book.edits.json"), r#"{"deleted_pages": [0]}"#).unwrap();

    let mut list = BatchList::new(MediaKind::PdfToImage);
    let id = list.add(&source).unwrap();
    let invoker = Invoker::default()
        .with_renderer(FakeRenderer { pages: 2 })
        .with_sidecar_suffix(".edits.json");
    list.convert(id, &invoker).unwrap();

    assert_eq!(list_names(&dir.path().join("book_images")), ["page_2.png"]);
}

#[test]
fn test_mp3_to_wav_with_ffmpeg() {
    if !common::tool_available("ffmpeg") {
        return;
    }
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.mp3");
    let generated = Command::new("ffmpeg")
        .args(["-y", "-f", "lavfi", "-i", "sine=frequency=440:duration=0.5"])
        .arg(&source)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !generated {
        eprintln!("Skipping: ffmpeg cannot encode mp3 here");
        return;
    }

    let mut list = BatchList::new(MediaKind::Audio);
    let id = list.add(&source).unwrap();
    list.set_global_conversion("mp3 → wav");
    list.convert_all(&Invoker::default());

    let entry = list.get(id).unwrap();
    assert_eq!(entry.status, EntryStatus::Done);
    assert!(dir.path().join("a_converted.wav").exists());
}

#[test]
fn test_ffmpeg_failure_surfaces_stderr() {
    if !common::tool_available("ffmpeg") {
        return;
    }
    let dir = tempdir().unwrap();
    let source = common::touch(&dir.path().join("garbage.mp3"));

    let mut list = BatchList::new(MediaKind::Audio);
    let id = list.add(&source).unwrap();
    list.convert_all(&Invoker::default());

    match &list.get(id).unwrap().status {
        EntryStatus::Failed(reason) => assert!(reason.starts_with("ffmpeg failed")),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(!dir.path().join("garbage_converted.wav").exists());
}

#[test]
fn test_merge_respects_deletions() {
    if !common::tool_available("img2pdf") {
        return;
    }
    let dir = tempdir().unwrap();
    let images: Vec<_> = ["a.png", "b.jpg", "c.bmp"]
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            write_image(&p, 30, 20);
            p
        })
        .collect();
    let mut state = EditState::new();
    state.delete(1);
    state.rotate(2, 90).unwrap();

    let output = dir.path().join("album.pdf");
    let result = Invoker::default()
        .merge_images_to_pdf(&images, &state, Default::default(), &output)
        .unwrap();

    assert!(output.exists());
    assert!(result.output_size_bytes > 0);
}

#[test]
fn test_merge_everything_deleted() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("a.png");
    write_image(&image, 4, 4);
    let mut state = EditState::new();
    state.delete(0);

    // Resolving img2pdf may fail first when it is not installed; either way
    // nothing is written.
    let result = Invoker::default().merge_images_to_pdf(
        &[image],
        &state,
        Default::default(),
        &dir.path().join("out.pdf"),
    );
    assert!(result.is_err());
    assert!(!dir.path().join("out.pdf").exists());
}
