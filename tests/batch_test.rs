//! Batch list integration tests
//!
//! Deduplication, capacity, global conversion and progress.

mod common;

use assert_matches::assert_matches;
use common::touch;
use formshift::batch::{BatchError, BatchList, BatchStep, BatchSummary, EntryStatus};
use formshift::controller::{Controller, Event, Message};
use formshift::convert::Invoker;
use formshift_common::MediaKind;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_same_path_twice_keeps_length() {
    let dir = tempdir().unwrap();
    let a = touch(&dir.path().join("a.mp4"));
    let mut list = BatchList::new(MediaKind::Video);

    list.add(&a);
    list.add(&a);
    // Same file through a different spelling of the path
    list.add(dir.path().join(".").join("a.mp4"));

    assert_eq!(list.len(), 1);
}

#[test]
fn test_fifty_first_path_is_ignored() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::new(MediaKind::Image);
    let paths: Vec<PathBuf> = (0..51)
        .map(|i| touch(&dir.path().join(format!("img{i}.png"))))
        .collect();

    let added = list.add_all(&paths);

    assert_eq!(added.len(), 50);
    assert_eq!(list.len(), 50);
    assert!(!list.contains_path(&std::fs::canonicalize(&paths[50]).unwrap()));
}

#[test]
fn test_configured_capacity() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::with_capacity(MediaKind::Audio, 2);
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        list.add(touch(&dir.path().join(name)));
    }
    assert_eq!(list.len(), 2);
}

#[test]
fn test_global_mp3_to_wav() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::new(MediaKind::Audio);
    let id = list.add(touch(&dir.path().join("a.mp3"))).unwrap();

    list.set_global_conversion("mp3 → wav");

    let entry = list.get(id).unwrap();
    assert_eq!(entry.choice.as_ref().unwrap().label(), "mp3 → wav");
    assert_eq!(entry.status, EntryStatus::Pending);
}

#[test]
fn test_progress_is_monotonic_during_run() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::new(MediaKind::Image);
    for i in 0..4 {
        common::write_image(&dir.path().join(format!("p{i}.png")), 4, 4);
        list.add(dir.path().join(format!("p{i}.png")));
    }
    list.set_global_conversion("bmp");

    let mut started = 0;
    let mut seen = Vec::new();
    let summary = list.convert_all_with_progress(&Invoker::default(), |step| match step {
        BatchStep::Started(_) => started += 1,
        BatchStep::Finished(_, progress) => seen.push(progress),
    });

    assert_eq!(summary.done, 4);
    assert_eq!(started, 4);
    assert_eq!(seen, [25, 50, 75, 100]);
    assert_eq!(list.progress(), 100);
}

#[test]
fn test_controller_convert_all_reports_progress_in_order() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| {
            let path = dir.path().join(format!("p{i}.png"));
            common::write_image(&path, 4, 4);
            path
        })
        .collect();

    let mut controller = Controller::new(MediaKind::Image, 50, Invoker::default());
    controller.dispatch(Message::AddFiles(paths)).unwrap();
    controller
        .dispatch(Message::SetGlobalTarget("bmp".to_string()))
        .unwrap();

    let events = controller.dispatch(Message::ConvertAll).unwrap();

    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            Event::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress, [25, 50, 75, 100]);
    assert_matches!(events[0], Event::Started(_));
    assert_matches!(events[1], Event::Finished(_, EntryStatus::Done));
    assert_eq!(
        events.last(),
        Some(&Event::BatchFinished(BatchSummary { done: 4, failed: 0 }))
    );
}

#[test]
fn test_global_label_leaves_other_sources_alone() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::new(MediaKind::Audio);
    let mp3 = list.add(touch(&dir.path().join("a.mp3"))).unwrap();
    let ogg = list.add(touch(&dir.path().join("b.ogg"))).unwrap();

    assert_eq!(list.set_global_conversion("mp3 → wav"), 1);

    assert_eq!(list.get(mp3).unwrap().choice.as_ref().unwrap().label(), "mp3 → wav");
    assert_eq!(list.get(ogg).unwrap().choice.as_ref().unwrap().label(), "ogg → mp3");
}

#[test]
fn test_failure_does_not_stop_batch() {
    let dir = tempdir().unwrap();
    let mut list = BatchList::new(MediaKind::Image);
    // Not a decodable PNG
    let broken = list.add(touch(&dir.path().join("broken.png"))).unwrap();
    common::write_image(&dir.path().join("ok.png"), 4, 4);
    let ok = list.add(dir.path().join("ok.png")).unwrap();
    list.set_global_conversion("webp");

    let summary = list.convert_all(&Invoker::default());

    assert_eq!(summary.done, 1);
    assert_eq!(summary.failed, 1);
    assert_matches!(list.get(broken).unwrap().status, EntryStatus::Failed(_));
    assert_eq!(list.get(ok).unwrap().status, EntryStatus::Done);
    assert_eq!(list.progress(), 50);
    assert!(!dir.path().join("broken_converted.webp").exists());
}

#[test]
fn test_remove_out_of_range() {
    let mut list = BatchList::new(MediaKind::Pdf);
    assert_matches!(list.remove(0), Err(BatchError::IndexOutOfRange { index: 0, len: 0 }));
}
