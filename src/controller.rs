//! Message/event dispatch between a view and one batch list.
//!
//! Views never hold row indices: every message that targets an entry names
//! it by [`EntryId`], so reordering or removing rows cannot redirect an
//! action to the wrong file.

use crate::batch::{BatchError, BatchList, BatchStep, BatchSummary, EntryOptions, EntryStatus};
use crate::convert::Invoker;
use crate::registry::ConversionChoice;
use formshift_common::{EntryId, MediaKind};
use std::path::PathBuf;

/// Requests sent by a view.
#[derive(Debug, Clone)]
pub enum Message {
    AddFiles(Vec<PathBuf>),
    Remove(EntryId),
    Clear,
    /// Target name or full `from → to` label applied to every entry.
    SetGlobalTarget(String),
    SetChoice(EntryId, String),
    SetOptions(EntryId, EntryOptions),
    Convert(EntryId),
    ConvertAll,
}

/// Notifications emitted while handling a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Added(EntryId),
    Removed(EntryId),
    Cleared,
    ChoiceChanged(EntryId, ConversionChoice),
    OptionsChanged(EntryId),
    Started(EntryId),
    Finished(EntryId, EntryStatus),
    /// Percentage of entries done.
    Progress(u8),
    BatchFinished(BatchSummary),
}

/// Owns the batch list of one screen and the invoker that converts it.
pub struct Controller {
    batch: BatchList,
    invoker: Invoker,
}

impl Controller {
    pub fn new(kind: MediaKind, capacity: usize, invoker: Invoker) -> Self {
        Self {
            batch: BatchList::with_capacity(kind, capacity),
            invoker,
        }
    }

    pub fn batch(&self) -> &BatchList {
        &self.batch
    }

    /// Handle `message` and collect the events it produced.
    pub fn dispatch(&mut self, message: Message) -> Result<Vec<Event>, BatchError> {
        let mut events = Vec::new();
        self.dispatch_with(message, |e| events.push(e))?;
        Ok(events)
    }

    /// Handle `message`, delivering events to `emit` as they happen.
    pub fn dispatch_with<F>(&mut self, message: Message, mut emit: F) -> Result<(), BatchError>
    where
        F: FnMut(Event),
    {
        match message {
            Message::AddFiles(paths) => {
                for id in self.batch.add_all(paths) {
                    emit(Event::Added(id));
                }
            }
            Message::Remove(id) => {
                self.batch.remove_id(id)?;
                emit(Event::Removed(id));
                emit(Event::Progress(self.batch.progress()));
            }
            Message::Clear => {
                self.batch.clear();
                emit(Event::Cleared);
                emit(Event::Progress(0));
            }
            Message::SetGlobalTarget(target) => {
                let before: Vec<_> = self
                    .batch
                    .entries()
                    .iter()
                    .map(|e| (e.id, e.choice.clone()))
                    .collect();
                self.batch.set_global_conversion(&target);
                for (id, old) in before {
                    if let Some(entry) = self.batch.get(id) {
                        if entry.choice != old {
                            if let Some(choice) = entry.choice.clone() {
                                emit(Event::ChoiceChanged(id, choice));
                            }
                        }
                    }
                }
            }
            Message::SetChoice(id, label) => {
                let choice = self.batch.set_choice(id, &label)?;
                emit(Event::ChoiceChanged(id, choice));
            }
            Message::SetOptions(id, options) => {
                self.batch.set_options(id, options)?;
                emit(Event::OptionsChanged(id));
            }
            Message::Convert(id) => {
                emit(Event::Started(id));
                let status = self.batch.convert(id, &self.invoker)?.status.clone();
                emit(Event::Finished(id, status));
                emit(Event::Progress(self.batch.progress()));
            }
            Message::ConvertAll => {
                let summary = self
                    .batch
                    .convert_all_with_progress(&self.invoker, |step| match step {
                        BatchStep::Started(entry) => emit(Event::Started(entry.id)),
                        BatchStep::Finished(entry, progress) => {
                            emit(Event::Finished(entry.id, entry.status.clone()));
                            emit(Event::Progress(progress));
                        }
                    });
                emit(Event::BatchFinished(summary));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn controller() -> Controller {
        Controller::new(MediaKind::Audio, 50, Invoker::default())
    }

    #[test]
    fn test_add_and_remove_by_id() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        let b = dir.path().join("b.mp3");
        std::fs::write(&a, b"1").unwrap();
        std::fs::write(&b, b"2").unwrap();

        let mut c = controller();
        let events = c.dispatch(Message::AddFiles(vec![a.clone(), b, a])).unwrap();
        assert_eq!(events.len(), 2);

        let Event::Added(first) = events[0] else {
            panic!("expected Added, got {:?}", events[0]);
        };
        let events = c.dispatch(Message::Remove(first)).unwrap();
        assert_eq!(events, [Event::Removed(first), Event::Progress(0)]);
        assert_eq!(c.batch().len(), 1);
        assert_eq!(c.batch().entries()[0].file_name(), "b.mp3");

        assert!(matches!(
            c.dispatch(Message::Remove(first)),
            Err(BatchError::UnknownEntry(_))
        ));
    }

    #[test]
    fn test_global_target_reports_changes() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        let b = dir.path().join("b.flac");
        std::fs::write(&a, b"1").unwrap();
        std::fs::write(&b, b"2").unwrap();

        let mut c = controller();
        c.dispatch(Message::AddFiles(vec![a, b])).unwrap();
        let events = c.dispatch(Message::SetGlobalTarget("mp3 → flac".into())).unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::ChoiceChanged(_, choice) if choice.label() == "mp3 → flac"));
    }

    #[test]
    fn test_global_label_reports_only_matching_entries() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        let b = dir.path().join("b.ogg");
        std::fs::write(&a, b"1").unwrap();
        std::fs::write(&b, b"2").unwrap();

        let mut c = controller();
        c.dispatch(Message::AddFiles(vec![a, b])).unwrap();
        let events = c.dispatch(Message::SetGlobalTarget("mp3 → wav".into())).unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::ChoiceChanged(_, choice) if choice.label() == "mp3 → wav"));
        let ogg = &c.batch().entries()[1];
        assert_eq!(ogg.choice.as_ref().unwrap().label(), "ogg → mp3");
    }

    #[test]
    fn test_convert_all_without_choice_fails_each_entry() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        std::fs::write(&a, b"1").unwrap();

        let mut c = controller();
        let added = c.dispatch(Message::AddFiles(vec![a])).unwrap();
        let Event::Added(id) = added[0] else { panic!() };
        // Detach the choice to force a failure without external tools.
        c.batch.get_mut(id).unwrap().choice = None;

        let events = c.dispatch(Message::ConvertAll).unwrap();
        assert_eq!(events.first(), Some(&Event::Started(id)));
        assert!(matches!(events[1], Event::Finished(_, EntryStatus::Failed(_))));
        assert_eq!(
            events.last(),
            Some(&Event::BatchFinished(BatchSummary { done: 0, failed: 1 }))
        );
    }
}
