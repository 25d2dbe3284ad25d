use super::{BatchError, EntryOptions, FileEntry};
use crate::convert::Invoker;
use crate::registry::{self, ConversionChoice};
use formshift_common::paths::{extension_of, has_picker_extension};
use formshift_common::{EntryId, MediaKind};
use std::path::{Path, PathBuf};

/// Maximum entries per list unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 50;

/// Outcome counts of a `convert_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub done: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.done + self.failed
    }
}

/// Global selector value applied to every entry of a list.
///
/// A full label only matches entries that offer exactly that label; a bare
/// target name matches any choice ending in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalConversion {
    Target(String),
    Choice(ConversionChoice),
}

impl GlobalConversion {
    pub fn parse(input: &str) -> Self {
        match ConversionChoice::parse(input) {
            Ok(choice) => GlobalConversion::Choice(choice),
            Err(_) => GlobalConversion::Target(input.trim().to_lowercase()),
        }
    }

    fn pick<'a>(&self, choices: &'a [ConversionChoice]) -> Option<&'a ConversionChoice> {
        match self {
            GlobalConversion::Target(target) => choices.iter().find(|c| c.to() == target),
            GlobalConversion::Choice(choice) => choices.iter().find(|c| *c == choice),
        }
    }
}

impl std::fmt::Display for GlobalConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlobalConversion::Target(target) => f.write_str(target),
            GlobalConversion::Choice(choice) => choice.fmt(f),
        }
    }
}

/// One step of a [`BatchList::convert_all_with_progress`] run.
#[derive(Debug)]
pub enum BatchStep<'a> {
    Started(&'a FileEntry),
    /// The entry after conversion and the list progress at that point.
    Finished(&'a FileEntry, u8),
}

/// Ordered entries of one media kind, deduplicated by path and capped.
#[derive(Debug, Clone)]
pub struct BatchList {
    kind: MediaKind,
    capacity: usize,
    global: Option<GlobalConversion>,
    entries: Vec<FileEntry>,
}

impl BatchList {
    pub fn new(kind: MediaKind) -> Self {
        Self::with_capacity(kind, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(kind: MediaKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            global: None,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.source_path() == path)
    }

    pub fn global_conversion(&self) -> Option<&GlobalConversion> {
        self.global.as_ref()
    }

    /// Enqueue a file. Returns `None` without touching the list when the file
    /// is already present, the list is full, the extension has no choices, or
    /// the file cannot be read.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Option<EntryId> {
        let path = path.as_ref();

        if self.entries.len() >= self.capacity {
            tracing::debug!("Batch full ({}), ignoring {:?}", self.capacity, path);
            return None;
        }

        if !has_picker_extension(self.kind, path) {
            tracing::debug!("Ignoring {:?}: not a {} file", path, self.kind);
            return None;
        }
        let ext = extension_of(path)?;
        let choices = registry::choices_for(self.kind, &ext);
        if choices.is_empty() {
            tracing::debug!("Ignoring {:?}: no conversions for .{}", path, ext);
            return None;
        }

        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                tracing::debug!("Ignoring {:?}: not a regular file", path);
                return None;
            }
            Err(e) => {
                tracing::debug!("Ignoring {:?}: {}", path, e);
                return None;
            }
        };
        let source = absolute(path);

        if self.contains_path(&source) {
            tracing::debug!("Already queued: {:?}", source);
            return None;
        }

        let mut entry = FileEntry::new(self.kind, source, metadata.len());
        entry.choice = default_choice(&choices, self.global.as_ref());
        let id = entry.id;

        tracing::info!(
            "Added {} ({})",
            entry.file_name(),
            entry.choice.as_ref().map(|c| c.label()).unwrap_or_default()
        );
        self.entries.push(entry);
        Some(id)
    }

    /// Enqueue several files, returning the ids of those accepted.
    pub fn add_all<I, P>(&mut self, paths: I) -> Vec<EntryId>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().filter_map(|p| self.add(p)).collect()
    }

    pub fn remove(&mut self, index: usize) -> Result<FileEntry, BatchError> {
        if index >= self.entries.len() {
            return Err(BatchError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn remove_id(&mut self, id: EntryId) -> Result<FileEntry, BatchError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(BatchError::UnknownEntry(id))?;
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply the global selector to every entry.
    ///
    /// Accepts a bare target (`wav`) or a full label (`mp3 → wav`). Entries
    /// without a matching choice keep their current one. Returns the number of
    /// entries updated.
    pub fn set_global_conversion(&mut self, input: &str) -> usize {
        let global = GlobalConversion::parse(input);

        let mut updated = 0;
        for entry in &mut self.entries {
            let Some(ext) = extension_of(entry.source_path()) else {
                continue;
            };
            let choices = registry::choices_for(self.kind, &ext);
            if let Some(choice) = global.pick(&choices) {
                entry.choice = Some(choice.clone());
                updated += 1;
            }
        }

        tracing::debug!("Global conversion '{}' applied to {} entries", global, updated);
        self.global = Some(global);
        updated
    }

    /// Set one entry's choice from a label, checked against the registry.
    pub fn set_choice(&mut self, id: EntryId, label: &str) -> Result<ConversionChoice, BatchError> {
        let choice = ConversionChoice::parse(label)?;
        let kind = self.kind;
        let entry = self.get_mut(id).ok_or(BatchError::UnknownEntry(id))?;
        let ext = extension_of(entry.source_path()).unwrap_or_default();
        if !registry::is_legal(kind, &ext, &choice) {
            return Err(BatchError::IllegalChoice {
                choice: choice.label(),
                file: entry.file_name(),
            });
        }
        entry.choice = Some(choice.clone());
        Ok(choice)
    }

    pub fn set_options(&mut self, id: EntryId, options: EntryOptions) -> Result<(), BatchError> {
        let entry = self.get_mut(id).ok_or(BatchError::UnknownEntry(id))?;
        entry.options = options;
        Ok(())
    }

    /// Percentage of entries whose status is `Done`; 0 for an empty list.
    pub fn progress(&self) -> u8 {
        if self.entries.is_empty() {
            return 0;
        }
        let done = self.entries.iter().filter(|e| e.status.is_done()).count();
        (done * 100 / self.entries.len()) as u8
    }

    /// Convert one entry. Failures are recorded on the entry.
    pub fn convert(&mut self, id: EntryId, invoker: &Invoker) -> Result<&FileEntry, BatchError> {
        let entry = self.get_mut(id).ok_or(BatchError::UnknownEntry(id))?;
        if let Err(e) = invoker.convert(entry) {
            tracing::debug!("{} not converted: {}", entry.file_name(), e);
        }
        Ok(&*entry)
    }

    /// Convert every entry in order. A failed entry never stops the loop.
    pub fn convert_all(&mut self, invoker: &Invoker) -> BatchSummary {
        self.convert_all_with_progress(invoker, |_| {})
    }

    /// Like [`convert_all`](Self::convert_all), reporting each entry as it
    /// starts and again once finished, with the list progress after it.
    pub fn convert_all_with_progress<F>(&mut self, invoker: &Invoker, mut on_step: F) -> BatchSummary
    where
        F: FnMut(BatchStep<'_>),
    {
        let mut summary = BatchSummary::default();
        for i in 0..self.entries.len() {
            on_step(BatchStep::Started(&self.entries[i]));
            match invoker.convert(&mut self.entries[i]) {
                Ok(_) => summary.done += 1,
                Err(e) => {
                    tracing::debug!("{} not converted: {}", self.entries[i].file_name(), e);
                    summary.failed += 1;
                }
            }
            let progress = self.progress();
            on_step(BatchStep::Finished(&self.entries[i], progress));
        }
        tracing::info!(
            "Batch finished: {} done, {} failed",
            summary.done,
            summary.failed
        );
        summary
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn default_choice(choices: &[ConversionChoice], global: Option<&GlobalConversion>) -> Option<ConversionChoice> {
    global
        .and_then(|g| g.pick(choices))
        .or_else(|| choices.first())
        .cloned()
}
