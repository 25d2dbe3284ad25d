use super::EditError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Name of the deleted-index array in the sidecar.
///
/// Page-based sources write `deleted_pages`, image sets `deleted_indices`.
/// Either is accepted on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletedKey {
    #[default]
    Pages,
    Indices,
}

impl DeletedKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletedKey::Pages => "deleted_pages",
            DeletedKey::Indices => "deleted_indices",
        }
    }
}

/// Rotation angles and deletions for the pages or images of one source.
///
/// Indices are 0-based positions. Angles are counter-clockwise degrees in
/// `{0, 90, 180, 270}`. Indices beyond the current page count are kept as
/// loaded and ignored when the state is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    rotation_angles: BTreeMap<usize, u16>,
    deleted: BTreeSet<usize>,
}

#[derive(Deserialize)]
struct Sidecar {
    #[serde(default)]
    rotation_angles: BTreeMap<String, i64>,
    #[serde(default, alias = "deleted_indices")]
    deleted_pages: Vec<i64>,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current angle of `index` (0 when never rotated).
    pub fn angle(&self, index: usize) -> u16 {
        self.rotation_angles.get(&index).copied().unwrap_or(0)
    }

    pub fn rotation_angles(&self) -> &BTreeMap<usize, u16> {
        &self.rotation_angles
    }

    pub fn deleted(&self) -> &BTreeSet<usize> {
        &self.deleted
    }

    pub fn is_deleted(&self, index: usize) -> bool {
        self.deleted.contains(&index)
    }

    /// Rotate `index` by `delta` degrees (positive is counter-clockwise).
    pub fn rotate(&mut self, index: usize, delta: i32) -> Result<u16, EditError> {
        if delta % 90 != 0 {
            return Err(EditError::InvalidRotation(delta));
        }
        let angle = (i32::from(self.angle(index)) + delta).rem_euclid(360) as u16;
        self.rotation_angles.insert(index, angle);
        Ok(angle)
    }

    pub fn delete(&mut self, index: usize) {
        self.deleted.insert(index);
    }

    /// Bring back every deleted index. Rotations are kept.
    pub fn restore_all(&mut self) {
        self.deleted.clear();
    }

    /// Indices in `0..count` that survive deletion, in order.
    pub fn retained(&self, count: usize) -> impl Iterator<Item = usize> + '_ {
        (0..count).filter(move |i| !self.deleted.contains(i))
    }

    /// Recorded indices that do not exist in a source of `count` pages.
    pub fn stale_indices(&self, count: usize) -> Vec<usize> {
        self.rotation_angles
            .keys()
            .chain(self.deleted.iter())
            .copied()
            .filter(|i| *i >= count)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Parse sidecar JSON. Keys that are not indices and angles that are not
    /// multiples of 90 are skipped.
    pub fn from_json(text: &str) -> Result<Self, EditError> {
        let raw: Sidecar = serde_json::from_str(text)?;
        let mut state = EditState::new();

        for (key, angle) in raw.rotation_angles {
            match key.trim().parse::<usize>() {
                Ok(index) if angle % 90 == 0 => {
                    state
                        .rotation_angles
                        .insert(index, angle.rem_euclid(360) as u16);
                }
                _ => tracing::warn!("Skipping rotation entry {:?}: {}", key, angle),
            }
        }
        for index in raw.deleted_pages {
            match usize::try_from(index) {
                Ok(index) => {
                    state.deleted.insert(index);
                }
                Err(_) => tracing::warn!("Skipping deleted index {}", index),
            }
        }
        Ok(state)
    }

    /// Serialize with string keys for the angles, as the sidecar format requires.
    pub fn to_json(&self, key: DeletedKey) -> Result<String, EditError> {
        let angles: serde_json::Map<String, serde_json::Value> = self
            .rotation_angles
            .iter()
            .map(|(i, a)| (i.to_string(), serde_json::Value::from(*a)))
            .collect();
        let deleted: Vec<usize> = self.deleted.iter().copied().collect();

        let mut doc = serde_json::Map::new();
        doc.insert("rotation_angles".to_string(), angles.into());
        doc.insert(key.as_str().to_string(), deleted.into());
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(doc))?)
    }

    /// Read a sidecar, propagating every failure.
    pub fn try_load(path: &Path) -> Result<Self, EditError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Read a sidecar. A missing or unparseable file yields an empty state.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring unreadable sidecar {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path, key: DeletedKey) -> Result<(), EditError> {
        std::fs::write(path, self.to_json(key)?)?;
        tracing::debug!("Saved edit state to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rotate_four_times_is_identity() {
        let mut state = EditState::new();
        state.rotate(2, 180).unwrap();
        for _ in 0..4 {
            state.rotate(2, 90).unwrap();
        }
        assert_eq!(state.angle(2), 180);
    }

    #[test]
    fn test_rotate_negative_wraps() {
        let mut state = EditState::new();
        assert_eq!(state.rotate(0, -90).unwrap(), 270);
        assert!(matches!(state.rotate(0, 45), Err(EditError::InvalidRotation(45))));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan_state.json");
        let mut state = EditState::new();
        state.rotate(0, 90).unwrap();
        state.rotate(3, 270).unwrap();
        state.delete(1);

        state.save(&path, DeletedKey::Pages).unwrap();
        assert_eq!(EditState::load(&path), state);
    }

    #[test]
    fn test_sidecar_format() {
        let mut state = EditState::new();
        state.rotate(1, 90).unwrap();
        state.delete(2);
        let value: serde_json::Value =
            serde_json::from_str(&state.to_json(DeletedKey::Indices).unwrap()).unwrap();
        assert_eq!(value["rotation_angles"]["1"], 90);
        assert_eq!(value["deleted_indices"], serde_json::json!([2]));
        assert!(value.get("deleted_pages").is_none());
    }

    #[test]
    fn test_load_accepts_either_deleted_key() {
        let pages = EditState::from_json(r#"{"rotation_angles": {}, "deleted_pages": [1]}"#).unwrap();
        let images = EditState::from_json(r#"{"deleted_indices": [1]}"#).unwrap();
        assert_eq!(pages, images);
        assert!(pages.is_deleted(1));
    }

    #[test]
    fn test_load_missing_or_corrupt_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(EditState::load(&dir.path().join("absent.json")), EditState::default());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert_eq!(EditState::load(&corrupt), EditState::default());
        assert!(EditState::try_load(&corrupt).is_err());
    }

    #[test]
    fn test_bad_entries_skipped() {
        let state =
            EditState::from_json(r#"{"rotation_angles": {"x": 90, "1": 45, "2": -90}, "deleted_pages": [-1, 4]}"#)
                .unwrap();
        assert_eq!(state.rotation_angles().len(), 1);
        assert_eq!(state.angle(2), 270);
        assert_eq!(state.deleted().iter().copied().collect::<Vec<_>>(), [4]);
    }

    #[test]
    fn test_retained_and_stale() {
        let mut state = EditState::new();
        state.delete(1);
        state.delete(7);
        state.rotate(5, 90).unwrap();
        assert_eq!(state.retained(3).collect::<Vec<_>>(), [0, 2]);
        assert_eq!(state.stale_indices(3), [5, 7]);
    }
}
