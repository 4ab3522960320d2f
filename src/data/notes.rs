use crate::data::persistence::KeyValueStore;
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store key holding the serialized note mapping.
pub const NOTES_KEY: &str = "calEvents";

/// Date-keyed calendar notes. A key is present only while its note is
/// non-empty; clearing a note removes the key.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct NoteMap {
    notes: BTreeMap<String, String>,
}

impl NoteMap {
    /// Reads the mapping from `store`. A missing or unparseable value yields
    /// an empty mapping.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(NOTES_KEY) {
            Some(raw) => raw,
            None => return Self::default(),
        };
        match serde_json::from_str::<NoteMap>(&raw) {
            Ok(mut map) => {
                map.notes.retain(|_, text| !text.trim().is_empty());
                map
            }
            Err(e) => {
                warn!("event=notes_load status=corrupt key={} error={}", NOTES_KEY, e);
                Self::default()
            }
        }
    }

    /// Writes the whole mapping under `NOTES_KEY`, replacing any prior value.
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self).context("failed to serialize notes")?;
        store.set(NOTES_KEY, json)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.notes.contains_key(key)
    }

    /// Stores the trimmed text, or removes the key when nothing is left.
    /// Returns true when a note was stored.
    pub fn set(&mut self, key: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(key);
            false
        } else {
            self.notes.insert(key.to_string(), text.to_string());
            true
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.notes.remove(key);
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::persistence::MemoryStore;

    #[test]
    fn test_set_stores_trimmed_text() {
        let mut notes = NoteMap::default();
        assert!(notes.set("2024-03-05", "  Dentist \n"));
        assert_eq!(notes.get("2024-03-05"), Some("Dentist"));
    }

    #[test]
    fn test_set_blank_removes_key() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "Dentist");
        assert!(!notes.set("2024-03-05", "   "));
        assert!(!notes.contains("2024-03-05"));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_set_blank_on_missing_key_is_noop() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "");
        assert!(notes.is_empty());
    }

    #[test]
    fn test_set_overwrites_existing_note() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "Dentist");
        notes.set("2024-03-05", "Doctor");
        assert_eq!(notes.get("2024-03-05"), Some("Doctor"));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut notes = NoteMap::default();
        notes.remove("2024-03-05");
        assert!(notes.is_empty());
    }

    #[test]
    fn test_load_missing_value_is_empty() {
        let store = MemoryStore::default();
        assert!(NoteMap::load(&store).is_empty());
    }

    #[test]
    fn test_load_corrupt_value_is_empty() {
        let mut store = MemoryStore::default();
        store.set(NOTES_KEY, "{not json".to_string()).unwrap();
        assert!(NoteMap::load(&store).is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let mut store = MemoryStore::default();
        store.set(NOTES_KEY, "[1, 2, 3]".to_string()).unwrap();
        assert!(NoteMap::load(&store).is_empty());
    }

    #[test]
    fn test_load_drops_empty_entries() {
        let mut store = MemoryStore::default();
        store
            .set(NOTES_KEY, r#"{"2024-03-05":"Dentist","2024-03-06":""}"#.to_string())
            .unwrap();
        let notes = NoteMap::load(&store);
        assert_eq!(notes.len(), 1);
        assert!(!notes.contains("2024-03-06"));
    }

    #[test]
    fn test_persist_writes_flat_object() {
        let mut store = MemoryStore::default();
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "Dentist");
        notes.persist(&mut store).unwrap();
        assert_eq!(store.last_write(), Some((NOTES_KEY, r#"{"2024-03-05":"Dentist"}"#)));
        assert_eq!(NoteMap::load(&store), notes);
    }

    #[test]
    fn test_iter_is_date_ordered() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-10", "B");
        notes.set("2024-01-02", "A");
        let keys: Vec<&str> = notes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["2024-01-02", "2024-03-10"]);
    }
}
