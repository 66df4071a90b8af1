use crate::cycle::Cycle;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// StateDocument
// ---------------------------------------------------------------------------

/// On-disk layout: `{"song": <cycle or null>}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub song: Option<Cycle>,
}

// ---------------------------------------------------------------------------
// CycleStore
// ---------------------------------------------------------------------------

/// Single-document persistence for the live cycle. Every command loads the
/// whole document and saves it back in full.
pub trait CycleStore {
    /// `None` when there is no cycle or the document cannot be read.
    fn load(&self) -> Option<Cycle>;

    fn save(&self, cycle: &Cycle) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StateDocument> {
        let Some(data) = crate::io::read_if_exists(&self.path)? else {
            return Ok(StateDocument::default());
        };
        let doc: StateDocument = serde_json::from_str(&data)?;
        if let Some(cycle) = &doc.song {
            cycle.validate()?;
        }
        Ok(doc)
    }
}

impl CycleStore for JsonFileStore {
    fn load(&self) -> Option<Cycle> {
        match self.read_document() {
            Ok(doc) => doc.song,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "state document unreadable, treating as empty"
                );
                None
            }
        }
    }

    fn save(&self, cycle: &Cycle) -> Result<()> {
        let doc = StateDocument {
            song: Some(cycle.clone()),
        };
        let data = serde_json::to_string_pretty(&doc)?;
        crate::io::atomic_write(&self.path, data.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cycle: Mutex<Option<Cycle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cycle(cycle: Cycle) -> Self {
        Self {
            cycle: Mutex::new(Some(cycle)),
        }
    }
}

impl CycleStore for MemoryStore {
    fn load(&self) -> Option<Cycle> {
        self.cycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, cycle: &Cycle) -> Result<()> {
        *self
            .cycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cycle.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::SONG_STAGES;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample() -> Cycle {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let mut cycle = Cycle::create(Some("Лето".into()), 30, start, &SONG_STAGES).unwrap();
        cycle.mark_complete("Сочинение");
        cycle
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data/state.json"));
        let cycle = sample();
        store.save(&cycle).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, cycle);
        assert!(loaded.stages[0].completed);
    }

    #[test]
    fn file_store_writes_song_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        JsonFileStore::new(&path).save(&sample()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["song"]["name"], "Лето");
        assert_eq!(raw["song"]["schedule"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn missing_file_means_no_cycle() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn null_song_means_no_cycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"song": null}"#).unwrap();
        assert!(JsonFileStore::new(&path).load().is_none());

        std::fs::write(&path, "{}").unwrap();
        assert!(JsonFileStore::new(&path).load().is_none());
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load().is_none());

        // A save after corruption replaces the document.
        store.save(&sample()).unwrap();
        assert!(store.load().is_some());
    }

    #[test]
    fn reads_hand_written_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{
              "song": {
                "name": null,
                "start_date": "2025-05-01",
                "total_days": 7,
                "created_at": "2025-05-01T09:30:00Z",
                "schedule": [
                  {"name": "Сочинение", "days": 2, "start_offset": 1, "end_offset": 2, "completed": true},
                  {"name": "Демо", "days": 1, "start_offset": 3, "end_offset": 3, "completed": false},
                  {"name": "Аранжировка", "days": 2, "start_offset": 4, "end_offset": 5, "completed": false},
                  {"name": "Запись", "days": 1, "start_offset": 6, "end_offset": 6, "completed": false},
                  {"name": "Сведение и мастеринг", "days": 1, "start_offset": 7, "end_offset": 7, "completed": false}
                ]
              }
            }"#,
        )
        .unwrap();

        let cycle = JsonFileStore::new(&path).load().unwrap();
        assert!(cycle.project_name.is_none());
        assert_eq!(cycle.total_days, 7);
        assert_eq!(cycle.completed_count(), 1);
        assert_eq!(cycle.locate_stage(4).unwrap().label, "Аранжировка");
    }

    #[test]
    fn structurally_invalid_document_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::new(&path);

        std::fs::write(
            &path,
            r#"{"song": {"name": "x", "start_date": "2025-01-01", "total_days": 0,
                "created_at": "2025-01-01T00:00:00Z", "schedule": []}}"#,
        )
        .unwrap();
        assert!(store.load().is_none());

        // Offsets that skip day 3.
        std::fs::write(
            &path,
            r#"{"song": {"name": "x", "start_date": "2025-01-01", "total_days": 4,
                "created_at": "2025-01-01T00:00:00Z", "schedule": [
                  {"name": "a", "days": 2, "start_offset": 1, "end_offset": 2},
                  {"name": "b", "days": 1, "start_offset": 4, "end_offset": 4}
                ]}}"#,
        )
        .unwrap();
        assert!(store.load().is_none());

        assert!(matches!(
            store.read_document(),
            Err(crate::MnemonoError::InvalidCycle(_))
        ));
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap().project_name.as_deref(), Some("Лето"));
    }
}
