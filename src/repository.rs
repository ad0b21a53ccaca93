//! Persistence adapter between the task store and its storage slot.
//!
//! The slot holds a JSON array of tasks. A missing slot, undecodable bytes,
//! invalid JSON or a non-array value all load as an empty list, and array
//! entries that are not tasks are skipped one by one. Failing to read the slot
//! at all (I/O error, lock timeout) is an error, so a later save cannot
//! overwrite data that was never seen.

use serde_json::Value;

use crate::error::Result;
use crate::storage::Storage;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct TaskRepository {
    storage: Storage,
    key: String,
}

impl TaskRepository {
    pub fn new(storage: Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize the full list into the slot.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        self.storage.set_item(&self.key, &json)
    }

    /// Read the list back; bad content degrades to an empty list.
    pub fn load(&self) -> Result<Vec<Task>> {
        match self.storage.get_raw(&self.key)? {
            Some(raw) => Ok(decode_tasks(raw)),
            None => Ok(Vec::new()),
        }
    }
}

/// Decode a slot value, tolerating anything that is not a task array.
pub fn decode_tasks(raw: impl AsRef<[u8]>) -> Vec<Task> {
    let value: Value = match serde_json::from_slice(raw.as_ref()) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "task slot is not valid JSON; starting empty");
            return Vec::new();
        }
    };
    let Value::Array(entries) = value else {
        tracing::warn!("task slot does not hold an array; starting empty");
        return Vec::new();
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Task>(entry) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(index, %err, "skipping malformed task entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(dir: &std::path::Path) -> TaskRepository {
        TaskRepository::new(Storage::new(dir.to_path_buf()), "todos.v1")
    }

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: "k2j9x0aa".to_string(),
                title: "write report".to_string(),
                completed: false,
                created_at: 1_714_000_000_500,
            },
            Task {
                id: "p0q1r2s3".to_string(),
                title: "buy milk".to_string(),
                completed: true,
                created_at: 1_714_000_000_000,
            },
        ]
    }

    #[test]
    fn save_then_load_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        repo.save(&sample()).unwrap();
        assert_eq!(repo.load().unwrap(), sample());
    }

    #[test]
    fn missing_slot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(repo(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        for raw in ["{not json", "", "{\"id\":\"a\"}", "42", "null", "\"[]\""] {
            repo.storage().set_item(repo.key(), raw).unwrap();
            assert!(repo.load().unwrap().is_empty(), "expected empty for {raw:?}");
        }
        std::fs::write(repo.storage().slot_path(repo.key()), [0xff, 0x5b, 0x5d]).unwrap();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn read_failure_is_not_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        std::fs::create_dir(repo.storage().slot_path(repo.key())).unwrap();
        assert!(matches!(repo.load(), Err(crate::error::Error::Io(_))));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = r#"[
            {"id":"a","title":"A","completed":false,"createdAt":1},
            {"id":"b","title":"B"},
            7,
            {"id":"c","title":"C","completed":true,"createdAt":3}
        ]"#;
        let tasks = decode_tasks(raw);
        let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn reads_slot_written_by_other_producers() {
        let raw = r#"[{"id":"x1","title":"compact","completed":false,"createdAt":1700000000000}]"#;
        let tasks = decode_tasks(raw);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].created_at, 1_700_000_000_000);
    }
}
