//! Task records and the in-memory task store.
//!
//! The store is an ordered list, newest first. It never holds two tasks with
//! the same id and never holds a task with a blank title.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

const ULID_LEN: usize = 26;
const ULID_RANDOM_LEN: usize = 16;
const ID_ATTEMPTS_PER_LEN: usize = 8;
const DEFAULT_ID_LEN: usize = 8;

/// One to-do entry, in its persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl Task {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at)
    }
}

/// Result of [`TaskStore::edit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Renamed,
    Unchanged,
    /// The new title was blank, so the task was removed
    Deleted(Task),
    Missing,
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    id_len: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LEN)
    }
}

impl TaskStore {
    pub fn new(id_len: usize) -> Self {
        Self {
            tasks: Vec::new(),
            id_len: id_len.clamp(1, ULID_RANDOM_LEN),
        }
    }

    /// Build a store from loaded tasks, keeping the first task for any
    /// repeated id and dropping blank titles.
    pub fn from_tasks(tasks: Vec<Task>, id_len: usize) -> Self {
        let mut store = Self::new(id_len);
        let mut seen = HashSet::new();
        for task in tasks {
            if task.title.trim().is_empty() {
                tracing::warn!(id = %task.id, "dropping task with blank title");
                continue;
            }
            if !seen.insert(task.id.clone()) {
                tracing::warn!(id = %task.id, "dropping task with duplicate id");
                continue;
            }
            store.tasks.push(task);
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of tasks not yet completed
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    /// Add a task at the front, stamped with the current time.
    ///
    /// Returns `None` (and changes nothing) when the trimmed title is empty.
    pub fn add(&mut self, title: &str) -> Option<&Task> {
        self.add_at(title, Utc::now().timestamp_millis())
    }

    pub fn add_at(&mut self, title: &str, created_at: i64) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let task = Task {
            id: self.generate_id(),
            title: title.to_string(),
            completed: false,
            created_at,
        };
        self.tasks.insert(0, task);
        self.tasks.first()
    }

    /// Set the completed flag.
    ///
    /// `None` when the id is unknown, otherwise whether the flag changed.
    pub fn toggle(&mut self, id: &str, completed: bool) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        let changed = task.completed != completed;
        task.completed = completed;
        Some(changed)
    }

    /// Replace a title; a blank title deletes the task.
    pub fn edit(&mut self, id: &str, new_title: &str) -> EditOutcome {
        let Some(pos) = self.position(id) else {
            return EditOutcome::Missing;
        };
        let title = new_title.trim();
        if title.is_empty() {
            return EditOutcome::Deleted(self.tasks.remove(pos));
        }
        let task = &mut self.tasks[pos];
        if task.title == title {
            return EditOutcome::Unchanged;
        }
        task.title = title.to_string();
        EditOutcome::Renamed
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let pos = self.position(id)?;
        Some(self.tasks.remove(pos))
    }

    /// Remove every completed task; returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    /// Ids starting with `prefix`, in store order. An exact match wins.
    pub fn ids_matching(&self, prefix: &str) -> Vec<String> {
        if self.contains(prefix) {
            return vec![prefix.to_string()];
        }
        self.tasks
            .iter()
            .filter(|task| task.id.starts_with(prefix))
            .map(|task| task.id.clone())
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Draw ids from the random section of a ULID, lengthening the id when
    /// collisions keep happening.
    fn generate_id(&self) -> String {
        let mut len = self.id_len;
        loop {
            for _ in 0..ID_ATTEMPTS_PER_LEN {
                let candidate = random_suffix(len);
                if !self.contains(&candidate) {
                    return candidate;
                }
            }
            len = (len + 1).min(ULID_RANDOM_LEN);
        }
    }
}

fn random_suffix(len: usize) -> String {
    let ulid = Ulid::new().to_string().to_ascii_lowercase();
    ulid[ULID_LEN - len..].to_string()
}
