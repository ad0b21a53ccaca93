//! Application state and the action dispatcher.
//!
//! Front ends translate user input into an [`Action`]; [`App::dispatch`]
//! applies it to the store/filter, saves the store when it changed and hands
//! back a freshly rendered [`View`].

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::filter::Filter;
use crate::render::{self, View};
use crate::repository::TaskRepository;
use crate::storage::Storage;
use crate::task::{EditOutcome, TaskStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { title: String },
    Toggle { id: String, completed: bool },
    Edit { id: String, text: String },
    Delete { id: String },
    SetFilter { filter: Filter },
    ClearCompleted,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add { .. } => "add",
            Action::Toggle { .. } => "toggle",
            Action::Edit { .. } => "edit",
            Action::Delete { .. } => "delete",
            Action::SetFilter { .. } => "set_filter",
            Action::ClearCompleted => "clear_completed",
        }
    }

    /// Filter changes are view-only and never persisted.
    pub fn touches_store(&self) -> bool {
        !matches!(self, Action::SetFilter { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl ActionOutcome {
    fn changed(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
            task_id,
        }
    }

    fn unchanged(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
            task_id,
        }
    }
}

/// State transition for one action. No I/O.
pub fn apply(store: &mut TaskStore, filter: &mut Filter, action: Action) -> ActionOutcome {
    match action {
        Action::Add { title } => match store.add(&title) {
            Some(task) => ActionOutcome::changed(format!("added {}", task.id), Some(task.id.clone())),
            None => ActionOutcome::unchanged("title is blank; nothing added", None),
        },
        Action::Toggle { id, completed } => match store.toggle(&id, completed) {
            Some(true) => {
                let state = if completed { "completed" } else { "active" };
                ActionOutcome::changed(format!("marked {id} {state}"), Some(id))
            }
            Some(false) => ActionOutcome::unchanged(format!("{id} already in that state"), Some(id)),
            None => ActionOutcome::unchanged(format!("no task {id}"), None),
        },
        Action::Edit { id, text } => match store.edit(&id, &text) {
            EditOutcome::Renamed => ActionOutcome::changed(format!("renamed {id}"), Some(id)),
            EditOutcome::Deleted(_) => {
                ActionOutcome::changed(format!("deleted {id} (blank title)"), Some(id))
            }
            EditOutcome::Unchanged => ActionOutcome::unchanged("no changes", Some(id)),
            EditOutcome::Missing => ActionOutcome::unchanged(format!("no task {id}"), None),
        },
        Action::Delete { id } => match store.delete(&id) {
            Some(_) => ActionOutcome::changed(format!("deleted {id}"), Some(id)),
            None => ActionOutcome::unchanged(format!("no task {id}"), None),
        },
        Action::SetFilter { filter: next } => {
            let changed = *filter != next;
            *filter = next;
            ActionOutcome {
                changed,
                message: format!("showing {next}"),
                task_id: None,
            }
        }
        Action::ClearCompleted => match store.clear_completed() {
            0 => ActionOutcome::unchanged("no completed tasks", None),
            removed => ActionOutcome::changed(format!("cleared {removed} completed"), None),
        },
    }
}

/// Result of a dispatched action: what happened, and the view to draw.
#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    pub outcome: ActionOutcome,
    pub view: View,
}

pub struct App {
    store: TaskStore,
    filter: Filter,
    repo: TaskRepository,
}

impl App {
    pub fn new(repo: TaskRepository, store: TaskStore, filter: Filter) -> Self {
        Self {
            store,
            filter,
            repo,
        }
    }

    /// Load the store from its slot.
    pub fn open(repo: TaskRepository, id_len: usize, filter: Filter) -> Result<Self> {
        let store = TaskStore::from_tasks(repo.load()?, id_len);
        tracing::debug!(key = repo.key(), tasks = store.len(), "opened task store");
        Ok(Self::new(repo, store, filter))
    }

    /// Open the store described by `config`, with an optional data dir override.
    pub fn from_config(config: &Config, dir: Option<&Path>) -> Result<Self> {
        let data_dir = config.data_dir(dir)?;
        let storage = Storage::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        let repo = TaskRepository::new(storage, config.storage.key.clone());
        let filter = config.ui.default_filter()?;
        Self::open(repo, config.tasks.id_len, filter)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn repository(&self) -> &TaskRepository {
        &self.repo
    }

    pub fn view(&self) -> View {
        render::render(&self.store, self.filter)
    }

    /// Apply, persist if the store changed, then render.
    pub fn dispatch(&mut self, action: Action) -> Result<Dispatched> {
        let name = action.name();
        let persist = action.touches_store();
        let outcome = apply(&mut self.store, &mut self.filter, action);
        tracing::debug!(action = name, changed = outcome.changed, "dispatched");

        if persist && outcome.changed {
            self.repo.save(self.store.tasks())?;
        }

        Ok(Dispatched {
            outcome,
            view: self.view(),
        })
    }

    /// Replace the in-memory store with whatever is in the slot now.
    /// On error the current store is kept.
    pub fn reload(&mut self, id_len: usize) -> Result<()> {
        self.store = TaskStore::from_tasks(self.repo.load()?, id_len);
        Ok(())
    }
}
