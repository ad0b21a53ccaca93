//! Pure projection of the store and filter into what a front end displays.

use serde::Serialize;

use crate::filter::{visible_tasks, Filter};
use crate::task::TaskStore;

/// One visible task. Serialized with the slot's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterTab {
    pub filter: Filter,
    pub active: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub filter: Filter,
    pub filters: Vec<FilterTab>,
    pub rows: Vec<Row>,
    pub total: usize,
    pub remaining: usize,
    pub remaining_label: String,
    pub has_completed: bool,
}

impl View {
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }
}

/// Rebuild the whole view from scratch.
pub fn render(store: &TaskStore, filter: Filter) -> View {
    let rows = visible_tasks(store.tasks(), filter)
        .into_iter()
        .map(|task| Row {
            id: task.id.clone(),
            title: task.title.clone(),
            completed: task.completed,
            created_at: task.created_at,
        })
        .collect();
    let remaining = store.remaining();

    View {
        filter,
        filters: Filter::ALL
            .iter()
            .map(|candidate| FilterTab {
                filter: *candidate,
                active: *candidate == filter,
            })
            .collect(),
        rows,
        total: store.len(),
        remaining,
        remaining_label: items_left_label(remaining),
        has_completed: store.len() > remaining,
    }
}

/// "1 item left", otherwise "N items left".
pub fn items_left_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} item{plural} left")
}
