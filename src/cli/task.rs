//! todos task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::app::{Action, App, Dispatched};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::output::{print_report, OutputOptions, Report};
use crate::render::View;
use crate::task::TaskStore;

pub struct CommandContext {
    pub config: Config,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
    pub verbose: bool,
}

impl CommandContext {
    fn open_app(&self) -> Result<App> {
        App::from_config(&self.config, self.dir.as_deref())
    }
}

pub fn run_add(ctx: &CommandContext, title: String) -> Result<()> {
    let mut app = ctx.open_app()?;
    let dispatched = app.dispatch(Action::Add { title })?;
    emit_dispatched(ctx, "add", &dispatched)
}

pub fn run_list(ctx: &CommandContext, filter: Option<Filter>) -> Result<()> {
    let mut app = ctx.open_app()?;
    let view = match filter {
        Some(filter) => app.dispatch(Action::SetFilter { filter })?.view,
        None => app.view(),
    };

    let report = view_report(format!("Tasks ({})", view.filter), &view, ctx.verbose);
    print_report(ctx.output, "list", &view, &report)
}

/// `completed = None` flips the current state.
pub fn run_toggle(ctx: &CommandContext, id: &str, completed: Option<bool>) -> Result<()> {
    let mut app = ctx.open_app()?;
    let id = resolve_id(app.store(), id)?;
    let current = app.store().get(&id).map(|task| task.completed);
    let completed = completed.unwrap_or_else(|| !current.unwrap_or(false));
    let dispatched = app.dispatch(Action::Toggle { id, completed })?;
    emit_dispatched(ctx, "toggle", &dispatched)
}

pub fn run_edit(ctx: &CommandContext, id: &str, text: String) -> Result<()> {
    let mut app = ctx.open_app()?;
    let id = resolve_id(app.store(), id)?;
    let dispatched = app.dispatch(Action::Edit { id, text })?;
    emit_dispatched(ctx, "edit", &dispatched)
}

pub fn run_delete(ctx: &CommandContext, id: &str) -> Result<()> {
    let mut app = ctx.open_app()?;
    let id = resolve_id(app.store(), id)?;
    let dispatched = app.dispatch(Action::Delete { id })?;
    emit_dispatched(ctx, "rm", &dispatched)
}

pub fn run_clear_completed(ctx: &CommandContext) -> Result<()> {
    let mut app = ctx.open_app()?;
    let dispatched = app.dispatch(Action::ClearCompleted)?;
    emit_dispatched(ctx, "clear-completed", &dispatched)
}

pub fn run_ui(ctx: &CommandContext, filter: Option<Filter>) -> Result<()> {
    let mut app = ctx.open_app()?;
    if let Some(filter) = filter {
        app.dispatch(Action::SetFilter { filter })?;
    }
    crate::ui::run(app, ctx.config.tasks.id_len)
}

/// Expand a unique id prefix. Unknown ids pass through unchanged so the
/// action becomes a no-op; a prefix shared by several tasks is an error.
pub fn resolve_id(store: &TaskStore, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    let mut matches = store.ids_matching(input);
    match matches.len() {
        0 => Ok(input.to_string()),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousId {
            prefix: input.to_string(),
            matches,
        }),
    }
}

fn emit_dispatched(ctx: &CommandContext, command: &str, dispatched: &Dispatched) -> Result<()> {
    let outcome = &dispatched.outcome;
    let title = if outcome.changed {
        outcome.message.clone()
    } else {
        "No changes".to_string()
    };
    let mut report = view_report(title, &dispatched.view, ctx.verbose);
    if !outcome.changed {
        report.warn(outcome.message.clone());
    }
    print_report(ctx.output, command, dispatched, &report)
}

/// Rows as `[x] id  title`, then `N items left | showing <filter> | shown of total`.
fn view_report(title: String, view: &View, verbose: bool) -> Report {
    let mut report = Report::new(title);
    for row in &view.rows {
        let mark = if row.completed { "[x]" } else { "[ ]" };
        let mut line = format!("{mark} {}  {}", row.id, row.title);
        if verbose {
            if let Some(created) = DateTime::<Utc>::from_timestamp_millis(row.created_at) {
                line.push_str(&format!("  (created {})", created.format("%Y-%m-%d %H:%M")));
            }
        }
        report.row(line);
    }
    report
        .footer(view.remaining_label.clone())
        .footer(format!("showing {}", view.filter))
        .footer(format!("{} of {}", view.rows.len(), view.total));
    report
}
