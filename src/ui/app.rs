use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::subscriber::NoSubscriber;

use crate::app::{Action, App};
use crate::error::Result;
use crate::filter::Filter;
use crate::render::{Row, View};

use super::editor::{InputAction, LineInput};
use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Browse,
    Adding,
    Editing { id: String },
}

pub(crate) struct UiState {
    app: App,
    id_len: usize,
    pub(crate) view: View,
    pub(crate) selected: usize,
    pub(crate) mode: Mode,
    pub(crate) new_task: LineInput,
    pub(crate) edit: LineInput,
    status: Option<(String, StatusKind)>,
}

impl UiState {
    pub(crate) fn new(app: App, id_len: usize) -> Self {
        let view = app.view();
        Self {
            app,
            id_len,
            view,
            selected: 0,
            mode: Mode::Browse,
            new_task: LineInput::default(),
            edit: LineInput::default(),
            status: None,
        }
    }

    pub(crate) fn selected_row(&self) -> Option<&Row> {
        self.view.rows.get(self.selected)
    }

    pub(crate) fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    pub(crate) fn footer_hint(&self) -> String {
        match self.mode {
            Mode::Adding => "enter add  esc done".to_string(),
            Mode::Editing { .. } => "enter/tab/esc save (blank deletes)".to_string(),
            Mode::Browse => {
                "j/k move  a add  space toggle  e edit  d delete  f filter  c clear  q quit"
                    .to_string()
            }
        }
    }

    fn set_error(&mut self, message: String) {
        self.status = Some((message, StatusKind::Error));
    }

    fn set_info(&mut self, message: String) {
        self.status = Some((message, StatusKind::Info));
    }

    fn dispatch(&mut self, action: Action) {
        match self.app.dispatch(action) {
            Ok(dispatched) => {
                self.view = dispatched.view;
                if let Some(id) = dispatched.outcome.task_id.as_deref() {
                    if dispatched.outcome.changed {
                        self.select_id(id);
                    }
                }
                self.set_info(dispatched.outcome.message);
            }
            Err(err) => {
                self.view = self.app.view();
                self.set_error(err.to_string());
            }
        }
        self.clamp_selection();
    }

    fn reload(&mut self) {
        if let Err(err) = self.app.reload(self.id_len) {
            self.set_error(format!("reload failed: {err}"));
            return;
        }
        self.view = self.app.view();
        self.clamp_selection();
        self.set_info(format!("reloaded {} tasks", self.view.total));
    }

    fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.view.rows.iter().position(|row| row.id == id) {
            self.selected = pos;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.view.rows.len().saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        if self.view.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.view.rows.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    fn set_filter(&mut self, filter: Filter) {
        let previous = self.selected_row().map(|row| row.id.clone());
        self.dispatch(Action::SetFilter { filter });
        match previous {
            Some(id) => self.select_id(&id),
            None => self.selected = 0,
        }
    }

    fn toggle_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            let action = Action::Toggle {
                id: row.id.clone(),
                completed: !row.completed,
            };
            self.dispatch(action);
        }
    }

    fn begin_edit(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        self.edit = LineInput::with_value(&row.title);
        self.mode = Mode::Editing { id: row.id };
    }

    /// Ending an edit always commits the text, whichever key moved focus.
    fn finish_edit(&mut self, id: String) {
        let text = self.edit.take();
        self.mode = Mode::Browse;
        self.dispatch(Action::Edit { id, text });
    }
}

pub fn run(app: App, id_len: usize) -> Result<()> {
    let mut state = UiState::new(app, id_len);
    // Log lines written to stderr would tear the alternate screen.
    tracing::subscriber::with_default(NoSubscriber::default(), || run_terminal(&mut state))
}

fn run_terminal(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, state))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(state, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the view should close.
pub(crate) fn handle_key(state: &mut UiState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        if let Mode::Editing { id } = std::mem::replace(&mut state.mode, Mode::Browse) {
            state.finish_edit(id);
        }
        return true;
    }

    match state.mode.clone() {
        Mode::Adding => {
            match state.new_task.handle_key(key) {
                InputAction::Submit => {
                    let title = state.new_task.take();
                    if !title.trim().is_empty() {
                        state.dispatch(Action::Add { title });
                    }
                }
                InputAction::Leave => state.mode = Mode::Browse,
                InputAction::None => {}
            }
            false
        }
        Mode::Editing { id } => {
            match state.edit.handle_key(key) {
                InputAction::Submit | InputAction::Leave => state.finish_edit(id),
                InputAction::None => {}
            }
            false
        }
        Mode::Browse => handle_browse_key(state, key),
    }
}

fn handle_browse_key(state: &mut UiState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => state.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => state.move_selection(-1),
        KeyCode::Home | KeyCode::Char('g') => state.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            state.selected = state.view.rows.len().saturating_sub(1)
        }
        KeyCode::Char('a') | KeyCode::Char('n') => state.mode = Mode::Adding,
        KeyCode::Char(' ') | KeyCode::Char('x') => state.toggle_selected(),
        KeyCode::Char('e') | KeyCode::Enter => state.begin_edit(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(row) = state.selected_row() {
                let id = row.id.clone();
                state.dispatch(Action::Delete { id });
            }
        }
        KeyCode::Char(ch @ '1'..='3') => {
            let idx = ch as usize - '1' as usize;
            state.set_filter(Filter::ALL[idx]);
        }
        KeyCode::Char('f') | KeyCode::Tab => state.set_filter(state.view.filter.next()),
        KeyCode::BackTab => state.set_filter(state.view.filter.previous()),
        KeyCode::Char('c') => state.dispatch(Action::ClearCompleted),
        KeyCode::Char('r') => state.reload(),
        _ => {}
    }
    false
}
