//! Interactive terminal view over the task list.

mod app;
mod editor;
mod view;

pub use app::run;
