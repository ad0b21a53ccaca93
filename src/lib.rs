//! todos - a local task list
//!
//! This library provides the core of the `todos` CLI: an ordered task store,
//! a view filter, a JSON persistence slot, and the dispatcher that ties them
//! together for the command-line and terminal front ends.
//!
//! # Core Concepts
//!
//! - **Task Store**: ordered list of tasks, newest first
//! - **Filter**: which tasks the view shows (all, active, completed)
//! - **Slot**: a named JSON document in the data directory holding the store
//! - **Action**: one user intent, applied then persisted then rendered
//!
//! # Module Organization
//!
//! - `app`: Actions and the dispatcher
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `filter`: View filters
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output
//! - `render`: Store + filter projection
//! - `repository`: Task list encoding in the slot
//! - `storage`: Key/value slots on disk
//! - `task`: Task records and the store
//! - `ui`: Interactive terminal view

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod lock;
pub mod output;
pub mod render;
pub mod repository;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
