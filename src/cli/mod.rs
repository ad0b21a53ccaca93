//! Command-line interface for todos
//!
//! This module defines the CLI structure using clap derive macros.
//! Command bodies live in the submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::filter::Filter;
use crate::output::OutputOptions;

mod init;
mod task;

pub use task::resolve_id;

/// todos - a local task list
///
/// Add, toggle, edit, delete and filter short tasks. State is kept in a
/// JSON slot in the data directory.
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the task slot
    #[arg(long, global = true, env = "TODOS_DIR")]
    pub dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TODOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show creation times in task lists
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default config file and create the data directory
    Init,

    /// Add a task
    Add {
        /// Task title (words are joined with spaces)
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Which tasks to show
        #[arg(short, long, value_enum)]
        filter: Option<Filter>,
    },

    /// Flip a task between active and completed
    Toggle {
        /// Task id or unique prefix
        id: String,

        /// Mark completed instead of flipping
        #[arg(long, conflicts_with = "undone")]
        done: bool,

        /// Mark active instead of flipping
        #[arg(long)]
        undone: bool,
    },

    /// Mark a task completed
    Done {
        /// Task id or unique prefix
        id: String,
    },

    /// Mark a task active again
    Undone {
        /// Task id or unique prefix
        id: String,
    },

    /// Change a task's title (a blank title deletes the task)
    Edit {
        /// Task id or unique prefix
        id: String,

        /// New title
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task id or unique prefix
        id: String,
    },

    /// Delete every completed task
    ClearCompleted,

    /// Open the interactive terminal view
    Ui {
        /// Filter to start with
        #[arg(short, long, value_enum)]
        filter: Option<Filter>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let Cli {
            dir,
            config,
            json,
            quiet,
            verbose,
            command,
        } = self;
        let output = OutputOptions { json, quiet };
        // `init` must work before a valid config exists, so the context is
        // only built by the task commands.
        let ctx = || -> Result<task::CommandContext> {
            Ok(task::CommandContext {
                config: Config::resolve(config.as_deref())?,
                dir: dir.clone(),
                output,
                verbose,
            })
        };

        match command {
            Commands::Init => init::run(init::InitOptions {
                config: config.clone(),
                dir: dir.clone(),
                output,
            }),
            Commands::Add { title } => task::run_add(&ctx()?, title.join(" ")),
            Commands::List { filter } => task::run_list(&ctx()?, filter),
            Commands::Toggle { id, done, undone } => {
                let completed = match (done, undone) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                task::run_toggle(&ctx()?, &id, completed)
            }
            Commands::Done { id } => task::run_toggle(&ctx()?, &id, Some(true)),
            Commands::Undone { id } => task::run_toggle(&ctx()?, &id, Some(false)),
            Commands::Edit { id, title } => task::run_edit(&ctx()?, &id, title.join(" ")),
            Commands::Rm { id } => task::run_delete(&ctx()?, &id),
            Commands::ClearCompleted => task::run_clear_completed(&ctx()?),
            Commands::Ui { filter } => task::run_ui(&ctx()?, filter),
        }
    }
}
