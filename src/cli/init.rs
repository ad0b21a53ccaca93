//! todos init command implementation
//!
//! Writes a default config file (unless one exists) and creates the data
//! directory.

use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::output::{print_report, OutputOptions, Report};

pub struct InitOptions {
    pub config: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    config_path: PathBuf,
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_dir: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let config_path = match options.config {
        Some(path) => path,
        None => config::default_config_dir()
            .map(|dir| dir.join(config::CONFIG_FILE))
            .ok_or_else(|| {
                Error::InvalidArgument("no config directory available; pass --config".to_string())
            })?,
    };

    let created_config = ensure_config(&config_path)?;
    let config = Config::load(&config_path)?;
    let data_dir = config.data_dir(options.dir.as_deref())?;
    let created_data_dir = ensure_dir(&data_dir)?;

    let report = InitReport {
        config_path: config_path.clone(),
        data_dir: data_dir.clone(),
        created: InitCreated {
            config: created_config,
            data_dir: created_data_dir,
        },
    };

    let header = if created_config || created_data_dir {
        "todos init: initialized"
    } else {
        "todos init: already initialized"
    };
    let mut human = Report::new(header);
    human
        .row(format!("config  {}", config_path.display()))
        .row(format!("data    {}", data_dir.display()))
        .row(format!("slot    {}", config.storage.key));

    print_report(options.output, "init", &report, &human)
}

fn ensure_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    Config::default().save(path)?;
    Ok(true)
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}
