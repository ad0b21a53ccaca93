#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated data and config directories for one test.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let env = Self { dir };
        fs::write(env.config_path(), "").expect("write config");
        env
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn slot_path(&self) -> PathBuf {
        self.data_dir().join("todos.v1.json")
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("write config");
    }

    pub fn write_slot(&self, contents: &str) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(self.slot_path(), contents).expect("write slot");
    }

    pub fn read_slot(&self) -> Value {
        let raw = fs::read_to_string(self.slot_path()).expect("read slot");
        serde_json::from_str(&raw).expect("slot json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("todos").expect("binary");
        cmd.env_remove("RUST_LOG")
            .env_remove("TODOS_DIR")
            .env_remove("TODOS_CONFIG")
            .arg("--dir")
            .arg(self.data_dir())
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    /// Run a command with `--json` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run todos");
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }

    /// Add a task and return its id.
    pub fn add(&self, title: &str) -> String {
        let envelope = self.json(&["add", title]);
        envelope["data"]["outcome"]["task_id"]
            .as_str()
            .expect("task id")
            .to_string()
    }
}
