//! What commands print.
//!
//! People get a [`Report`]: a title line, the task rows, a one-line footer and
//! any warnings. `--json` gets an envelope around the command's data instead:
//!
//! ```text
//! { "schema_version", "command", "status", "data" | "error", "warnings"?, "hint"? }
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "todos.v1";

const FOOTER_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text result of a command.
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: String,
    rows: Vec<String>,
    footer: Vec<String>,
    warnings: Vec<String>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn row(&mut self, line: impl Into<String>) -> &mut Self {
        self.rows.push(line.into());
        self
    }

    pub fn footer(&mut self, part: impl Into<String>) -> &mut Self {
        self.footer.push(part.into());
        self
    }

    pub fn warn(&mut self, message: impl Into<String>) -> &mut Self {
        self.warnings.push(message.into());
        self
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for row in &self.rows {
            write!(f, "\n  {row}")?;
        }
        if !self.footer.is_empty() {
            write!(f, "\n{}", self.footer.join(FOOTER_SEPARATOR))?;
        }
        for warning in &self.warnings {
            write!(f, "\nwarning: {warning}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Error,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

impl<T: Serialize> Envelope<'_, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Print a successful command: the envelope under `--json`, nothing under
/// `--quiet`, the report otherwise.
pub fn print_report<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    report: &Report,
) -> Result<()> {
    if options.json {
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            data: Some(data),
            error: None,
            warnings: report.warnings(),
            hint: None,
        }
        .print();
    }
    if !options.quiet {
        println!("{report}");
    }
    Ok(())
}

/// Print a failed command. Human errors go to stderr.
pub fn print_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        return Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            warnings: &[],
            hint,
        }
        .print();
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Global flags that consume the following argument.
const VALUE_FLAGS: [&str; 2] = ["--dir", "--config"];

/// Subcommand named on the command line, for error output printed before or
/// without a successful parse.
pub fn command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if !arg.starts_with('-') {
            return arg;
        }
    }
    "todos".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::AmbiguousId { .. } => Some("use more characters of the id"),
        Error::InvalidConfig(_) => Some("fix config.toml then retry"),
        Error::NoDataDir => Some("todos --dir <path> ..."),
        Error::LockFailed(_) => Some("another todos process is writing; retry"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_name_skips_flag_values() {
        assert_eq!(
            command_name(args(&["--dir", "/tmp/data", "--json", "rm", "abc"])),
            "rm"
        );
        assert_eq!(command_name(args(&["--config", "c.toml", "-q", "list"])), "list");
        assert_eq!(command_name(args(&["--json"])), "todos");
    }

    #[test]
    fn error_kind_follows_exit_code() {
        assert_eq!(error_kind(&Error::NoDataDir), "user_error");
        assert_eq!(
            error_kind(&Error::OperationFailed("x".to_string())),
            "operation_failed"
        );
    }

    #[test]
    fn error_envelope_has_no_data_or_warnings() {
        let err = Error::LockFailed("slot.lock".into());
        let envelope = Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command: "add",
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(&err),
                details: None,
            }),
            warnings: &[],
            hint: error_hint(&err),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["kind"], "operation_failed");
        assert!(value.get("data").is_none());
        assert!(value.get("warnings").is_none());
        assert_eq!(value["hint"], "another todos process is writing; retry");
    }
}
