// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use autopush_daemon::report::{render_human, Reporter, WatchEvent};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per line).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line =
                render_human_stderr_line("error", message, io::stderr().is_terminal(), ANSI_RED);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a mapped, actionable error for a command failure.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");
    let lower = message.to_ascii_lowercase();

    if lower.contains("not a git repository") {
        return (
            "NOT_A_REPOSITORY",
            format!("{message}. Point --repo at a git working tree or run: git init"),
        );
    }

    if lower.contains("config") && (lower.contains("parse error") || lower.contains("invalid")) {
        return ("CONFIG_INVALID", message);
    }

    if lower.contains("is not a directory") {
        return ("REPO_NOT_FOUND", message);
    }

    ("COMMAND_FAILED", message)
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

/// Streams watcher events to stdout: plain lines or one JSON object per event.
pub struct EventPrinter<W = io::Stdout> {
    format: OutputFormat,
    out: W,
}

impl EventPrinter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self { format, out: io::stdout() }
    }
}

impl<W: Write> EventPrinter<W> {
    #[cfg(test)]
    fn with_writer(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    fn write_event(&mut self, event: &WatchEvent) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                for line in render_human(event) {
                    writeln!(self.out, "{line}")?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event).map_err(io::Error::other)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Reporter for EventPrinter<W> {
    fn report(&mut self, event: &WatchEvent) {
        if let Err(error) = self.write_event(event) {
            tracing::debug!(%error, "failed to write watcher event");
        }
    }
}
