//! Mode-aware output for CLI commands.
//!
//! - Human: colored, symbol-prefixed lines (colors only on a TTY)
//! - Json: one JSON object per line
//! - Quiet: errors only
//!
//! A custom writer can be injected so tests can capture what a command prints.

use colored::{Color, Colorize};
use serde_json::json;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

impl OutputMode {
    /// `--json` wins over `--quiet`.
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Clone)]
pub struct Output {
    mode: OutputMode,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    is_tty: bool,
}

impl Output {
    /// Output on stdout.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(Box::new(io::stdout()))),
            is_tty: atty::is(atty::Stream::Stdout),
        }
    }

    /// Output on a custom writer, never colored.
    #[cfg(test)]
    pub fn with_writer(mode: OutputMode, writer: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(writer)),
            is_tty: false,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Whether ANSI colors should be emitted.
    pub fn colors(&self) -> bool {
        self.is_tty && self.mode == OutputMode::Human
    }

    pub fn step(&self, msg: &str) {
        self.prefixed("→", Color::Cyan, "step", msg);
    }

    pub fn success(&self, msg: &str) {
        self.prefixed("✓", Color::Green, "success", msg);
    }

    pub fn warn(&self, msg: &str) {
        self.prefixed("⚠", Color::Yellow, "warning", msg);
    }

    /// Errors are printed in every mode.
    pub fn error(&self, msg: &str) {
        match self.mode {
            OutputMode::Quiet => self.write_line(&format!("✗ {}", msg)),
            _ => self.prefixed("✗", Color::Red, "error", msg),
        }
    }

    pub fn info(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => self.write_line(msg),
            OutputMode::Json => self.write_event("info", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Indented subordinate line.
    pub fn detail(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => self.write_line(&format!("  {}", msg)),
            OutputMode::Json => self.write_event("detail", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Raw text, written as-is in human mode.
    pub fn block(&self, text: &str) {
        if self.mode == OutputMode::Human {
            self.write_line(text);
        }
    }

    /// A structured document, written only in JSON mode.
    pub fn json(&self, value: &serde_json::Value) {
        if self.mode == OutputMode::Json {
            self.write_line(&value.to_string());
        }
    }

    fn prefixed(&self, symbol: &str, color: Color, level: &str, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                let symbol = if self.is_tty {
                    symbol.color(color).to_string()
                } else {
                    symbol.to_string()
                };
                self.write_line(&format!("{} {}", symbol, msg));
            }
            OutputMode::Json => self.write_event(level, msg),
            OutputMode::Quiet => {}
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    fn write_event(&self, level: &str, msg: &str) {
        self.write_line(&json!({ "level": level, "msg": msg }).to_string());
    }
}
