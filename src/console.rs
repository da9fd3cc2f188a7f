//! Terminal status output and the candidate prompt.
//!
//! Status lines (`[STEP]`, `[OK]`, ...) and the candidate menu go to stderr
//! so that stdout carries only the run's result line. ANSI colors are used
//! when stderr is a terminal and `NO_COLOR` is unset.

use std::io::{self, IsTerminal, Write};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Step,
    Info,
    Ok,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> (&'static str, Style) {
        match self {
            Level::Step => ("STEP", Style::Cyan),
            Level::Info => ("INFO", Style::Blue),
            Level::Ok => ("OK", Style::Green),
            Level::Warn => ("WARN", Style::Yellow),
            Level::Error => ("ERROR", Style::Red),
        }
    }
}

/// Status output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Colors are on unless `NO_COLOR` is set or stderr is not a terminal.
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stderr().is_terminal();
        Self { colors_enabled }
    }

    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Formats one status line, e.g. `[OK] Configuration loaded`.
    pub fn status_line(&self, level: Level, message: &str) -> String {
        let (tag, color) = level.tag();
        format!("[{}] {}", self.style(tag, &[color, Style::Bold]), message)
    }

    /// Writes a status line to stderr.
    pub fn report(&self, level: Level, message: &str) {
        eprintln!("{}", self.status_line(level, message));
    }

    pub fn step(&self, message: &str) {
        self.report(Level::Step, message);
    }

    pub fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.report(Level::Ok, message);
    }

    pub fn warning(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }

    /// Prints a blank line and a bold magenta heading.
    pub fn section(&self, title: &str) {
        eprintln!();
        eprintln!("{}", self.style(title, &[Style::Magenta, Style::Bold]));
    }

    /// Formats a numbered menu entry. The link, if any, goes on an indented
    /// second line in muted gray.
    pub fn menu_entry(&self, number: usize, text: &str, link: Option<&str>) -> String {
        let mut entry = format!("{} {}", self.style(&format!("{}.", number), &[Style::Bold]), text);
        if let Some(link) = link {
            entry.push_str("\n        ");
            entry.push_str(&self.style(link, &[Style::Gray, Style::Dim]));
        }
        entry
    }

    /// Asks a question on stderr and reads one line from stdin.
    ///
    /// Returns the line without its trailing newline; end of input yields
    /// an empty string.
    pub fn prompt(&self, question: &str) -> io::Result<String> {
        let mut err = io::stderr();
        write!(err, "{} ", self.style(question, &[Style::Cyan, Style::Bold]))?;
        err.flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
