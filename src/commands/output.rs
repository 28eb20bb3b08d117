//! Transport-agnostic command output types.
//!
//! Handlers return these; the shell and the one-shot CLI render them as text
//! (or JSON when requested).

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::{cell_text, Row};

/// Cells wider than this are cut and end with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

/// Output from a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Informational message (success, status, etc.).
    Info(String),

    /// Error message.
    Error(String),

    /// Structured table data for display.
    Table {
        /// Column headers.
        headers: Vec<String>,
        /// Row data (each row is a vector of cell values).
        rows: Vec<Vec<String>>,
    },

    /// Machine-readable output.
    Json(serde_json::Value),

    /// Application control action.
    Control(ControlAction),

    /// Multiple outputs (for commands that produce several messages).
    Multiple(Vec<CommandOutput>),
}

/// Control actions that affect the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Leave the shell.
    Exit,
}

impl CommandOutput {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table { headers, rows }
    }

    pub fn multiple(outputs: Vec<CommandOutput>) -> Self {
        Self::Multiple(outputs)
    }

    pub fn exit() -> Self {
        Self::Control(ControlAction::Exit)
    }

    /// Builds a table from result rows. Columns come from the first row.
    pub fn from_rows(rows: &[Row]) -> Self {
        let headers: Vec<String> = rows
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();

        let cells = rows
            .iter()
            .map(|row| headers.iter().map(|h| cell_text(row.get(h))).collect())
            .collect();

        Self::table(headers, cells)
    }

    /// Returns true if this output, or any part of it, is an error.
    pub fn is_error(&self) -> bool {
        match self {
            Self::Error(_) => true,
            Self::Multiple(outputs) => outputs.iter().any(CommandOutput::is_error),
            _ => false,
        }
    }

    /// Returns true if this output asks the session to end.
    pub fn is_exit(&self) -> bool {
        match self {
            Self::Control(ControlAction::Exit) => true,
            Self::Multiple(outputs) => outputs.iter().any(CommandOutput::is_exit),
            _ => false,
        }
    }

    /// Renders the output as plain text.
    pub fn render(&self) -> String {
        match self {
            Self::Info(msg) => msg.clone(),
            Self::Error(msg) => format!("Error: {msg}"),
            Self::Table { headers, rows } => render_table(headers, rows),
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Control(_) => String::new(),
            Self::Multiple(outputs) => outputs
                .iter()
                .map(CommandOutput::render)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Renders an aligned plain-text table with a row count footer.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return "(0 rows)".to_string();
    }

    let headers: Vec<String> = headers.iter().map(|h| fit_cell(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| fit_cell(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let format_line = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| pad(cells.get(i).map(String::as_str).unwrap_or(""), *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format_line(&headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_line(row));
    }
    lines.push(format!(
        "({} row{})",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    ));

    lines.join("\n")
}

/// Flattens a cell to one line no wider than [`MAX_CELL_WIDTH`].
fn fit_cell(cell: &str) -> String {
    let flat: String = cell
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect();

    if flat.width() <= MAX_CELL_WIDTH {
        return flat;
    }

    let mut out = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > MAX_CELL_WIDTH - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{cell}{}", " ".repeat(fill))
}
