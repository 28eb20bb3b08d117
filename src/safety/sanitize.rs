//! Comment and whitespace normalization for SQL text.

use regex::Regex;
use std::sync::LazyLock;

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\r\n]*").expect("line comment pattern is valid"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Strips comments and collapses whitespace for display or storage.
///
/// Line comments are removed before block comments, so a `--` inside a
/// block comment cuts the rest of its line.
pub fn sanitize(sql: &str) -> String {
    let without_line = LINE_COMMENT.replace_all(sql, "");
    let without_block = BLOCK_COMMENT.replace_all(&without_line, "");
    WHITESPACE
        .replace_all(&without_block, " ")
        .trim()
        .to_string()
}

/// Replaces every comment with a single space, leaving the rest intact.
pub fn neutralize_comments(sql: &str) -> String {
    let without_block = BLOCK_COMMENT.replace_all(sql, " ");
    LINE_COMMENT.replace_all(&without_block, " ").into_owned()
}
