//! Query safety classification module.
//!
//! Detects data- or schema-mutating keywords in SQL so that read-only mode
//! can refuse a statement before it is executed.

mod matcher;
mod sanitize;

pub use matcher::{classify, destructive_keyword, is_destructive};
pub use sanitize::{neutralize_comments, sanitize};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// SQL verbs that can mutate data or schema.
///
/// Declaration order is the match priority: when several keywords appear in
/// one statement, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestructiveKeyword {
    Delete,
    Drop,
    Update,
    Truncate,
    Alter,
    Insert,
    Create,
    Replace,
    Rename,
    Grant,
    Revoke,
}

impl DestructiveKeyword {
    /// All keywords in priority order.
    pub const ALL: [DestructiveKeyword; 11] = [
        Self::Delete,
        Self::Drop,
        Self::Update,
        Self::Truncate,
        Self::Alter,
        Self::Insert,
        Self::Create,
        Self::Replace,
        Self::Rename,
        Self::Grant,
        Self::Revoke,
    ];

    /// Returns the keyword as it appears in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Drop => "DROP",
            Self::Update => "UPDATE",
            Self::Truncate => "TRUNCATE",
            Self::Alter => "ALTER",
            Self::Insert => "INSERT",
            Self::Create => "CREATE",
            Self::Replace => "REPLACE",
            Self::Rename => "RENAME",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
        }
    }
}

impl fmt::Display for DestructiveKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a statement under the read-only policy.
///
/// A verdict is blocked exactly when it carries a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    keyword: Option<DestructiveKeyword>,
}

impl Verdict {
    /// A verdict that lets the statement through.
    pub fn allowed() -> Self {
        Self { keyword: None }
    }

    /// A verdict that blocks the statement because of `keyword`.
    pub fn blocked(keyword: DestructiveKeyword) -> Self {
        Self {
            keyword: Some(keyword),
        }
    }

    /// Returns true if the statement must not be executed.
    pub fn is_blocked(&self) -> bool {
        self.keyword.is_some()
    }

    /// Returns the offending keyword, if blocked.
    pub fn keyword(&self) -> Option<DestructiveKeyword> {
        self.keyword
    }

    /// Returns the user-facing block message, if blocked.
    pub fn message(&self) -> Option<String> {
        self.keyword.map(|k| {
            format!("Query blocked: {k} operations are not allowed in read-only mode.")
        })
    }
}

impl From<Option<DestructiveKeyword>> for Verdict {
    fn from(keyword: Option<DestructiveKeyword>) -> Self {
        Self { keyword }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Verdict", 2)?;
        state.serialize_field("blocked", &self.is_blocked())?;
        state.serialize_field("keyword", &self.keyword.map(|k| k.as_str()))?;
        state.end()
    }
}

/// Gate applied by callers before a statement is accepted for execution.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnlyGuard {
    inspect_comments: bool,
}

impl Default for ReadOnlyGuard {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReadOnlyGuard {
    /// Creates a guard. With `inspect_comments`, a statement that passes on
    /// its raw text is checked again with every comment replaced by a space.
    pub fn new(inspect_comments: bool) -> Self {
        Self { inspect_comments }
    }

    /// Returns true if comment-neutralized text is also inspected.
    pub fn inspects_comments(&self) -> bool {
        self.inspect_comments
    }

    /// Checks a statement. The raw-text verdict wins when it blocks.
    pub fn check(&self, sql: &str) -> Verdict {
        let raw = classify(sql);
        if raw.is_blocked() || !self.inspect_comments {
            return raw;
        }
        classify(neutralize_comments(sql).as_str())
    }
}
