//! Integration tests for read-only classification.

use askdb::safety::{
    classify, destructive_keyword, is_destructive, sanitize, DestructiveKeyword, ReadOnlyGuard,
};

#[test]
fn test_read_queries_are_allowed() {
    for sql in [
        "SELECT * FROM t_shirts",
        "select brand, sum(stock) from t_shirts group by brand",
        "SELECT updated_at, created_by FROM inventory",
        "SELECT * FROM t_shirts WHERE color = 'DROP TABLE'",
        "WITH totals AS (SELECT brand FROM t_shirts) SELECT * FROM totals",
    ] {
        assert!(!is_destructive(sql), "expected '{sql}' to be allowed");
    }
}

#[test]
fn test_destructive_statements_are_blocked() {
    let cases = [
        ("DELETE FROM t_shirts", DestructiveKeyword::Delete),
        ("  drop table t_shirts", DestructiveKeyword::Drop),
        ("UPDATE t_shirts SET stock = 0", DestructiveKeyword::Update),
        ("truncate t_shirts", DestructiveKeyword::Truncate),
        ("ALTER TABLE t_shirts ADD COLUMN x int", DestructiveKeyword::Alter),
        ("INSERT INTO t_shirts VALUES (1)", DestructiveKeyword::Insert),
        ("CREATE TABLE x (id int)", DestructiveKeyword::Create),
        ("REPLACE INTO t_shirts VALUES (1)", DestructiveKeyword::Replace),
        ("RENAME TABLE a TO b", DestructiveKeyword::Rename),
        ("GRANT SELECT ON t_shirts TO bob", DestructiveKeyword::Grant),
        ("REVOKE SELECT ON t_shirts FROM bob", DestructiveKeyword::Revoke),
    ];

    for (sql, keyword) in cases {
        assert_eq!(destructive_keyword(sql), Some(keyword), "for '{sql}'");
    }
}

#[test]
fn test_keyword_boundaries() {
    // Keyword must be followed by whitespace.
    assert!(!is_destructive("DELETE"));
    assert!(!is_destructive("SELECT * FROM deleted_items"));
    // Newlines and parentheses count as boundaries.
    assert!(is_destructive("SELECT 1\nDELETE\nFROM t"));
    assert!(is_destructive("SELECT * FROM (DELETE FROM t RETURNING *)"));
}

#[test]
fn test_priority_order_wins_over_position() {
    assert_eq!(
        destructive_keyword("INSERT INTO a SELECT 1; DROP TABLE b"),
        Some(DestructiveKeyword::Drop)
    );
    assert_eq!(
        destructive_keyword("UPDATE a SET x = 1; DELETE FROM b"),
        Some(DestructiveKeyword::Delete)
    );
}

#[test]
fn test_absent_input_is_allowed() {
    assert!(!classify(None).is_blocked());
    assert!(!classify("").is_blocked());
    assert!(!classify("   ").is_blocked());
}

#[test]
fn test_guard_sees_through_comments() {
    let guard = ReadOnlyGuard::default();
    let sql = "SELECT 1; /* cleanup */DROP/**/TABLE t_shirts";

    assert!(!classify(sql).is_blocked());
    assert_eq!(guard.check(sql).keyword(), Some(DestructiveKeyword::Drop));
    assert!(!ReadOnlyGuard::new(false).check(sql).is_blocked());
}

#[test]
fn test_guard_message() {
    let verdict = ReadOnlyGuard::default().check("delete from t_shirts");
    assert_eq!(
        verdict.message().as_deref(),
        Some("Query blocked: DELETE operations are not allowed in read-only mode.")
    );
}

#[test]
fn test_sanitize_for_display() {
    assert_eq!(
        sanitize("-- top sellers\nSELECT brand /* name */\n  FROM t_shirts"),
        "SELECT brand FROM t_shirts"
    );
}
