//! CSV export of query results.

use chrono::{DateTime, Utc};
use csv::{Terminator, WriterBuilder};
use std::path::Path;
use tracing::info;

use crate::api::{cell_text, Row};
use crate::error::{AskDbError, Result};

/// Maximum number of query characters used in an export filename.
const FILENAME_QUERY_CHARS: usize = 30;

/// Renders rows as CSV preceded by a commented metadata header.
///
/// Columns come from the first row's keys; other rows' missing cells and
/// `null` values are written empty. An empty result renders as an empty string.
pub fn to_csv(rows: &[Row], query: &str, generated: DateTime<Utc>) -> Result<String> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(encode_line(&headers)?);
    for row in rows {
        let cells: Vec<String> = headers.iter().map(|h| cell_text(row.get(*h))).collect();
        lines.push(encode_line(&cells)?);
    }

    let mut out = format!(
        "# AskDB - Query Results Export\n# Generated: {}\n# Query: {query}\n# Total Rows: {}\n",
        generated.format("%Y-%m-%d %H:%M:%S UTC"),
        rows.len()
    );
    out.push_str(&lines.join("\n"));
    Ok(out)
}

/// Encodes one record as a CSV line without its terminator. A record holding
/// a single empty field is an empty line.
fn encode_line<T: AsRef<str>>(fields: &[T]) -> Result<String> {
    if let [only] = fields {
        if only.as_ref().is_empty() {
            return Ok(String::new());
        }
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(fields.iter().map(|f| f.as_ref()))
        .map_err(|e| AskDbError::internal(format!("Failed to write CSV record: {e}")))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AskDbError::internal(format!("Failed to finish CSV: {e}")))?;
    let mut line = String::from_utf8(bytes)
        .map_err(|e| AskDbError::internal(format!("CSV is not valid UTF-8: {e}")))?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Builds a download filename: `askdb_<query prefix>_<timestamp>.csv`.
pub fn generate_filename(query: &str, now: DateTime<Utc>) -> String {
    let prefix: String = query
        .chars()
        .take(FILENAME_QUERY_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("askdb_{prefix}_{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Writes an export to `path`. Returns the number of bytes written.
pub fn write_export(path: &Path, contents: &str) -> Result<usize> {
    std::fs::write(path, contents).map_err(|e| {
        AskDbError::storage(format!("Failed to write export {}: {e}", path.display()))
    })?;
    info!("Exported results to {}", path.display());
    Ok(contents.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::demo::row;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_empty_result_is_empty_string() {
        assert_eq!(to_csv(&[], "anything", generated()).unwrap(), "");
    }

    #[test]
    fn test_metadata_and_rows() {
        let rows = vec![
            row([("brand", json!("Nike")), ("stock", json!(150))]),
            row([("brand", json!("Puma")), ("stock", json!(67))]),
        ];

        let csv = to_csv(&rows, "stock by brand", generated()).unwrap();

        assert_eq!(
            csv,
            "# AskDB - Query Results Export\n\
             # Generated: 2024-03-01 14:05:09 UTC\n\
             # Query: stock by brand\n\
             # Total Rows: 2\n\
             brand,stock\n\
             Nike,150\n\
             Puma,67"
        );
    }

    #[test]
    fn test_quoting_and_nulls() {
        let rows = vec![
            row([
                ("name", json!("Tee, \"classic\"")),
                ("note", json!(null)),
                ("lines", json!("a\nb")),
            ]),
            row([("name", json!("plain"))]),
        ];

        let csv = to_csv(&rows, "q", generated()).unwrap();
        let body: Vec<&str> = csv.splitn(6, '\n').skip(4).collect();

        assert_eq!(body[0], "name,note,lines");
        assert_eq!(body[1], "\"Tee, \"\"classic\"\"\",,\"a\nb\"\nplain,,");
    }

    #[test]
    fn test_single_column_empty_cells_are_empty_lines() {
        let rows = vec![
            row([("note", json!("first"))]),
            row([("note", json!(null))]),
            row([("note", json!(""))]),
            row([("other", json!("x"))]),
            row([("note", json!("last"))]),
        ];

        let csv = to_csv(&rows, "notes", generated()).unwrap();
        let body: Vec<&str> = csv.split('\n').skip(4).collect();

        assert_eq!(body, vec!["note", "first", "", "", "", "last"]);
    }

    #[test]
    fn test_generate_filename() {
        let name = generate_filename("How many Nike t-shirts are in stock?", generated());
        assert_eq!(name, "askdb_how_many_nike_t_shirts_are_in__2024-03-01T14-05-09.csv");
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let written = write_export(&path, "a,b\n1,2").unwrap();
        assert_eq!(written, 7);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2");
    }
}
