//! Getting DDL text out of the places it arrives from.

use csv::ReaderBuilder;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static SQL_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```sql\r?\n([\s\S]*?)\r?\n```").expect("fence pattern must compile")
});

/// First fenced ```` ```sql ```` block of an assistant reply, if any.
pub fn extract_sql_block(message: &str) -> Option<&str> {
    SQL_FENCE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `CREATE TABLE` statement for an uploaded CSV file, one TEXT column per header field.
///
/// The table is named after the file stem, lower-cased. Header fields are
/// read as CSV, so quoted names may hold commas; characters that cannot
/// appear in an identifier collapse to `_`.
pub fn csv_table_ddl(file_name: &str, header: &str) -> Result<String, csv::Error> {
    let table = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(header.as_bytes());
    let record = reader.records().next().transpose()?.unwrap_or_default();

    let fields: Vec<String> = record
        .iter()
        .map(column_ident)
        .filter(|f| !f.is_empty())
        .map(|f| format!("  {} TEXT", f))
        .collect();

    Ok(format!("CREATE TABLE {} (\n{}\n);", table, fields.join(",\n")))
}

fn column_ident(field: &str) -> String {
    field
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
