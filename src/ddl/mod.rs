//! SQL DDL to schema graph conversion.
//!
//! The scanner is deliberately forgiving: text it does not recognise is
//! skipped, never reported. Anything implementing [`DdlParser`] can stand in
//! for the regex scanner without touching the schema model or the diagram.

mod extract;
mod parser;
mod scanner;

pub use extract::{csv_table_ddl, extract_sql_block};
pub use parser::RegexDdlParser;

use serde::{Deserialize, Serialize};

use crate::schema::{Relationship, Table};

/// Tables and relationships recovered from a DDL string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDdl {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

/// Turns DDL text into a schema graph.
pub trait DdlParser {
    fn parse(&self, ddl: &str) -> ParsedDdl;
}

/// How SQL keywords are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordCase {
    /// Keywords must be upper case (`CREATE TABLE`, `PRIMARY KEY`, ...)
    #[default]
    Sensitive,
    /// Any casing is accepted
    Insensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    pub keyword_case: KeywordCase,
}

/// Parse with the default scanner.
pub fn parse_ddl(ddl: &str) -> ParsedDdl {
    RegexDdlParser::default().parse(ddl)
}
