//! Regex-driven `CREATE TABLE` scanner.

use std::collections::HashSet;

use super::scanner::{Patterns, clean_ident, patterns, split_items, strip_comments};
use super::{DdlParser, ParsedDdl, ParserOptions};
use crate::schema::{Column, Relationship, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexDdlParser {
    options: ParserOptions,
}

impl RegexDdlParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    fn scan_table(
        &self,
        p: &Patterns,
        table_name: &str,
        body: &str,
        relationships: &mut Vec<Relationship>,
    ) -> Table {
        // Table-level PRIMARY KEY (a, b) declarations
        let primary_keys: HashSet<String> = p
            .primary_key
            .captures_iter(body)
            .flat_map(|caps| {
                caps[1]
                    .split(',')
                    .map(clean_ident)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut columns = Vec::new();

        for item in split_items(body) {
            let item = item.trim();
            if item.is_empty() || p.constraint_item.is_match(item) {
                continue;
            }
            let Some(caps) = p.column.captures(item) else {
                continue;
            };

            let name = caps[1].to_string();
            let is_primary = primary_keys.contains(&name) || p.inline_primary.is_match(item);
            let is_nullable = !is_primary && !p.not_null.is_match(item);

            if let Some(refs) = p.references.captures(item) {
                relationships.push(Relationship::many_to_one(
                    table_name,
                    name.as_str(),
                    &refs[1],
                    &refs[2],
                ));
            }

            columns.push(Column {
                name,
                typ: caps[2].to_string(),
                is_primary,
                is_nullable,
            });
        }

        // Explicit FOREIGN KEY clauses. Not merged with the inline references above.
        for caps in p.foreign_key.captures_iter(body) {
            relationships.push(Relationship::many_to_one(
                table_name, &caps[1], &caps[2], &caps[3],
            ));
        }

        Table {
            name: table_name.to_string(),
            columns,
        }
    }
}

impl DdlParser for RegexDdlParser {
    fn parse(&self, ddl: &str) -> ParsedDdl {
        let p = patterns(self.options.keyword_case);
        let text = strip_comments(ddl);

        let mut tables = Vec::new();
        let mut relationships = Vec::new();

        for caps in p.create_table.captures_iter(&text) {
            let (Some(name), Some(body)) = (caps.get(2), caps.get(3)) else {
                continue;
            };
            let table = self.scan_table(p, name.as_str(), body.as_str(), &mut relationships);
            tracing::trace!(table = %table.name, columns = table.columns.len(), "scanned table");
            tables.push(table);
        }

        tracing::debug!(
            tables = tables.len(),
            relationships = relationships.len(),
            "parsed DDL"
        );

        ParsedDdl {
            tables,
            relationships,
        }
    }
}
