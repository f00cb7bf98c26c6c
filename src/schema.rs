//! Schema graph: tables, columns and the relationships between them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

use crate::ddl::DdlParser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Row index of the named column, in source order.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn primary_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Tables in source order, skipping any that a later table of the same name
/// replaces.
pub fn distinct_tables(tables: &[Table]) -> impl Iterator<Item = &Table> {
    let last: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();
    tables
        .iter()
        .enumerate()
        .filter(move |(i, t)| last.get(t.name.as_str()) == Some(i))
        .map(|(_, t)| t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelationshipKind {
    #[default]
    #[serde(rename = "many-to-one")]
    ManyToOne,
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManyToOne => "many-to-one",
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToMany => "many-to-many",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub kind: RelationshipKind,
    pub from_column: String,
    pub to_column: String,
}

impl Relationship {
    /// A foreign key edge from `from.from_column` to `to.to_column`.
    pub fn many_to_one(
        from: impl Into<String>,
        from_column: impl Into<String>,
        to: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: RelationshipKind::ManyToOne,
            from_column: from_column.into(),
            to_column: to_column.into(),
        }
    }

    pub fn touches(&self, table: &str) -> bool {
        self.from == table || self.to == table
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub ddl: String,
}

impl Schema {
    /// Parse `ddl` and keep the original text alongside the structure.
    pub fn from_ddl(
        name: impl Into<String>,
        description: impl Into<String>,
        ddl: impl Into<String>,
        parser: &dyn DdlParser,
    ) -> Self {
        let ddl = ddl.into();
        let parsed = parser.parse(&ddl);
        Self {
            name: name.into(),
            description: description.into(),
            tables: parsed.tables,
            relationships: parsed.relationships,
            ddl,
        }
    }

    /// Look up a table by name. Duplicate names resolve to the last definition.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().rev().find(|t| t.name == name)
    }

    /// File name offered when downloading the DDL.
    pub fn export_file_name(&self) -> String {
        let stem = self
            .name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("{}_schema.sql", stem)
    }

    /// Regenerate DDL text from the structured tables and relationships.
    pub fn to_ddl(&self) -> String {
        let mut out = String::new();

        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_table(&mut out, table);
        }

        out
    }

    fn write_table(&self, out: &mut String, table: &Table) {
        let primary = table.primary_columns();
        let composite = primary.len() > 1;

        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|col| {
                let mut line = format!("  {} {}", col.name, col.typ);
                if col.is_primary && !composite {
                    line.push_str(" PRIMARY KEY");
                } else if !col.is_nullable && !col.is_primary {
                    line.push_str(" NOT NULL");
                }
                // Only the first edge per column survives as an inline reference
                if let Some(rel) = self
                    .relationships
                    .iter()
                    .find(|r| r.from == table.name && r.from_column == col.name)
                {
                    let _ = write!(line, " REFERENCES {}({})", rel.to, rel.to_column);
                }
                line
            })
            .collect();

        if composite {
            lines.push(format!("  PRIMARY KEY ({})", primary.join(", ")));
        }

        let _ = writeln!(out, "CREATE TABLE {} (\n{}\n);", table.name, lines.join(",\n"));
    }
}
