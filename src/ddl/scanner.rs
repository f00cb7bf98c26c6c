//! Regular expressions and text helpers behind the DDL scanner.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use super::KeywordCase;

/// Optionally quoted identifier, capturing the bare name.
const IDENT: &str = r#"["`\[]?(\w+)["`\]]?"#;

pub(super) struct Patterns {
    pub create_table: Regex,
    pub primary_key: Regex,
    pub foreign_key: Regex,
    pub constraint_item: Regex,
    pub column: Regex,
    pub references: Regex,
    pub inline_primary: Regex,
    pub not_null: Regex,
}

impl Patterns {
    fn compile(case_insensitive: bool) -> Self {
        let build = |pattern: String| {
            RegexBuilder::new(&pattern)
                .case_insensitive(case_insensitive)
                .build()
                .expect("DDL pattern must compile")
        };

        Self {
            create_table: build(format!(
                r"CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:{IDENT}\.)?{IDENT}\s*\(([\s\S]*?)\)\s*;"
            )),
            primary_key: build(r"PRIMARY\s+KEY\s*\(([^)]*)\)".to_string()),
            foreign_key: build(format!(
                r"FOREIGN\s+KEY\s*\(\s*{IDENT}\s*\)\s*REFERENCES\s+(?:\w+\.)?{IDENT}\s*\(\s*{IDENT}\s*\)"
            )),
            // KEY/INDEX/UNIQUE/CHECK only open a constraint when a column list
            // follows, so `key TEXT` stays a column.
            constraint_item: build(format!(
                r#"^(?:PRIMARY\s+KEY|FOREIGN\s+KEY|CONSTRAINT|FULLTEXT)\b|^CHECK\s*\(|^(?:UNIQUE|KEY|INDEX)(?:\s+(?:KEY|INDEX))?(?:\s+{IDENT})?\s*\(\s*["`\[]?[A-Za-z_]"#
            )),
            column: build(format!(r"^{IDENT}\s+([\w(),]+)")),
            references: build(format!(
                r"\bREFERENCES\s+(?:\w+\.)?{IDENT}\s*\(\s*{IDENT}\s*\)"
            )),
            inline_primary: build(r"\bPRIMARY\s+KEY\b".to_string()),
            not_null: build(r"\bNOT\s+NULL\b".to_string()),
        }
    }
}

static SENSITIVE: LazyLock<Patterns> = LazyLock::new(|| Patterns::compile(false));
static INSENSITIVE: LazyLock<Patterns> = LazyLock::new(|| Patterns::compile(true));

pub(super) fn patterns(case: KeywordCase) -> &'static Patterns {
    match case {
        KeywordCase::Sensitive => &SENSITIVE,
        KeywordCase::Insensitive => &INSENSITIVE,
    }
}

/// Tracks whether the scan position is inside a `'`, `"` or `` ` `` quoted run.
#[derive(Debug, Default)]
struct Quotes {
    open: Option<char>,
}

impl Quotes {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one character. Returns true when it belongs to a quoted run,
    /// delimiters included.
    fn step(&mut self, c: char) -> bool {
        match self.open {
            Some(q) => {
                if c == q {
                    self.open = None;
                }
                true
            }
            None if matches!(c, '\'' | '"' | '`') => {
                self.open = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Remove `--` line comments and `/* */` block comments outside quoted text.
pub(super) fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quotes = Quotes::default();
    let mut i = 0;

    while let Some(c) = sql[i..].chars().next() {
        let rest = &sql[i..];
        if !quotes.is_open() {
            if rest.starts_with("--") {
                i += rest.find('\n').unwrap_or(rest.len());
                continue;
            }
            if rest.starts_with("/*") {
                i += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
                out.push(' ');
                continue;
            }
        }
        quotes.step(c);
        out.push(c);
        i += c.len_utf8();
    }

    out
}

/// Split a table body on commas that are not nested in parentheses or quotes.
pub(super) fn split_items(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quotes = Quotes::default();
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if quotes.step(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);

    items
}

/// Trim and strip quoting characters from a column name in a key list.
pub(super) fn clean_ident(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '`' | '\'' | '[' | ']'))
        .to_string()
}
