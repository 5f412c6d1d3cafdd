//! Lightworks `.odb` project index.
//!
//! The index is plain text. Single-field lines are `KEY:value` metadata.
//! Multi-field lines form a comma separated table: the first three rows hold
//! field lengths, field types and field names, every later row is one item
//! keyed by its first column.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One table row, field name to value.
pub type ProjectItem = BTreeMap<String, String>;

/// Parsed project index.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    pub path: PathBuf,
    metadata: BTreeMap<String, String>,
    field_lengths: Vec<String>,
    field_types: Vec<String>,
    field_names: Vec<String>,
    /// Items in file order.
    items: Vec<ProjectItem>,
}

impl ProjectIndex {
    /// Read and parse an index file.
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut index = Self::parse(&text);
        index.path = path.to_path_buf();
        Ok(index)
    }

    /// Parse index text.
    pub fn parse(text: &str) -> Self {
        let mut index = Self::default();
        let mut table_row = 0;

        for line in text.lines() {
            let row = split_row(line);
            if row.is_empty() {
                continue;
            }
            // A trailing comma leaves empty fields behind a metadata line.
            if row[1..].iter().all(|f| f.is_empty()) {
                if let Some((key, value)) = row[0].split_once(':') {
                    if !value.is_empty() {
                        index.metadata.insert(key.to_string(), clean_value(value));
                    }
                }
                continue;
            }

            table_row += 1;
            match table_row {
                1 => index.field_lengths = row,
                2 => index.field_types = row,
                3 => index.field_names = row,
                _ => {
                    let item = index
                        .field_names
                        .iter()
                        .cloned()
                        .zip(row)
                        .collect::<ProjectItem>();
                    index.items.push(item);
                }
            }
        }

        debug!(
            metadata = index.metadata.len(),
            fields = index.field_names.len(),
            items = index.items.len(),
            "parsed project index"
        );
        index
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Declared field types, aligned with [`field_names`](Self::field_names).
    pub fn field_types(&self) -> &[String] {
        &self.field_types
    }

    pub fn field_lengths(&self) -> &[String] {
        &self.field_lengths
    }

    pub fn items(&self) -> &[ProjectItem] {
        &self.items
    }

    /// Items whose `Type` column equals `kind` (`edit` or `shot`).
    pub fn items_of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ProjectItem> {
        self.items
            .iter()
            .filter(move |item| item.get("Type").map(String::as_str) == Some(kind))
    }

    /// Cookies of all `edit` items.
    pub fn edit_cookies(&self) -> Vec<String> {
        self.items_of_type("edit")
            .filter_map(|item| item.get("Cookie").cloned())
            .collect()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.metadata("PROJECT_NAME")
    }

    /// `PROJECT_RATE` as whole frames per second.
    pub fn frame_rate(&self) -> Option<u32> {
        self.metadata("PROJECT_RATE")
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|r| *r > 0.0)
            .map(|r| r.round() as u32)
    }
}

/// Strip surrounding quotes and a trailing comma.
fn clean_value(value: &str) -> String {
    let value = value.trim().trim_end_matches(',');
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// Split one comma separated row. Fields may be double quoted, a doubled
/// quote inside a quoted field is a literal quote, and whitespace after a
/// separator is skipped.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            ' ' | '\t' if at_field_start => {}
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    fields.push(field);

    fields
}
