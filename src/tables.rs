//! CSV output tables.
//!
//! Fields containing a comma, quote, or line break are quoted and embedded
//! quotes are doubled. Rows end with `\n`.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[&'static str] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_line(&mut out, self.headers.iter().copied());
        for row in &self.rows {
            write_line(&mut out, row.iter().map(String::as_str));
        }
        out
    }

    /// Write the table to `dir/name`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path, name: &str) -> Result<std::path::PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(name);
        std::fs::write(&path, self.to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn write_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
