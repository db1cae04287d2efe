//! Loading of exported post files.
//!
//! A folder holds one export per search keyword; the file stem names the
//! keyword. `.csv` files carry a header row, `.jsonl` files one JSON object
//! per line.

use crate::dataset::{Dataset, Value};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Jsonl,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(InputFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Some(InputFormat::Jsonl),
            _ => None,
        }
    }
}

/// Keyword for a file: its stem, with a `%23…%23` wrapper (an encoded
/// `#…#` hashtag) removed.
pub fn keyword_from_path(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    match stem.strip_prefix("%23").and_then(|s| s.strip_suffix("%23")) {
        Some(inner) => inner.to_string(),
        None => stem,
    }
}

/// Loads every `.csv` / `.jsonl` file directly inside `dir` and merges them.
///
/// Each file's rows get `keyword_column` set to the file's keyword. Files
/// are read in path order; columns are the union over all files.
pub fn load_posts_from_folder<P: AsRef<Path>>(dir: P, keyword_column: &str) -> Result<Dataset> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NoInput(format!("{} is not a directory", dir.display())));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && InputFormat::from_path(p).is_some())
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(Error::NoInput(format!("no .csv or .jsonl files in {}", dir.display())));
    }

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        let keyword = keyword_from_path(file);
        let mut data = load_file(file)?;
        data.fill_column(keyword_column, &keyword);
        info!(file = %file.display(), rows = data.len(), keyword = %keyword, "loaded posts");
        parts.push(data);
    }

    let combined = Dataset::concat(parts);
    let keyword_col = combined.column_index(keyword_column)?;
    let keywords: BTreeSet<&str> = combined.rows().map(|row| row[keyword_col].text_or_empty()).collect();
    info!(rows = combined.len(), keywords = ?keywords, "merged post files");
    Ok(combined)
}

/// Reads one file, picking the parser from its extension.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    match InputFormat::from_path(path) {
        Some(InputFormat::Jsonl) => read_jsonl(BufReader::new(file)),
        _ => read_csv(file),
    }
}

/// Parses CSV with a header row. Empty fields become `Null`; short records
/// are padded and long ones truncated to the header width.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}').to_string() } else { h.to_string() })
        .collect();
    let mut data = Dataset::new(headers)?;
    let width = data.columns().len();

    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<Value> = record
            .iter()
            .take(width)
            .map(|field| if field.is_empty() { Value::Null } else { Value::from(field) })
            .collect();
        row.resize(width, Value::Null);
        data.push_row(row)?;
    }
    Ok(data)
}

/// Parses JSON lines, one object per non-blank line.
///
/// Strings map to text, `null` to `Null`, arrays to lists and any other
/// value to its JSON text.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut parts = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let obj: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&line)?;
        let mut single = Dataset::new(obj.keys().cloned())?;
        single.push_row(obj.into_iter().map(|(_, v)| json_cell(v)).collect())?;
        parts.push(single);
    }
    Ok(Dataset::concat(parts))
}

fn json_cell(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        other => Value::Text(other.to_string()),
    }
}
