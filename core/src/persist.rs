use crate::aggregate::{ranked, KeywordFrequencies, WordCounts};
use crate::dataset::Dataset;
use crate::table::FrequencyTable;
use crate::tokenizer::WordLengthRange;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Separator for list cells in flat CSV output.
pub const LIST_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_posts: usize,
    pub num_keywords: usize,
    pub word_length_range: (usize, usize),
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn new(num_posts: usize, num_keywords: usize, range: WordLengthRange) -> Self {
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into());
        Self { num_posts, num_keywords, word_length_range: (range.min(), range.max()), created_at, version: 1 }
    }
}

pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn word_freq(&self) -> PathBuf { self.root.join("word_freq.csv") }
    pub fn frequencies(&self) -> PathBuf { self.root.join("frequencies.json") }
    pub fn posts(&self) -> PathBuf { self.root.join("posts.csv") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn wordclouds(&self) -> PathBuf { self.root.join("wordclouds") }
}

pub fn save_frequency_table(paths: &OutputPaths, table: &FrequencyTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.word_freq())?;
    table.write_csv(BufWriter::new(f))
}

/// Frequencies as JSON: keyword → `[token, count]` pairs, most frequent first.
pub fn save_frequencies_json(paths: &OutputPaths, freqs: &KeywordFrequencies) -> Result<()> {
    create_dir_all(&paths.root)?;
    let by_keyword: BTreeMap<&str, Vec<(&str, u64)>> =
        freqs.iter().map(|(keyword, counts)| (keyword, ranked(counts))).collect();
    let mut f = File::create(paths.frequencies())?;
    let json = serde_json::to_string_pretty(&by_keyword)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_frequencies_json(paths: &OutputPaths) -> Result<KeywordFrequencies> {
    let f = File::open(paths.frequencies())?;
    let raw: BTreeMap<String, Vec<(String, u64)>> = serde_json::from_reader(BufReader::new(f))?;
    Ok(raw
        .into_iter()
        .map(|(keyword, pairs)| (keyword, pairs.into_iter().collect::<WordCounts>()))
        .collect())
}

/// Writes the dataset as CSV, list cells joined with [`LIST_SEPARATOR`].
pub fn save_dataset_csv(paths: &OutputPaths, dataset: &Dataset) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.posts())?;
    write_dataset_csv(BufWriter::new(f), dataset)
}

pub fn write_dataset_csv<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        wtr.write_record(row.iter().map(|v| v.render(LIST_SEPARATOR)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_meta(paths: &OutputPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &OutputPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}
