use crate::clean::clean_text;
use crate::dataset::Dataset;
use crate::tokenizer::{Segmenter, WordLengthRange};
use crate::Result;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Token → occurrence count for one keyword.
pub type WordCounts = HashMap<String, u64>;

/// Column names of the original Weibo exports.
pub const DEFAULT_TEXT_COLUMN: &str = "微博正文";
pub const DEFAULT_KEYWORD_COLUMN: &str = "关键词";

#[derive(Debug, Clone)]
pub struct FrequencyConfig {
    pub text_column: String,
    pub keyword_column: String,
    pub word_length_range: WordLengthRange,
}

impl FrequencyConfig {
    pub fn new(text_column: impl Into<String>, keyword_column: impl Into<String>) -> Self {
        Self {
            text_column: text_column.into(),
            keyword_column: keyword_column.into(),
            word_length_range: WordLengthRange::default(),
        }
    }

    pub fn with_word_length_range(mut self, range: WordLengthRange) -> Self {
        self.word_length_range = range;
        self
    }
}

/// Per-keyword word frequencies.
///
/// Keywords iterate in lexical order. Token maps are unordered; use
/// [`KeywordFrequencies::most_common`] for a ranked view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFrequencies {
    by_keyword: BTreeMap<String, WordCounts>,
}

impl KeywordFrequencies {
    pub fn get(&self, keyword: &str) -> Option<&WordCounts> {
        self.by_keyword.get(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_keyword.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_keyword.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordCounts)> + '_ {
        self.by_keyword.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum of all counts under `keyword` (0 for an unknown keyword).
    pub fn total_tokens(&self, keyword: &str) -> u64 {
        self.get(keyword).map(|c| c.values().sum()).unwrap_or(0)
    }

    /// Top `n` tokens of `keyword`, count descending, ties by token.
    pub fn most_common(&self, keyword: &str, n: usize) -> Vec<(&str, u64)> {
        let mut ranked = self.get(keyword).map(ranked).unwrap_or_default();
        ranked.truncate(n);
        ranked
    }
}

impl FromIterator<(String, WordCounts)> for KeywordFrequencies {
    fn from_iter<I: IntoIterator<Item = (String, WordCounts)>>(iter: I) -> Self {
        Self { by_keyword: iter.into_iter().collect() }
    }
}

/// Sorted view of one keyword's counts: count descending, then token ascending.
pub(crate) fn ranked(counts: &WordCounts) -> Vec<(&str, u64)> {
    let mut v: Vec<(&str, u64)> = counts.iter().map(|(t, &c)| (t.as_str(), c)).collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    v
}

/// Clean, segment and count the text of every row, grouped by keyword.
///
/// Both columns are checked before any row is read. Keywords are compared
/// by exact string equality; a missing keyword cell groups under `""`.
/// A keyword whose rows carry no text still gets an (empty) entry.
pub fn count_words_by_keyword(
    dataset: &Dataset,
    config: &FrequencyConfig,
    segmenter: &Segmenter,
) -> Result<KeywordFrequencies> {
    let text_col = dataset.column_index(&config.text_column)?;
    let keyword_col = dataset.column_index(&config.keyword_column)?;
    let range = config.word_length_range;

    let partitions = partition_by_keyword(dataset, text_col, keyword_col);

    // each worker owns one keyword's counter; merged after all finish
    let counted: Vec<(String, WordCounts, u64)> = partitions
        .into_par_iter()
        .map(|(keyword, texts)| {
            let mut counts = WordCounts::new();
            let mut total = 0u64;
            for text in texts {
                let cleaned = clean_text(text);
                for token in segmenter.tokenize(&cleaned, range) {
                    *counts.entry(token).or_insert(0) += 1;
                    total += 1;
                }
            }
            (keyword, counts, total)
        })
        .collect();

    for (keyword, counts, total) in &counted {
        info!(keyword = %keyword, tokens = total, unique = counts.len(), "counted keyword");
    }
    Ok(counted.into_iter().map(|(keyword, counts, _)| (keyword, counts)).collect())
}

/// Groups row texts by keyword, in first-seen keyword order.
fn partition_by_keyword(
    dataset: &Dataset,
    text_col: usize,
    keyword_col: usize,
) -> Vec<(String, Vec<&str>)> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for row in dataset.rows() {
        let keyword = row[keyword_col].text_or_empty();
        let slot = *slots.entry(keyword).or_insert_with(|| {
            groups.push((keyword.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row[text_col].text_or_empty());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_breaks_ties_by_token() {
        let counts: WordCounts =
            [("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 5)].into_iter().collect();
        assert_eq!(ranked(&counts), vec![("c", 5), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn partitions_keep_every_row() {
        let mut data = Dataset::new(["kw", "text"]).unwrap();
        data.push_row(vec!["B".into(), "x".into()]).unwrap();
        data.push_row(vec!["A".into(), crate::Value::Null]).unwrap();
        data.push_row(vec!["B".into(), "y".into()]).unwrap();
        let groups = partition_by_keyword(&data, 1, 0);
        assert_eq!(groups, vec![("B".to_string(), vec!["x", "y"]), ("A".to_string(), vec![""])]);
    }
}
