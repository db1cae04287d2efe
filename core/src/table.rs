use crate::aggregate::{ranked, KeywordFrequencies};
use crate::Result;
use serde::Serialize;
use std::io::Write;

/// Rows each keyword keeps in the long table written by the analyzer.
pub const DEFAULT_TABLE_TOP_N: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    pub keyword: String,
    pub token: String,
    pub count: u64,
}

/// Long-format (keyword, token, count) table.
///
/// Rows are ordered by keyword, then count descending, then token. The
/// order is the same for every table built from the same frequencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    /// Every (keyword, token) pair with a positive count, nothing dropped.
    pub fn from_frequencies(freqs: &KeywordFrequencies) -> Self {
        Self::build(freqs, None)
    }

    /// Only the `n` most frequent tokens of each keyword.
    pub fn top_per_keyword(freqs: &KeywordFrequencies, n: usize) -> Self {
        Self::build(freqs, Some(n))
    }

    fn build(freqs: &KeywordFrequencies, limit: Option<usize>) -> Self {
        let mut rows = Vec::new();
        for (keyword, counts) in freqs.iter() {
            let words = ranked(counts)
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .take(limit.unwrap_or(usize::MAX));
            rows.extend(words.map(|(token, count)| FrequencyRow {
                keyword: keyword.to_string(),
                token: token.to_string(),
                count,
            }));
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_keyword<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a FrequencyRow> + 'a {
        self.rows.iter().filter(move |r| r.keyword == keyword)
    }

    /// Writes `keyword,token,count` CSV, header included even when empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(["keyword", "token", "count"])?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::WordCounts;

    fn freqs() -> KeywordFrequencies {
        let a: WordCounts = [("苹果".to_string(), 2), ("喜欢".to_string(), 1), ("好吃".to_string(), 1)]
            .into_iter()
            .collect();
        let b: WordCounts = [("香蕉".to_string(), 3)].into_iter().collect();
        [("A".to_string(), a), ("B".to_string(), b), ("C".to_string(), WordCounts::new())]
            .into_iter()
            .collect()
    }

    #[test]
    fn flattening_is_lossless_and_ordered() {
        let table = FrequencyTable::from_frequencies(&freqs());
        let got: Vec<(&str, &str, u64)> =
            table.rows().iter().map(|r| (r.keyword.as_str(), r.token.as_str(), r.count)).collect();
        assert_eq!(got, vec![("A", "苹果", 2), ("A", "喜欢", 1), ("A", "好吃", 1), ("B", "香蕉", 3)]);
        assert_eq!(table.for_keyword("C").count(), 0);
    }

    #[test]
    fn top_per_keyword_truncates() {
        let table = FrequencyTable::top_per_keyword(&freqs(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.for_keyword("A").next().map(|r| r.token.as_str()), Some("苹果"));
    }

    #[test]
    fn csv_has_header() {
        let mut out = Vec::new();
        FrequencyTable::top_per_keyword(&freqs(), 1).write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "keyword,token,count\nA,苹果,2\nB,香蕉,3\n");
    }
}
