use crate::dataset::{Dataset, Value};
use crate::{Error, Result};

pub const DEFAULT_TOP_TOPICS: usize = 3;
pub const DEFAULT_TOPICS_COLUMN: &str = "话题";
pub const DEFAULT_TOPICS_OUTPUT: &str = "top_topics";

#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub topics_column: String,
    pub top_n: usize,
    pub delimiter: char,
    /// Name of the appended list column.
    pub output_column: String,
}

impl TopicConfig {
    pub fn new(topics_column: impl Into<String>) -> Self {
        Self {
            topics_column: topics_column.into(),
            top_n: DEFAULT_TOP_TOPICS,
            delimiter: ',',
            output_column: DEFAULT_TOPICS_OUTPUT.to_string(),
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::InvalidTopN);
        }
        Ok(())
    }
}

/// First `top_n` non-empty entries of a delimited topics field, in source order.
pub fn split_topics(raw: &str, delimiter: char, top_n: usize) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(top_n)
        .map(str::to_string)
        .collect()
}

/// Appends a list column holding each row's leading topics.
///
/// Ranking is the order topics appear in the field; nothing is counted
/// across the corpus. Rows without topics get an empty list.
pub fn extract_top_topics(dataset: &Dataset, config: &TopicConfig) -> Result<Dataset> {
    config.validate()?;
    let col = dataset.column_index(&config.topics_column)?;
    if dataset.has_column(&config.output_column) {
        return Err(Error::DuplicateColumn { column: config.output_column.clone() });
    }

    let values: Vec<Value> = dataset
        .rows()
        .map(|row| {
            let topics = match &row[col] {
                Value::List(items) => items
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .take(config.top_n)
                    .map(str::to_string)
                    .collect(),
                other => split_topics(other.text_or_empty(), config.delimiter, config.top_n),
            };
            Value::List(topics)
        })
        .collect();

    let with_topics = dataset.clone().with_column(&config.output_column, values)?;
    tracing::info!(rows = with_topics.len(), column = %config.output_column, "extracted top topics");
    Ok(with_topics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_truncates() {
        assert_eq!(split_topics(" a, b ,,c,d", ',', 3), vec!["a", "b", "c"]);
        assert!(split_topics("", ',', 3).is_empty());
    }

    #[test]
    fn zero_topics_is_rejected_before_reading_data() {
        let config = TopicConfig::new("话题").with_top_n(0);
        assert!(matches!(config.validate(), Err(Error::InvalidTopN)));
        assert!(TopicConfig::new("话题").validate().is_ok());
        let data = Dataset::new(["other"]).unwrap();
        assert!(matches!(extract_top_topics(&data, &config), Err(Error::InvalidTopN)));
    }
}
