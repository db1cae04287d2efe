pub mod aggregate;
pub mod clean;
pub mod dataset;
pub mod dedupe;
pub mod error;
pub mod ingest;
pub mod persist;
pub mod table;
pub mod tokenizer;
pub mod topics;
pub mod wordcloud;

pub use aggregate::{count_words_by_keyword, FrequencyConfig, KeywordFrequencies, WordCounts};
pub use clean::{clean_optional, clean_text, Cleaner};
pub use dataset::{Dataset, Value};
pub use error::{Error, Result};
pub use table::{FrequencyRow, FrequencyTable};
pub use tokenizer::{tokenize, Segmenter, WordLengthRange};
pub use topics::{extract_top_topics, TopicConfig};
