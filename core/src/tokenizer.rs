use crate::{Error, Result};
use jieba_rs::Jieba;
use lazy_static::lazy_static;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Inclusive token length bounds used when nothing else is configured.
pub const DEFAULT_WORD_LENGTH_RANGE: (usize, usize) = (2, 4);

lazy_static! {
    static ref DEFAULT_SEGMENTER: Segmenter = Segmenter::new();
}

/// Inclusive bounds on token length, counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLengthRange {
    min: usize,
    max: usize,
}

impl WordLengthRange {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 || max == 0 || min > max {
            return Err(Error::InvalidWordLength { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, token: &str) -> bool {
        let len = token.chars().count();
        self.min <= len && len <= self.max
    }
}

impl Default for WordLengthRange {
    fn default() -> Self {
        let (min, max) = DEFAULT_WORD_LENGTH_RANGE;
        Self { min, max }
    }
}

/// Chinese word segmenter backed by jieba.
///
/// The dictionary is loaded once and never mutated afterwards, so one
/// segmenter can be shared by reference across worker threads.
#[derive(Clone)]
pub struct Segmenter {
    jieba: Arc<Jieba>,
    hmm: bool,
}

impl fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segmenter").field("hmm", &self.hmm).finish_non_exhaustive()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// Segmenter over jieba's bundled dictionary, with HMM new-word discovery.
    pub fn new() -> Self {
        tracing::debug!("loading bundled jieba dictionary");
        Self { jieba: Arc::new(Jieba::new()), hmm: true }
    }

    /// The process-wide default segmenter used by [`tokenize`].
    pub fn shared() -> &'static Segmenter {
        &DEFAULT_SEGMENTER
    }

    /// Segmenter whose main dictionary is read from `path` instead of the
    /// bundled one.
    pub fn from_dict_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open_dict(path)?;
        let jieba = Jieba::with_dict(&mut reader).map_err(|e| dict_error(path, e))?;
        tracing::info!(dict = %path.display(), "loaded segmentation dictionary");
        Ok(Self { jieba: Arc::new(jieba), hmm: true })
    }

    /// Bundled dictionary extended with the user entries in `path`.
    pub fn with_user_dict<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open_dict(path)?;
        let mut jieba = Jieba::new();
        jieba.load_dict(&mut reader).map_err(|e| dict_error(path, e))?;
        tracing::info!(dict = %path.display(), "loaded user dictionary");
        Ok(Self { jieba: Arc::new(jieba), hmm: true })
    }

    pub fn with_hmm(mut self, hmm: bool) -> Self {
        self.hmm = hmm;
        self
    }

    /// Raw segmentation, whitespace segments included.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.jieba.cut(text, self.hmm)
    }

    /// Segments `text` and keeps the words whose length falls in `range`.
    pub fn tokenize(&self, text: &str, range: WordLengthRange) -> Vec<String> {
        self.segment(text)
            .into_iter()
            .filter(|word| !word.trim().is_empty() && range.contains(word))
            .map(str::to_string)
            .collect()
    }
}

fn open_dict(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| dict_error(path, e))
}

fn dict_error(path: &Path, err: impl fmt::Display) -> Error {
    Error::Dictionary { path: path.to_path_buf(), message: err.to_string() }
}

/// Tokenize cleaned text with the shared segmenter.
pub fn tokenize(text: &str, range: WordLengthRange) -> Vec<String> {
    DEFAULT_SEGMENTER.tokenize(text, range)
}
