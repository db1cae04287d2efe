use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Body is printable ASCII minus space, '"', '#', '`', '{', '|', '}' and '~',
    // so a link glued to following Chinese text stops at the first CJK char.
    static ref URL_RE: Regex = Regex::new(r"(?i:https?)://[!$-_a-z]+").expect("valid regex");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref DEFAULT_CLEANER: Cleaner = Cleaner::default();
}

/// Text normalizer for raw post bodies.
///
/// Cleaning runs in this order:
/// - NFKC normalization (full-width Latin and digits fold to ASCII)
/// - removal of `http://` / `https://` links
/// - removal of every character that is not a letter, whitespace or,
///   when `keep_digits` is set, a number; this drops emoji, punctuation,
///   symbols, combining marks and format characters
/// - NFKC again, then whitespace runs collapse to one space and the ends
///   are trimmed
///
/// The result is a fixed point: cleaning a cleaned string returns it as is.
#[derive(Debug, Clone)]
pub struct Cleaner {
    keep_digits: bool,
    noise: Regex,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Cleaner {
    pub fn new(keep_digits: bool) -> Self {
        let pattern = if keep_digits { r"[^\p{L}\p{N}\s]" } else { r"[^\p{L}\s]" };
        Self { keep_digits, noise: Regex::new(pattern).expect("valid regex") }
    }

    /// The process-wide cleaner used by [`clean_text`].
    pub fn shared() -> &'static Cleaner {
        &DEFAULT_CLEANER
    }

    pub fn keeps_digits(&self) -> bool {
        self.keep_digits
    }

    pub fn clean(&self, text: &str) -> String {
        let folded: String = text.nfkc().collect();
        let without_urls = URL_RE.replace_all(&folded, " ");
        let kept = self.noise.replace_all(&without_urls, "");
        // removing characters can leave conjoining jamo side by side
        let recomposed: String = kept.nfkc().collect();
        WHITESPACE_RE.replace_all(&recomposed, " ").trim().to_string()
    }
}

/// Cleans `text` with the default policy (letters and digits kept).
pub fn clean_text(text: &str) -> String {
    DEFAULT_CLEANER.clean(text)
}

/// Like [`clean_text`], mapping a missing value to the empty string.
pub fn clean_optional(text: Option<&str>) -> String {
    text.map(clean_text).unwrap_or_default()
}
