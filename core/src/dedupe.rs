use crate::clean::clean_text;
use crate::dataset::{Dataset, Value};
use crate::tokenizer::Segmenter;
use crate::{Error, Result};
use similar::TextDiff;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use tracing::{debug, info};

/// Engagement columns of the Weibo exports that are summed on merge.
pub const DEFAULT_SUM_COLUMNS: [&str; 4] = ["点赞数", "评论数", "转发数", "互动总数"];

#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub keyword_column: String,
    pub text_column: String,
    /// Rows repeating an earlier id are dropped first.
    pub id_column: Option<String>,
    /// Earliest value wins when rows merge. Values such as `2024-01-31 08:00`
    /// or `2024/1/31 8:00` are compared as timestamps, anything else as text.
    pub time_column: Option<String>,
    pub sum_columns: Vec<String>,
    pub similarity_threshold: f64,
    pub min_len_for_similarity: usize,
}

impl DedupeConfig {
    pub fn new(keyword_column: impl Into<String>, text_column: impl Into<String>) -> Self {
        Self {
            keyword_column: keyword_column.into(),
            text_column: text_column.into(),
            id_column: None,
            time_column: None,
            sum_columns: DEFAULT_SUM_COLUMNS.iter().map(|c| c.to_string()).collect(),
            similarity_threshold: 0.88,
            min_len_for_similarity: 6,
        }
    }
}

struct Post {
    keyword: String,
    cleaned: String,
    time: Option<PostTime>,
    sums: Vec<f64>,
    alive: bool,
    merged: bool,
}

/// Removes repeated posts within each keyword.
///
/// Three passes run in order: duplicate ids, identical cleaned text, and
/// near-identical text. A pair is near-identical when the Jaccard index of
/// its word sets or, failing that, its character similarity ratio reaches
/// the threshold. The
/// surviving row of a merged group is the earliest one, and the sum columns
/// of the dropped rows are added into it.
pub fn dedupe_posts(dataset: &Dataset, config: &DedupeConfig, segmenter: &Segmenter) -> Result<Dataset> {
    let threshold = config.similarity_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(Error::InvalidThreshold(threshold));
    }
    let keyword_col = dataset.column_index(&config.keyword_column)?;
    let text_col = dataset.column_index(&config.text_column)?;
    let id_col = config.id_column.as_deref().map(|c| dataset.column_index(c)).transpose()?;
    let time_col = config.time_column.as_deref().and_then(|c| dataset.column_index(c).ok());
    let sum_cols: Vec<usize> =
        config.sum_columns.iter().filter_map(|c| dataset.column_index(c).ok()).collect();

    let mut posts: Vec<Post> = dataset
        .rows()
        .map(|row| Post {
            keyword: row[keyword_col].text_or_empty().to_string(),
            cleaned: clean_text(row[text_col].text_or_empty()),
            time: time_col.and_then(|c| row[c].as_text()).map(PostTime::new),
            sums: sum_cols.iter().map(|&c| parse_number(&row[c])).collect(),
            alive: true,
            merged: false,
        })
        .collect();

    let id_dropped = match id_col {
        Some(col) => drop_repeated_ids(dataset, col, &mut posts),
        None => 0,
    };
    let exact_dropped = merge_exact(&mut posts);
    let near_dropped = merge_near(&mut posts, config, segmenter);

    let keep: Vec<usize> = (0..posts.len()).filter(|&i| posts[i].alive).collect();
    let mut out = dataset.select_rows(&keep);
    for (out_row, &i) in keep.iter().enumerate() {
        if !posts[i].merged {
            continue;
        }
        for (&col, &total) in sum_cols.iter().zip(&posts[i].sums) {
            out.set_cell(out_row, col, Value::Text(format_number(total)));
        }
    }

    info!(
        id_dropped,
        exact_dropped,
        near_dropped,
        rows = out.len(),
        "deduplicated posts"
    );
    Ok(out)
}

fn drop_repeated_ids(dataset: &Dataset, col: usize, posts: &mut [Post]) -> usize {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut dropped = 0;
    for (i, row) in dataset.rows().enumerate() {
        let Some(id) = row[col].as_text() else { continue };
        if !seen.insert(id) {
            posts[i].alive = false;
            dropped += 1;
        }
    }
    dropped
}

fn merge_exact(posts: &mut [Post]) -> usize {
    let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (i, post) in posts.iter().enumerate().filter(|(_, p)| p.alive) {
        groups.entry((post.keyword.as_str(), post.cleaned.as_str())).or_default().push(i);
    }
    let mut groups: Vec<Vec<usize>> = groups.into_values().filter(|g| g.len() > 1).collect();
    groups.sort();

    let mut dropped = 0;
    for group in groups {
        let keep = earliest(posts, &group);
        for &other in group.iter().filter(|&&i| i != keep) {
            absorb(posts, keep, other);
            dropped += 1;
        }
    }
    dropped
}

fn merge_near(posts: &mut [Post], config: &DedupeConfig, segmenter: &Segmenter) -> usize {
    // keyword -> length bucket -> row indices
    let mut buckets: BTreeMap<String, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
    for (i, post) in posts.iter().enumerate().filter(|(_, p)| p.alive) {
        let len = post.cleaned.chars().count();
        if len < config.min_len_for_similarity {
            continue;
        }
        buckets.entry(post.keyword.clone()).or_default().entry(len / 10).or_default().push(i);
    }

    let mut dropped = 0;
    for (keyword, by_len) in buckets {
        for members in by_len.into_values() {
            let token_sets: Vec<BTreeSet<String>> = members
                .iter()
                .map(|&i| {
                    segmenter
                        .segment(&posts[i].cleaned)
                        .into_iter()
                        .filter(|w| !w.trim().is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .collect();
            for a in 0..members.len() {
                for b in (a + 1)..members.len() {
                    let (i, j) = (members[a], members[b]);
                    if !posts[i].alive {
                        break;
                    }
                    if !posts[j].alive || !comparable_lengths(&posts[i].cleaned, &posts[j].cleaned) {
                        continue;
                    }
                    let score = jaccard(&token_sets[a], &token_sets[b]);
                    if score < config.similarity_threshold
                        && char_ratio(&posts[i].cleaned, &posts[j].cleaned) < config.similarity_threshold
                    {
                        continue;
                    }
                    let (keep, drop) = match earlier(posts, i, j) {
                        Ordering::Greater => (j, i),
                        _ => (i, j),
                    };
                    debug!(keyword = %keyword, keep, drop, jaccard = score, "near-duplicate posts");
                    absorb(posts, keep, drop);
                    dropped += 1;
                }
            }
        }
    }
    dropped
}

/// Earliest by time (rows with a time before rows without), then by row order.
fn earlier(posts: &[Post], a: usize, b: usize) -> Ordering {
    let by_time = match (&posts[a].time, &posts[b].time) {
        (Some(x), Some(y)) => x.compare(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time.then(a.cmp(&b))
}

/// Publication time of a post, parsed when the format is recognised.
struct PostTime {
    parsed: Option<PrimitiveDateTime>,
    raw: String,
}

impl PostTime {
    fn new(raw: &str) -> Self {
        Self { parsed: parse_time(raw), raw: raw.to_string() }
    }

    /// Chronological when both sides parse, otherwise by raw text.
    fn compare(&self, other: &PostTime) -> Ordering {
        match (self.parsed, other.parsed) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.raw.cmp(&other.raw),
        }
    }
}

fn parse_time(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    let normalized = raw.replace('/', "-");
    let s = normalized.as_str();
    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
    })
    .or_else(|_| {
        Date::parse(s, format_description!("[year]-[month padding:none]-[day padding:none]")).map(Date::midnight)
    })
    .ok()
}

fn earliest(posts: &[Post], group: &[usize]) -> usize {
    group.iter().copied().fold(group[0], |best, i| match earlier(posts, i, best) {
        Ordering::Less => i,
        _ => best,
    })
}

fn absorb(posts: &mut [Post], keep: usize, drop: usize) {
    let extra = std::mem::take(&mut posts[drop].sums);
    for (total, value) in posts[keep].sums.iter_mut().zip(extra) {
        *total += value;
    }
    posts[drop].alive = false;
    posts[keep].merged = true;
}

fn comparable_lengths(a: &str, b: &str) -> bool {
    let (la, lb) = (a.chars().count(), b.chars().count());
    let longest = la.max(lb);
    longest == 0 || (la.abs_diff(lb) as f64) / (longest as f64) <= 0.25
}

/// Share of matching characters, `2 * matches / (len(a) + len(b))`.
fn char_ratio(a: &str, b: &str) -> f64 {
    TextDiff::from_chars(a, b).ratio() as f64
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn parse_number(value: &Value) -> f64 {
    value.as_text().and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_of_sets() {
        let a: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn numbers_round_trip_as_integers() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(parse_number(&Value::from(" 7 ")), 7.0);
        assert_eq!(parse_number(&Value::Null), 0.0);
    }

    #[test]
    fn char_ratio_counts_matching_chars() {
        let ratio = char_ratio("今天北京的天气非常好", "今天北京的天气非常棒");
        assert!((ratio - 0.9).abs() < 1e-6);
        assert_eq!(char_ratio("苹果", "香蕉"), 0.0);
    }

    #[test]
    fn times_compare_chronologically() {
        let a = PostTime::new("2024/3/9 18:00");
        let b = PostTime::new("2024/3/10 9:00");
        assert!(a.parsed.is_some() && b.parsed.is_some());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(PostTime::new("2024-03-09 18:00:05").compare(&PostTime::new("2024-3-9 18:00")), Ordering::Greater);
        assert_eq!(PostTime::new("2024-03-10").compare(&PostTime::new("2024/3/9 23:59")), Ordering::Greater);
        // unparseable values fall back to text order
        assert!(PostTime::new("yesterday").parsed.is_none());
        assert_eq!(PostTime::new("a").compare(&PostTime::new("b")), Ordering::Less);
    }

    #[test]
    fn length_ratio_filter() {
        assert!(comparable_lengths("一二三四五六七八", "一二三四五六七"));
        assert!(!comparable_lengths("一二三四五六七八", "一二三四五"));
    }
}
