//! Word-cloud rendering of per-keyword frequencies.
//!
//! Output is plain SVG plus a JSON file listing the words drawn for each
//! keyword, so a front end can redraw the clouds with its own layout.

use crate::aggregate::KeywordFrequencies;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Blue-green-yellow gradient stops.
pub const DEFAULT_PALETTE: [&str; 5] = ["#208fc6", "#5AABDB", "#80d16a", "#C4DA4C", "#f9c92b"];

const TITLE_HEIGHT: f32 = 32.0;
const PADDING: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    pub top_n: usize,
    pub width: u32,
    pub height: u32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    pub palette: Vec<String>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            top_n: 30,
            width: 400,
            height: 300,
            min_font_size: 10.0,
            max_font_size: 48.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudWord {
    pub word: String,
    pub count: u64,
    pub font_size: f32,
}

#[derive(Serialize)]
struct CloudIndexEntry<'a> {
    keyword: &'a str,
    file: String,
    words: &'a [CloudWord],
}

/// Top words of `keyword` with font sizes scaled linearly by count.
pub fn cloud_words(freqs: &KeywordFrequencies, keyword: &str, config: &WordCloudConfig) -> Vec<CloudWord> {
    let ranked = freqs.most_common(keyword, config.top_n);
    let (Some(&(_, max)), Some(&(_, min))) = (ranked.first(), ranked.last()) else {
        return Vec::new();
    };
    ranked
        .into_iter()
        .map(|(word, count)| {
            let font_size = if max == min {
                config.max_font_size
            } else {
                let t = (count - min) as f32 / (max - min) as f32;
                config.min_font_size + t * (config.max_font_size - config.min_font_size)
            };
            CloudWord { word: word.to_string(), count, font_size }
        })
        .collect()
}

/// Lays the words out in rows, largest first, and renders an SVG document.
/// Words that no longer fit below the last row are left out.
pub fn render_svg(keyword: &str, words: &[CloudWord], config: &WordCloudConfig) -> String {
    let (width, height) = (config.width as f32, config.height as f32);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = config.width,
        h = config.height
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"22\" font-size=\"16\" font-weight=\"bold\" text-anchor=\"middle\">{} - TOP{}</text>\n",
        width / 2.0,
        escape(keyword),
        config.top_n
    ));

    let (mut x, mut baseline, mut row_height) = (PADDING, TITLE_HEIGHT, 0.0f32);
    for (i, word) in words.iter().enumerate() {
        let advance = text_width(&word.word, word.font_size);
        if x + advance > width - PADDING && x > PADDING {
            x = PADDING;
            baseline += row_height + PADDING;
            row_height = 0.0;
        }
        if baseline + word.font_size > height {
            break;
        }
        row_height = row_height.max(word.font_size);
        let color = config.palette.get(i % config.palette.len().max(1)).map(String::as_str).unwrap_or("black");
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>\n",
            x,
            baseline + word.font_size,
            word.font_size,
            color,
            escape(&word.word)
        ));
        x += advance + PADDING;
    }
    svg.push_str("</svg>\n");
    svg
}

/// Writes `wordclouds.json` and one `wordcloud_NN.svg` per keyword into `dir`.
pub fn write_wordclouds<P: AsRef<Path>>(
    dir: P,
    freqs: &KeywordFrequencies,
    config: &WordCloudConfig,
) -> Result<Vec<PathBuf>> {
    if freqs.is_empty() {
        return Err(Error::NoInput("no keywords to draw word clouds for".into()));
    }
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let clouds: Vec<(&str, Vec<CloudWord>)> =
        freqs.keywords().map(|k| (k, cloud_words(freqs, k, config))).collect();
    let mut written = Vec::with_capacity(clouds.len());
    let mut index = Vec::with_capacity(clouds.len());
    for (i, (keyword, words)) in clouds.iter().enumerate() {
        let file = format!("wordcloud_{i:02}.svg");
        let path = dir.join(&file);
        fs::write(&path, render_svg(keyword, words, config))?;
        written.push(path);
        index.push(CloudIndexEntry { keyword, file, words });
    }
    fs::write(dir.join("wordclouds.json"), serde_json::to_vec_pretty(&index)?)?;
    tracing::info!(dir = %dir.display(), clouds = written.len(), "wrote word clouds");
    Ok(written)
}

/// Rough advance width: CJK glyphs are square, ASCII about half as wide.
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| if c.is_ascii() { 0.6 } else { 1.0 }).sum::<f32>() * font_size
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
