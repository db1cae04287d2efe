use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use corpus::aggregate::{DEFAULT_KEYWORD_COLUMN, DEFAULT_TEXT_COLUMN};
use corpus::dedupe::{dedupe_posts, DedupeConfig};
use corpus::ingest::load_posts_from_folder;
use corpus::persist::{save_dataset_csv, save_frequencies_json, save_frequency_table, save_meta, MetaFile, OutputPaths};
use corpus::table::DEFAULT_TABLE_TOP_N;
use corpus::topics::{DEFAULT_TOPICS_COLUMN, DEFAULT_TOP_TOPICS};
use corpus::wordcloud::{write_wordclouds, WordCloudConfig};
use corpus::{count_words_by_keyword, extract_top_topics, Cleaner, FrequencyConfig, FrequencyTable, Segmenter, TopicConfig, WordLengthRange};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "Word frequency and topic analysis for Weibo post exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a folder of exports, count words per keyword and write the results
    Analyze(AnalyzeArgs),
    /// Print the cleaned form of a text (reads stdin when --text is omitted)
    Clean {
        #[arg(long)]
        text: Option<String>,
        /// Drop digits as well as symbols
        #[arg(long, default_value_t = false)]
        no_digits: bool,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Folder holding one .csv/.jsonl export per keyword
    #[arg(long)]
    input: PathBuf,
    /// Output directory
    #[arg(long)]
    output: PathBuf,
    #[arg(long, default_value = DEFAULT_TEXT_COLUMN)]
    text_column: String,
    #[arg(long, default_value = DEFAULT_KEYWORD_COLUMN)]
    keyword_column: String,
    #[arg(long, default_value = DEFAULT_TOPICS_COLUMN)]
    topics_column: String,
    #[arg(long, default_value = "id")]
    id_column: String,
    #[arg(long, default_value = "发布时间")]
    time_column: String,
    /// Shortest kept word, in characters
    #[arg(long, default_value_t = 2)]
    min_len: usize,
    /// Longest kept word, in characters
    #[arg(long, default_value_t = 4)]
    max_len: usize,
    /// Topics kept per post
    #[arg(long, default_value_t = DEFAULT_TOP_TOPICS)]
    top_topics: usize,
    /// Words kept per keyword in word_freq.csv
    #[arg(long, default_value_t = DEFAULT_TABLE_TOP_N)]
    table_top_n: usize,
    /// Words drawn per word cloud
    #[arg(long, default_value_t = 30)]
    cloud_top_n: usize,
    /// Main jieba dictionary used instead of the bundled one
    #[arg(long, conflicts_with = "user_dict")]
    dict: Option<PathBuf>,
    /// Extra jieba dictionary entries
    #[arg(long)]
    user_dict: Option<PathBuf>,
    /// Disable HMM new-word discovery
    #[arg(long, default_value_t = false)]
    no_hmm: bool,
    /// Merge duplicate and near-duplicate posts before counting
    #[arg(long, default_value_t = false)]
    dedupe: bool,
    #[arg(long, default_value_t = false)]
    no_wordclouds: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze(args),
        Commands::Clean { text, no_digits } => {
            let text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            println!("{}", Cleaner::new(!no_digits).clean(&text));
            Ok(())
        }
    }
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    // configuration problems surface before any file is read
    let range = WordLengthRange::new(args.min_len, args.max_len)?;
    let topic_cfg = TopicConfig::new(&args.topics_column).with_top_n(args.top_topics);
    topic_cfg.validate()?;
    let segmenter = match (&args.dict, &args.user_dict) {
        (Some(path), _) => Segmenter::from_dict_file(path)?,
        (None, Some(path)) => Segmenter::with_user_dict(path)?,
        (None, None) => Segmenter::new(),
    }
    .with_hmm(!args.no_hmm);

    let mut posts = load_posts_from_folder(&args.input, &args.keyword_column)
        .with_context(|| format!("loading posts from {}", args.input.display()))?;

    if args.dedupe {
        let mut cfg = DedupeConfig::new(&args.keyword_column, &args.text_column);
        if posts.has_column(&args.id_column) {
            cfg.id_column = Some(args.id_column.clone());
        }
        cfg.time_column = Some(args.time_column.clone());
        posts = dedupe_posts(&posts, &cfg, &segmenter)?;
    }

    if posts.has_column(&args.topics_column) {
        posts = extract_top_topics(&posts, &topic_cfg)?;
    } else {
        tracing::warn!(column = %args.topics_column, "topics column absent, skipping topic extraction");
    }

    let freq_cfg = FrequencyConfig::new(&args.text_column, &args.keyword_column).with_word_length_range(range);
    let freqs = count_words_by_keyword(&posts, &freq_cfg, &segmenter)?;
    let table = FrequencyTable::top_per_keyword(&freqs, args.table_top_n);

    let paths = OutputPaths::new(&args.output);
    save_frequency_table(&paths, &table).context("writing word frequency table")?;
    save_frequencies_json(&paths, &freqs).context("writing frequencies")?;
    save_dataset_csv(&paths, &posts).context("writing posts")?;
    save_meta(&paths, &MetaFile::new(posts.len(), freqs.len(), range)).context("writing run metadata")?;

    if args.no_wordclouds {
        tracing::info!("word clouds disabled");
    } else if freqs.is_empty() {
        tracing::warn!("no keywords found, skipping word clouds");
    } else {
        let cloud_cfg = WordCloudConfig { top_n: args.cloud_top_n, ..WordCloudConfig::default() };
        write_wordclouds(paths.wordclouds(), &freqs, &cloud_cfg).context("writing word clouds")?;
    }

    tracing::info!(output = %args.output.display(), posts = posts.len(), keywords = freqs.len(), "analysis complete");
    Ok(())
}
