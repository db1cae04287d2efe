use corpus::ingest::load_posts_from_folder;
use corpus::persist::{load_frequencies_json, load_meta, save_dataset_csv, save_frequencies_json, save_meta, MetaFile, OutputPaths};
use corpus::wordcloud::{write_wordclouds, WordCloudConfig};
use corpus::{count_words_by_keyword, Error, FrequencyConfig, KeywordFrequencies, Segmenter, Value, WordLengthRange};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_folder_with_keywords_from_file_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("%23电动车%23.csv"), "id,微博正文,点赞数\n1,我想买电动车,3\n2,电动车续航不错,\n").unwrap();
    fs::write(dir.path().join("新能源.csv"), "id,微博正文,话题\n3,新能源是趋势,\"环保,科技\"\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("skip.csv"), "id\n9\n").unwrap();

    let data = load_posts_from_folder(dir.path(), "关键词").unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data.columns(), ["id", "微博正文", "点赞数", "关键词", "话题"]);
    assert_eq!(data.get(0, "关键词"), Some(&Value::from("电动车")));
    assert_eq!(data.get(2, "关键词"), Some(&Value::from("新能源")));
    assert_eq!(data.get(2, "点赞数"), Some(&Value::Null));
    assert_eq!(data.get(2, "话题"), Some(&Value::from("环保,科技")));
}

#[test]
fn missing_or_empty_folder_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(load_posts_from_folder(dir.path(), "关键词"), Err(Error::NoInput(_))));
    assert!(matches!(
        load_posts_from_folder(dir.path().join("absent"), "关键词"),
        Err(Error::NoInput(_))
    ));
}

#[test]
fn jsonl_files_are_loaded_too() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("旅游.jsonl"),
        "{\"id\": \"a\", \"text\": \"去云南旅游\"}\n{\"id\": \"b\", \"text\": \"云南风景很美\"}\n",
    )
    .unwrap();
    let data = load_posts_from_folder(dir.path(), "keyword").unwrap();
    assert_eq!(data.len(), 2);
    let freqs = count_words_by_keyword(&data, &FrequencyConfig::new("text", "keyword"), Segmenter::shared()).unwrap();
    assert_eq!(freqs.get("旅游").and_then(|c| c.get("云南")), Some(&2));
}

#[test]
fn outputs_round_trip() {
    let dir = tempdir().unwrap();
    let paths = OutputPaths::new(dir.path().join("out"));

    let freqs: KeywordFrequencies = [(
        "A".to_string(),
        [("苹果".to_string(), 2u64), ("喜欢".to_string(), 1)].into_iter().collect(),
    )]
    .into_iter()
    .collect();
    save_frequencies_json(&paths, &freqs).unwrap();
    assert_eq!(load_frequencies_json(&paths).unwrap(), freqs);

    let meta = MetaFile::new(2, 1, WordLengthRange::default());
    save_meta(&paths, &meta).unwrap();
    let loaded = load_meta(&paths).unwrap();
    assert_eq!(loaded, meta);
    assert_eq!(loaded.word_length_range, (2, 4));

    let mut data = corpus::Dataset::new(["id", "topics"]).unwrap();
    data.push_row(vec!["1".into(), Value::List(vec!["a".into(), "b".into()])]).unwrap();
    save_dataset_csv(&paths, &data).unwrap();
    assert_eq!(fs::read_to_string(paths.posts()).unwrap(), "id,topics\n1,\"a,b\"\n");

    let written = write_wordclouds(paths.wordclouds(), &freqs, &WordCloudConfig::default()).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("wordcloud_00.svg"));
    let index = fs::read_to_string(paths.wordclouds().join("wordclouds.json")).unwrap();
    assert!(index.contains("\"keyword\": \"A\""));
    assert!(matches!(
        write_wordclouds(paths.wordclouds(), &KeywordFrequencies::default(), &WordCloudConfig::default()),
        Err(Error::NoInput(_))
    ));
}
