use corpus::dedupe::{dedupe_posts, DedupeConfig};
use corpus::{Dataset, Error, Segmenter, Value};

fn dataset(rows: &[[&str; 5]]) -> Dataset {
    let mut data = Dataset::new(["id", "关键词", "微博正文", "发布时间", "点赞数"]).unwrap();
    for row in rows {
        data.push_row(row.iter().map(|c| Value::from(*c)).collect()).unwrap();
    }
    data
}

fn config() -> DedupeConfig {
    let mut cfg = DedupeConfig::new("关键词", "微博正文");
    cfg.id_column = Some("id".into());
    cfg.time_column = Some("发布时间".into());
    cfg
}

#[test]
fn exact_duplicates_merge_into_earliest() {
    let data = dataset(&[
        ["1", "A", "电动车续航真不错！", "2024-03-02 10:00", "5"],
        ["2", "A", "电动车续航真不错😊", "2024-03-01 09:00", "3"],
        ["3", "B", "电动车续航真不错！", "2024-03-03 10:00", "1"],
        ["1", "A", "重复的编号", "2024-03-04 10:00", "100"],
    ]);
    let out = dedupe_posts(&data, &config(), Segmenter::shared()).unwrap();

    assert_eq!(out.len(), 2);
    // row 2 is earlier, so it survives with the summed likes
    assert_eq!(out.get(0, "id"), Some(&Value::from("2")));
    assert_eq!(out.get(0, "点赞数"), Some(&Value::from("8")));
    // same text under another keyword is not a duplicate
    assert_eq!(out.get(1, "关键词"), Some(&Value::from("B")));
    assert_eq!(out.get(1, "点赞数"), Some(&Value::from("1")));
}

#[test]
fn near_duplicates_merge_above_threshold() {
    let mut cfg = config();
    cfg.similarity_threshold = 0.5;
    let data = dataset(&[
        ["1", "A", "北京今天的天气非常好适合出去玩", "2024-03-01 09:00", "2"],
        ["2", "A", "北京今天的天气非常好适合出门玩", "2024-03-01 10:00", "4"],
        ["3", "A", "上海明天下雨记得带伞出门", "2024-03-01 11:00", "1"],
        ["4", "A", "短文本", "2024-03-01 12:00", "1"],
    ]);
    let out = dedupe_posts(&data, &cfg, Segmenter::shared()).unwrap();

    let ids: Vec<&str> = (0..out.len()).map(|i| out.get(i, "id").and_then(Value::as_text).unwrap()).collect();
    assert_eq!(ids, vec!["1", "3", "4"]);
    assert_eq!(out.get(0, "点赞数"), Some(&Value::from("6")));
}

#[test]
fn near_duplicates_merge_on_character_similarity() {
    // two swapped words keep the word sets apart, but 18 of 20 chars match
    let data = dataset(&[
        ["1", "A", "今天北京的天气非常好我们一起出去玩吧大家", "2024-03-01 09:00", "2"],
        ["2", "A", "今天北京的天气非常棒我们一起出去玩吧大伙", "2024-03-01 10:00", "4"],
    ]);
    let out = dedupe_posts(&data, &config(), Segmenter::shared()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.get(0, "id"), Some(&Value::from("1")));
    assert_eq!(out.get(0, "点赞数"), Some(&Value::from("6")));
}

#[test]
fn unpadded_times_pick_the_earliest_post() {
    let data = dataset(&[
        ["1", "A", "电动车续航真不错", "2024/3/10 9:00", "1"],
        ["2", "A", "电动车续航真不错", "2024/3/9 18:00", "1"],
    ]);
    let out = dedupe_posts(&data, &config(), Segmenter::shared()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.get(0, "id"), Some(&Value::from("2")));
    assert_eq!(out.get(0, "点赞数"), Some(&Value::from("2")));
}

#[test]
fn rejects_bad_configuration() {
    let data = dataset(&[["1", "A", "文本", "", "0"]]);
    let mut cfg = config();
    cfg.similarity_threshold = 0.0;
    assert!(matches!(dedupe_posts(&data, &cfg, Segmenter::shared()), Err(Error::InvalidThreshold(_))));

    let cfg = DedupeConfig::new("keyword", "微博正文");
    let err = dedupe_posts(&data, &cfg, Segmenter::shared()).unwrap_err();
    assert!(err.is_config());
}
