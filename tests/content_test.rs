use std::fs;
use std::path::Path;

use blogctl::core::scaffold::{new_post, publish};
use blogctl::core::{check, ContentStore, GeneratorFlags, Severity};
use blogctl::models::Config;
use blogctl::utils;
use chrono::{TimeZone, Utc};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// 一个包含已发布、未发布、未来日期和草稿文章的站点
fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "_posts/2015-06-01-either-and-futures.md",
        "---\ntitle: Either and futures\ndate: 2015-06-01 09:00:00 +0200\ncategories: [fp]\n---\n\n```scala\nval x = 1\n```\n",
    );
    write(
        root,
        "_posts/2016-03-20-async-railway.md",
        "---\ntitle: Async railway\ndate: 2016-03-20 10:00:00 +0100\npublished: false\n---\nwip\n",
    );
    write(
        root,
        "_posts/2099-01-01-from-the-future.md",
        "---\ntitle: From the future\ndate: 2099-01-01 00:00:00 +0000\n---\nlater\n",
    );
    write(root, "_drafts/rx-testing.md", "---\ntitle: Testing Rx\n---\nidea\n");
    write(root, "_posts/notes.txt", "ignored, not a content file\n");
    dir
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn production_selection_excludes_unpublished_future_and_drafts() {
    let dir = site();
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    assert_eq!(store.posts.len(), 4);
    assert!(store.issues.is_empty());

    let titles: Vec<&str> = store
        .select(&GeneratorFlags::published(), now())
        .into_iter()
        .map(|p| p.title())
        .collect();
    assert_eq!(titles, vec!["Either and futures"]);
}

#[test]
fn preview_selection_includes_everything() {
    let dir = site();
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    let selected = store.select(&GeneratorFlags::preview(), now());
    assert_eq!(selected.len(), 4);

    // 新的在前，没有日期的草稿排在最后
    assert_eq!(selected[0].title(), "From the future");
    assert_eq!(selected[3].title(), "Testing Rx");
}

#[test]
fn unpublished_posts_follow_the_unpublished_flag() {
    let dir = site();
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    let unpublished: Vec<_> = store.posts.iter().filter(|p| !p.is_published()).collect();
    assert_eq!(unpublished.len(), 1);

    let only_unpublished = GeneratorFlags {
        unpublished: true,
        ..GeneratorFlags::default()
    };
    assert!(only_unpublished.admits(unpublished[0], now()));
    assert!(!GeneratorFlags::published().admits(unpublished[0], now()));
}

#[test]
fn clean_site_passes_check() {
    let dir = site();
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    let report = check(&store);
    assert!(!report.has_errors(), "{:?}", report.findings);
    assert_eq!(report.warnings(), 0);
    assert_eq!(report.files, 4);
}

#[test]
fn check_reports_date_mismatch_and_bad_files() {
    let dir = site();
    let root = dir.path();
    write(
        root,
        "_posts/2016-03-21-async-railway-v2.md",
        "---\ntitle: Async railway\ndate: 2016-03-22 10:00:00 +0100\n---\n\n```\nno language\n```\n",
    );
    write(root, "_posts/undated.md", "---\ntitle: Undated\n---\n");
    write(root, "_posts/2016-04-01-no-matter.md", "no front matter here\n");

    let store = ContentStore::load(&Config::default(), root).unwrap();
    assert_eq!(store.issues.len(), 2);

    let report = check(&store);
    assert_eq!(report.files, 7);

    let messages_for = |name: &str| -> Vec<(Severity, String)> {
        report
            .findings
            .iter()
            .filter(|f| f.path.file_name().and_then(|n| n.to_str()) == Some(name))
            .map(|f| (f.severity, f.message.clone()))
            .collect()
    };

    let v2 = messages_for("2016-03-21-async-railway-v2.md");
    assert!(v2.iter().any(|(s, m)| *s == Severity::Error && m.contains("2016-03-22")));
    assert!(v2.iter().any(|(s, m)| *s == Severity::Warning && m.contains("代码块")));
    // 重复的标题只给出警告
    assert!(v2.iter().any(|(s, m)| *s == Severity::Warning && m.contains("重复")));
    assert!(messages_for("2016-03-20-async-railway.md")
        .iter()
        .all(|(s, _)| *s == Severity::Warning));

    assert_eq!(messages_for("undated.md").len(), 1);
    assert_eq!(messages_for("2016-04-01-no-matter.md").len(), 1);
    assert_eq!(report.errors(), 3);
}

#[test]
fn date_near_midnight_compares_in_written_offset() {
    let dir = tempfile::tempdir().unwrap();
    // UTC 下是 2016-03-19，但按书写时区是 2016-03-20
    write(
        dir.path(),
        "_posts/2016-03-20-late.md",
        "---\ntitle: Late\ndate: 2016-03-20 00:30:00 +0100\n---\n",
    );
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    assert!(store.posts[0].date_matches_file_name());
    assert!(!check(&store).has_errors());
}

#[test]
fn new_post_starts_unpublished_and_can_be_published() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.author = Some("Jane Doe".to_string());
    let date = utils::parse_date("2016-03-20 10:00:00 +0100").unwrap();

    let path = new_post(&config, dir.path(), "Async \"Railway\" Oriented Programming", date).unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("2016-03-20-async-railway-oriented-programming.md")
    );

    let store = ContentStore::load(&config, dir.path()).unwrap();
    assert!(store.issues.is_empty(), "{:?}", store.issues);
    let post = &store.posts[0];
    assert_eq!(post.title(), "Async \"Railway\" Oriented Programming");
    assert_eq!(post.front_matter.author.as_deref(), Some("Jane Doe"));
    assert!(!post.is_published());
    assert!(post.date_matches_file_name());

    // 不覆盖已有文章
    assert!(new_post(&config, dir.path(), "Async \"Railway\" Oriented Programming", date).is_err());

    assert!(publish(&path).unwrap());
    assert!(!publish(&path).unwrap());
    let store = ContentStore::load(&config, dir.path()).unwrap();
    assert!(store.posts[0].is_published());
}

#[test]
fn custom_scaffold_is_used() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "scaffolds/post.md",
        "---\ntitle: {{ title }}\ndate: {{ date }}\nlayout: post\npublished: false\n---\n# {{ title }}\n",
    );
    let date = utils::parse_date("2017-05-05 08:00:00 +0000").unwrap();
    let path = new_post(&Config::default(), dir.path(), "Testing APIs", date).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("layout: post"));
    assert!(text.contains("# Testing APIs"));
}

#[test]
fn new_post_title_survives_backslashes_and_colons() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.author = Some(r"O'Brien \ Co".to_string());
    let date = utils::parse_date("2018-02-03 12:00:00 +0000").unwrap();

    for title in [r"Paths like C:\temp", "Either: a primer"] {
        new_post(&config, dir.path(), title, date).unwrap();
    }

    let store = ContentStore::load(&config, dir.path()).unwrap();
    assert!(store.issues.is_empty(), "{:?}", store.issues);
    let mut titles: Vec<&str> = store.posts.iter().map(|p| p.title()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Either: a primer", r"Paths like C:\temp"]);
    assert!(store
        .posts
        .iter()
        .all(|p| p.front_matter.author.as_deref() == Some(r"O'Brien \ Co")));
}

#[test]
fn numeric_front_matter_values_are_kept_as_text() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "_posts/2016-01-02-hello.md",
        "---\ntitle: 1984\nauthor: 42\ndate: 2016-01-02\ncategories: 2016\ntags: [scala, 2016, true, 1.5]\n---\nhi\n",
    );
    let store = ContentStore::load(&Config::default(), dir.path()).unwrap();
    assert!(store.issues.is_empty(), "{:?}", store.issues);

    let post = &store.posts[0];
    assert_eq!(post.title(), "1984");
    assert_eq!(post.front_matter.author.as_deref(), Some("42"));
    assert_eq!(post.front_matter.categories, vec!["2016"]);
    assert_eq!(post.front_matter.tags, vec!["scala", "2016", "true", "1.5"]);
    assert!(!check(&store).has_errors());
    assert_eq!(store.select(&GeneratorFlags::published(), now()).len(), 1);
}
