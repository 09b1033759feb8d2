//! Unit tests for core Folio functionality.
//!
//! Tests the parser, projection, catalog and configuration in isolation,
//! without running a discovery pass.

use folio::error::Result;
use folio::parser::{parse_priority, parse_tag_list};
use folio::prelude::*;

mod common;
use common::{metadata_text, setup_test_dirs};

fn record(id: &str, priority: Option<u32>, tags: &[&str]) -> WorkRecord {
    WorkRecord {
        id: id.to_string(),
        priority,
        title: format!("Work {}", id),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

// --- Parser ---

#[test]
fn test_parse_end_to_end_example() {
    let text = "\
--- common ---
ID: alpha
Priority: 2
Role: designer
Tags: Logo, Branding
--- English ---
Client: Acme Co
Title: Alpha Project
Description: A redesign effort.
";
    let record = parse_work_text(text).project(Language::English);
    assert_eq!(record.id, "alpha");
    assert_eq!(record.priority, Some(2));
    assert_eq!(record.role, Some(Role::Designer));
    assert_eq!(record.role.as_ref().map(|r| r.slug()), Some("designer"));
    assert_eq!(record.tags, vec!["Logo", "Branding"]);
    assert_eq!(record.client, "Acme Co");
    assert_eq!(record.title, "Alpha Project");
    assert_eq!(record.description, "A redesign effort.");
    assert_eq!(record.language, Language::English);
    assert!(record.storage_location.is_none());
}

#[test]
fn test_parse_is_idempotent() {
    let text = metadata_text(Some("alpha"), Some("3"), "ロゴ, Web", "Alpha");
    assert_eq!(parse_work_text(&text), parse_work_text(&text));
}

#[test]
fn test_parse_japanese_document() {
    let text = metadata_text(Some("alpha"), Some("1"), "ロゴ、ブランディング", "Alpha");
    let parsed = parse_work_text(&text);
    assert_eq!(parsed.japanese.client, "アクメ社");
    assert_eq!(parsed.japanese.title, "Alpha (ja)");
    assert_eq!(parsed.japanese.description, "日本語の紹介文。");
    assert_eq!(parsed.english.title, "Alpha");
    assert_eq!(parsed.tags, vec!["ロゴ", "ブランディング"]);

    let japanese = parsed.project(Language::Japanese);
    let english = parsed.project(Language::English);
    assert_eq!(japanese.tags, english.tags);
    assert_eq!(japanese.id, english.id);
    assert_ne!(japanese.title, english.title);
}

#[test]
fn test_parse_section_isolation() {
    let text = "\
Client: before any section
--- 日本語 ---
クライアント: 正しい会社
Client: wrong section
--- Notes ---
Title: unknown section
--- English ---
Title: Right Title
";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.japanese.client, "正しい会社");
    assert_eq!(parsed.english.client, "");
    assert_eq!(parsed.english.title, "Right Title");
    assert_eq!(parsed.japanese.title, "");
    // A field label of another language is never description text
    assert_eq!(parsed.japanese.description, "");
}

#[test]
fn test_parse_common_role_wins() {
    let text = "\
--- 共通 ---
Role: designer
--- 日本語 ---
役割: illustrator
--- English ---
Role: engineer
";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.project(Language::Japanese).role, Some(Role::Designer));
    assert_eq!(parsed.project(Language::English).role, Some(Role::Designer));
}

#[test]
fn test_parse_language_role_fallback() {
    let text = "\
--- English ---
Role: Art Director
--- 日本語 ---
役割: ceramicist
";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.project(Language::English).role, Some(Role::ArtDirector));
    assert_eq!(
        parsed.project(Language::Japanese).role,
        Some(Role::Other("ceramicist".to_string()))
    );
}

#[test]
fn test_parse_description_synthesis() {
    let text = "\
--- 共通 ---
ID: 4
--- 日本語 ---
作品名: 四
ロゴとサインの制作。
・社内メモ
  展示会向けの案件。
Title: not description
--- English ---
Title: Four
Logo and signage.

Made for a trade show.
";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.japanese.description, "ロゴとサインの制作。 展示会向けの案件。");
    assert_eq!(parsed.english.description, "Logo and signage. Made for a trade show.");
}

#[test]
fn test_parse_explicit_description_wins_over_free_text() {
    let text = "\
--- English ---
Free text line.
Description: Explicit.
";
    assert_eq!(parse_work_text(text).english.description, "Explicit.");
}

#[test]
fn test_parse_empty_description_is_kept_empty() {
    let text = "\
--- 日本語 ---
紹介文:
社内向けの覚え書き。
--- English ---
Description:
Internal note.
";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.japanese.description, "");
    assert_eq!(parsed.english.description, "");
}

#[test]
fn test_parse_malformed_priority_is_unset() {
    for value in ["high", "0", "-3", "2.5", ""] {
        let text = format!("--- 共通 ---\nID: x\nPriority: {}\n", value);
        let parsed = parse_work_text(&text);
        assert_eq!(parsed.priority, None, "priority {:?}", value);
        assert_eq!(parsed.id.as_deref(), Some("x"));
    }
    assert_eq!(parse_priority(" 7 "), Some(7));
}

#[test]
fn test_parse_empty_input() {
    assert_eq!(parse_work_text(""), ParsedWork::default());
    assert_eq!(parse_work_text("\n  \n"), ParsedWork::default());

    let record = parse_work_text("").project(Language::Japanese);
    assert_eq!(record.id, "");
    assert!(record.tags.is_empty());
    assert!(record.role.is_none());
}

#[test]
fn test_parse_tolerates_bom_and_full_width_colon() {
    let text = "\u{feff}--- 共通 ---\r\nID：beta\r\nタグ：ロゴ\r\n";
    let parsed = parse_work_text(text);
    assert_eq!(parsed.id.as_deref(), Some("beta"));
    assert_eq!(parsed.tags, vec!["ロゴ"]);
}

#[test]
fn test_parse_tag_list() {
    assert_eq!(
        parse_tag_list("ロゴ、 ブランディング, , Web ,"),
        vec!["ロゴ", "ブランディング", "Web"]
    );
    assert!(parse_tag_list("  ").is_empty());
    assert_eq!(parse_tag_list("Logo"), vec!["Logo"]);
}

// --- Types ---

#[test]
fn test_role_parsing() {
    assert_eq!(Role::parse("designer"), Role::Designer);
    assert_eq!(Role::parse(" Art Director "), Role::ArtDirector);
    assert_eq!(Role::parse("art_director"), Role::ArtDirector);
    assert_eq!(Role::parse("ENGINEER"), Role::Engineer);
    assert_eq!(Role::parse("Potter"), Role::Other("Potter".to_string()));
    assert_eq!(Role::ArtDirector.slug(), "art-director");
    assert_eq!(Role::ArtDirector.to_string(), "Art Director");
    assert_ne!(
        Role::Designer.description(Language::Japanese),
        Role::Designer.description(Language::English)
    );
}

#[test]
fn test_language_parsing() -> Result<()> {
    assert_eq!("en".parse::<Language>()?, Language::English);
    assert_eq!("Japanese".parse::<Language>()?, Language::Japanese);
    assert!("fr".parse::<Language>().is_err());
    assert_eq!(Language::from_locale("en-US"), Language::English);
    assert_eq!(Language::from_locale("ja-JP"), Language::Japanese);
    assert_eq!(Language::English.other(), Language::Japanese);
    assert_eq!(Language::default(), Language::Japanese);
    Ok(())
}

// --- Catalog ---

#[test]
fn test_catalog_featured_ordering() {
    let catalog = Catalog::new(vec![
        record("a", Some(3), &[]),
        record("b", None, &[]),
        record("c", Some(1), &[]),
        record("d", Some(3), &[]),
        record("e", Some(2), &[]),
    ]);
    let ids: Vec<&str> = catalog.featured().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "e", "a", "d"]);
}

#[test]
fn test_catalog_tags_and_counts() {
    let catalog = Catalog::new(vec![
        record("a", None, &["ロゴ", "Web"]),
        record("b", None, &["Web", "Web"]),
        record("c", None, &["パッケージ"]),
    ]);
    assert_eq!(catalog.tags(), vec!["ロゴ", "Web", "パッケージ"]);

    let counts = catalog.tag_counts();
    assert_eq!(counts.get("Web"), Some(&2));
    assert_eq!(counts.get("ロゴ"), Some(&1));
    assert_eq!(counts.get("パッケージ"), Some(&1));
    assert_eq!(catalog.count_for("Web"), 2);
}

#[test]
fn test_catalog_filter_and_get() {
    let catalog = Catalog::new(vec![
        record("a", None, &["ロゴ"]),
        record("b", None, &["Web"]),
        record("c", None, &["ロゴ", "Web"]),
    ]);
    assert_eq!(catalog.filter(&TagFilter::All).len(), 3);
    let logos: Vec<&str> = catalog
        .filter(&TagFilter::Tag("ロゴ".to_string()))
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(logos, vec!["a", "c"]);
    assert!(catalog.filter(&TagFilter::Tag("none".to_string())).is_empty());
    assert_eq!(catalog.get("b").map(|r| r.title.as_str()), Some("Work b"));
    assert!(catalog.get("z").is_none());
}

#[test]
fn test_translate_tag() {
    assert_eq!(translate_tag("ロゴ", Language::English), "Logo");
    assert_eq!(translate_tag("ロゴ", Language::Japanese), "ロゴ");
    assert_eq!(translate_tag("キャラクターデザイン", Language::English), "Character Design");
    assert_eq!(translate_tag("陶芸", Language::English), "陶芸");
}

// --- Test support ---

#[tokio::test]
async fn test_test_dirs_are_removed_on_drop() {
    let test_dirs = setup_test_dirs("removed_on_drop").await;
    let base_dir = test_dirs.base_dir.clone();
    assert!(test_dirs.source_dir.is_dir());
    drop(test_dirs);
    assert!(!base_dir.exists());
}

// --- Configuration ---

#[test]
fn test_folio_config_builder_defaults() -> Result<()> {
    let config = FolioConfig::builder().build()?;
    assert_eq!(config.location_prefix, "works-");
    assert_eq!(config.numeric_probe_limit, 20);
    assert_eq!(config.max_consecutive_misses, 1);
    assert_eq!(config.numbering_preference, NumberingStyle::TwoDigit);
    assert_eq!(config.metadata_file_names.first().map(String::as_str), Some("0.txt"));
    assert_eq!(config.image_extensions.first().map(String::as_str), Some("webp"));
    assert!(!config.include_video);
    assert!(config.max_concurrent_probes >= 1);
    Ok(())
}

#[test]
fn test_folio_config_builder_validation() {
    let result = FolioConfig::builder().named_location_regex_str("(").build();
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Invalid named_location_regex")
    );

    let result = FolioConfig::builder().max_consecutive_misses(0u32).build();
    assert!(result.unwrap_err().to_string().contains("max_consecutive_misses"));

    let result = FolioConfig::builder().location_prefix("").build();
    assert!(result.unwrap_err().to_string().contains("location_prefix"));

    let result = FolioConfig::builder().metadata_file_names(Vec::<String>::new()).build();
    assert!(result.is_err());

    // An empty prefix is fine when a custom pattern does the matching
    let result = FolioConfig::builder()
        .location_prefix("")
        .named_location_regex_str(r"^project_(.+)$")
        .build();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_folio_config_preflight_check() -> Result<()> {
    let test_dirs = setup_test_dirs("preflight_check").await;
    let config = FolioConfig::builder().build()?;

    assert!(
        config
            .preflight_check(&SourceTarget::Dir(test_dirs.source_dir.clone()))
            .is_ok()
    );

    let result = config.preflight_check(&SourceTarget::Dir(test_dirs.source_dir.join("missing")));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("does not exist"));

    assert!(
        config
            .preflight_check(&SourceTarget::Http("https://example.com/images".to_string()))
            .is_ok()
    );
    assert!(
        config
            .preflight_check(&SourceTarget::Http("ftp://example.com/".to_string()))
            .is_err()
    );
    Ok(())
}
