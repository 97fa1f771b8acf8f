use pagesnap_core::{
    archive_key, is_valid_key, validate_capture_url, Artifact, ArtifactLinks, UrlRejection,
    KEY_HASH_LEN,
};
use pretty_assertions::assert_eq;

#[test]
fn key_is_deterministic_and_filesystem_safe() {
    let first = archive_key("https://example.com");
    let second = archive_key("https://example.com");
    assert_eq!(first, second);
    assert!(first.starts_with("https___example_com--"));
    assert!(first
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    assert!(is_valid_key(&first));
}

#[test]
fn key_is_pinned_to_sha256_of_the_url() {
    // Keys name directories on disk; they must not change between runs or builds.
    assert_eq!(
        archive_key("https://example.com"),
        "https___example_com--100680ad546ce6a5"
    );
}

#[test]
fn urls_that_sanitize_alike_get_distinct_keys() {
    let dotted = archive_key("https://a.b/c");
    let dashed = archive_key("https://a-b/c");
    let (dotted_name, _) = dotted.rsplit_once("--").unwrap();
    let (dashed_name, _) = dashed.rsplit_once("--").unwrap();
    assert_eq!(dotted_name, dashed_name);
    assert_ne!(dotted, dashed);
}

#[test]
fn non_ascii_characters_are_replaced() {
    let key = archive_key("https://例え.jp/ページ");
    assert!(key.is_ascii());
    assert!(is_valid_key(&key));
}

#[test]
fn foreign_and_traversal_names_are_not_keys() {
    assert!(!is_valid_key(".."));
    assert!(!is_valid_key("../etc--0123456789abcdef"));
    assert!(!is_valid_key(".staging-abc"));
    assert!(!is_valid_key("https___example_com"));
    assert!(!is_valid_key(&format!("name--{}", "A".repeat(KEY_HASH_LEN))));
    assert!(!is_valid_key("name--0123"));
}

#[test]
fn capture_url_validation() {
    assert_eq!(validate_capture_url(""), Err(UrlRejection::Empty));
    assert_eq!(validate_capture_url("   "), Err(UrlRejection::Empty));
    assert!(matches!(
        validate_capture_url("not a url"),
        Err(UrlRejection::Invalid(_))
    ));
    assert_eq!(
        validate_capture_url("ftp://example.com/file"),
        Err(UrlRejection::UnsupportedScheme("ftp".to_string()))
    );
    let url = validate_capture_url("  https://example.com/page  ").unwrap();
    assert_eq!(url.as_str(), "https://example.com/page");
}

#[test]
fn artifact_links_are_prefix_relative() {
    let links = ArtifactLinks::for_key("/cloned/", "k--0011223344556677");
    assert_eq!(links.full, "/cloned/k--0011223344556677/full.html");
    assert_eq!(links.simple, "/cloned/k--0011223344556677/simple.html");
    assert_eq!(links.info, "/cloned/k--0011223344556677/info.json");

    assert_eq!(Artifact::from_file_name("info.json"), Some(Artifact::Info));
    assert_eq!(Artifact::from_file_name("other.txt"), None);
}
