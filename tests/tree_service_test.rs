//! Tests for TreeService

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use leaftree::application::services::TreeService;
use leaftree::application::{ApplicationError, NamedForest};
use leaftree::domain::DomainError;
use leaftree::infrastructure::RealFileSystem;

const SITE: &str = r#"
[[leaves]]
name = "home"

[[leaves.children]]
name = "about"
position = 2.0

[[leaves.children]]
name = "blog"
position = 1.5

[[leaves.children.children]]
name = "post"
position = 0.5

[[leaves]]
name = "archive"
position = 0.25
"#;

/// Helper to create a temp forest document for testing
fn create_document(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write forest document");
    path
}

fn service() -> TreeService {
    TreeService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_document_when_querying_depth_then_counts_ancestors() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    assert_eq!(service().depth(&path, "home").unwrap(), 0);
    assert_eq!(service().depth(&path, "blog").unwrap(), 1);
    assert_eq!(service().depth(&path, "post").unwrap(), 2);
}

#[test]
fn given_document_when_listing_ancestors_then_root_first() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    let ancestors = service().ancestors(&path, "post").unwrap();

    assert_eq!(ancestors, vec!["home".to_string(), "blog".to_string()]);
    assert!(service().ancestors(&path, "archive").unwrap().is_empty());
}

#[test]
fn given_unknown_name_when_querying_then_leaf_not_found() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    let err = service().depth(&path, "missing").unwrap_err();

    assert!(matches!(err, ApplicationError::LeafNotFound(name) if name == "missing"));
}

#[test]
fn given_missing_file_when_loading_then_document_not_found() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.toml");

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::DocumentNotFound(p) if p == path));
}

#[test]
fn given_duplicate_names_when_loading_then_rejected() {
    let temp = TempDir::new().unwrap();
    let path = create_document(
        &temp,
        "dup.toml",
        r#"
[[leaves]]
name = "a"

[[leaves.children]]
name = "a"
"#,
    );

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::DuplicateName(name) if name == "a"));
}

#[test]
fn given_malformed_toml_when_loading_then_document_error() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "bad.toml", "[[leaves]\nname = ");

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Document { .. }));
}

#[test]
fn given_negative_position_in_document_when_loading_then_ignored() {
    let temp = TempDir::new().unwrap();
    let path = create_document(
        &temp,
        "neg.toml",
        r#"
[[leaves]]
name = "a"
position = -1.0

[[leaves]]
name = "b"
position = -0.5
"#,
    );

    let named = service().load(&path).unwrap();

    let a = named.lookup("a").unwrap();
    let b = named.lookup("b").unwrap();
    assert_eq!(named.forest.position(a).unwrap(), 0.0);
    assert_eq!(named.forest.position(b).unwrap(), -0.5);
}

#[test]
fn given_document_when_rendering_then_tree_with_positions() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    let rendered = service().render(&path, true).unwrap();

    assert!(rendered.contains("home [0]"));
    assert!(rendered.contains("blog [1.5]"));
    assert!(rendered.contains("post [0.5]"));
    assert!(rendered.contains("archive [0.25]"));

    let plain = service().render(&path, false).unwrap();
    assert!(plain.contains("about"));
    assert!(!plain.contains('['));
}

#[test]
fn given_document_when_asking_next_position_then_counts_group_without_writing() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    assert_eq!(service().next_position(&path, Some("home")).unwrap(), 2);
    assert_eq!(service().next_position(&path, Some("post")).unwrap(), 0);
    assert_eq!(service().next_position(&path, None).unwrap(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SITE);
}

#[test]
fn given_fractional_positions_when_compacting_then_document_rewritten_in_order() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    let report = service().compact(&path, false).unwrap();

    assert_eq!(report.leaves, 5);
    // archive, blog, about and post; home already sits at 0
    assert_eq!(report.moved, 4);
    // roots, home's children, blog's children
    assert_eq!(report.groups, 3);
    assert!(report.written);

    let named = service().load(&path).unwrap();
    let position = |name: &str| named.forest.position(named.lookup(name).unwrap()).unwrap();
    assert_eq!(position("home"), 0.0);
    assert_eq!(position("archive"), 1.0);
    assert_eq!(position("blog"), 0.0);
    assert_eq!(position("about"), 1.0);
    assert_eq!(position("post"), 0.0);

    // child-set order from the document is preserved
    let home = named.lookup("home").unwrap();
    let about = named.lookup("about").unwrap();
    let blog = named.lookup("blog").unwrap();
    assert_eq!(named.forest.children(home).unwrap(), &[about, blog]);
}

#[test]
fn given_compacted_document_when_compacting_again_then_nothing_written() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);
    service().compact(&path, false).unwrap();
    let compacted = std::fs::read_to_string(&path).unwrap();

    let report = service().compact(&path, false).unwrap();

    assert_eq!(report.moved, 0);
    assert!(!report.written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), compacted);
}

#[test]
fn given_dry_run_when_compacting_then_reports_moves_but_keeps_file() {
    let temp = TempDir::new().unwrap();
    let path = create_document(&temp, "site.toml", SITE);

    let report = service().compact(&path, true).unwrap();

    assert!(report.moved > 0);
    assert!(!report.written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SITE);
}

#[test]
fn given_named_forest_when_mutated_then_self_parent_surfaces_as_domain_error() {
    let mut named = NamedForest::parse(SITE).unwrap();
    let blog = named.lookup("blog").unwrap();

    let err: ApplicationError = named
        .forest
        .set_parent(blog, Some(blog))
        .map(|_| ())
        .unwrap_err()
        .into();

    assert!(matches!(err, ApplicationError::Domain(DomainError::SelfParent(id)) if id == blog));
}
