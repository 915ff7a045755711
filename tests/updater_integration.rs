use std::fs;
use std::path::Path;
use std::sync::Arc;

use blog_index::receivers::store_receiver;
use blog_index::updater::Updater;
use blog_index_core::index::Index;
use blog_index_core::metrics::NoopMetrics;
use blog_index_core::store::memory::InMemoryStore;
use blog_index_core::store::ContentStore;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "rust/README.md",
        "<!--\ntitle: Rust\ndescription: Systems programming\npriority: 10\n-->\n# Rust\n",
    );
    write(
        root,
        "rust/ownership.md",
        "<!--\ntitle: Ownership\npublished: 2024-01-10\nseries: basics\n-->\nBody text\n",
    );
    write(
        root,
        "rust/traits.md",
        "<!--\ntitle: Traits\npublished: 2024-02-20\n-->\nBody text\n",
    );
    write(
        root,
        "rust/draft.md",
        "<!--\ntitle: Draft\npublished: 2024-03-01\nhidden: true\n-->\n",
    );
    write(root, "go/README.md", "<!--\ntitle: Go\n-->\n");
    write(root, "notes/scratch.md", "no topic file here");

    tmp
}

fn indexed_updater(root: &Path) -> (Updater, Arc<InMemoryStore>, Arc<Index>) {
    let store = Arc::new(InMemoryStore::new());
    let index = Arc::new(Index::new(Arc::new(NoopMetrics)));
    let updater = Updater::new(root, "README.md")
        .with_receiver(store_receiver(store.clone(), Arc::clone(&index)));
    (updater, store, index)
}

#[test]
fn test_first_cycle_reports_everything_new_once() {
    let tmp = setup_content();
    let updater = Updater::new(tmp.path(), "README.md");

    let delta = updater.update(false).unwrap();
    let mut topics: Vec<&str> = delta.new_topics.iter().map(|t| t.slug.as_str()).collect();
    topics.sort();
    assert_eq!(topics, vec!["go", "rust"]);

    let mut articles: Vec<&str> = delta.new_articles.iter().map(|a| a.uri.as_str()).collect();
    articles.sort();
    assert_eq!(
        articles,
        vec!["/rust/draft", "/rust/ownership", "/rust/traits"]
    );
    assert!(delta.updated_topics.is_empty());
    assert!(delta.updated_articles.is_empty());
}

#[test]
fn test_unchanged_files_are_omitted() {
    let tmp = setup_content();
    let updater = Updater::new(tmp.path(), "README.md");

    updater.update(false).unwrap();
    // Rewriting identical bytes does not count as a change.
    write(
        tmp.path(),
        "rust/traits.md",
        "<!--\ntitle: Traits\npublished: 2024-02-20\n-->\nBody text\n",
    );

    let delta = updater.update(false).unwrap();
    assert!(delta.is_empty());
}

#[test]
fn test_modified_file_is_updated_not_new() {
    let tmp = setup_content();
    let updater = Updater::new(tmp.path(), "README.md");
    updater.update(false).unwrap();

    write(
        tmp.path(),
        "rust/traits.md",
        "<!--\ntitle: Traits, revised\npublished: 2024-02-20\n-->\nBody text\n",
    );
    write(tmp.path(), "rust/lifetimes.md", "<!--\ntitle: Lifetimes\n-->\n");

    let delta = updater.update(false).unwrap();
    assert!(delta.new_topics.is_empty());
    assert!(delta.updated_topics.is_empty());
    assert_eq!(delta.updated_articles.len(), 1);
    assert_eq!(delta.updated_articles[0].title, "Traits, revised");
    assert_eq!(delta.new_articles.len(), 1);
    assert_eq!(delta.new_articles[0].slug, "lifetimes");
}

#[test]
fn test_removed_then_restored_file_is_new_again() {
    let tmp = setup_content();
    let updater = Updater::new(tmp.path(), "README.md");
    updater.update(false).unwrap();

    let path = tmp.path().join("rust/traits.md");
    let saved = fs::read(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert!(updater.update(false).unwrap().is_empty());

    fs::write(&path, saved).unwrap();
    let delta = updater.update(false).unwrap();
    assert_eq!(delta.new_articles.len(), 1);
    assert_eq!(delta.new_articles[0].slug, "traits");
}

#[test]
fn test_headerless_file_uses_file_name_defaults() {
    let tmp = setup_content();
    write(tmp.path(), "rust/Async-Rust.md", "# Async\n\nNo header here.\n");
    let updater = Updater::new(tmp.path(), "README.md");

    let delta = updater.update(false).unwrap();
    let article = delta
        .new_articles
        .iter()
        .find(|a| a.slug == "async-rust")
        .expect("headerless article loaded");
    assert_eq!(article.title, "Async-Rust");
    assert_eq!(article.uri, "/rust/async-rust");
    assert_eq!(article.published_at, 0);
    assert!(article.metadata.is_empty());
}

#[test]
fn test_index_over_store_fed_by_updater() {
    let tmp = setup_content();
    let (updater, store, index) = indexed_updater(tmp.path());

    assert!(index.get_last_indexed_time().is_none());
    updater.update(false).unwrap();
    let first_indexed = index.get_last_indexed_time().expect("indexed after update");

    // Topic without articles is kept.
    let go = index.get_topic_by_identifier("go").unwrap();
    assert_eq!(go.uri, "/go");
    assert!(index.get_all_articles_for_topic("go").is_empty());

    let rust = index.get_topic_by_identifier("rust").unwrap();
    assert_eq!(rust.priority, 10);
    assert_eq!(rust.description, "Systems programming");
    assert_eq!(index.get_all_articles_for_topic("rust").len(), 3);
    assert!(index.get_topic_by_identifier("notes").is_none());

    let ownership = index.get_article_by_identifier("rust", "ownership").unwrap();
    assert_eq!(ownership.metadata.get("series").map(String::as_str), Some("basics"));
    assert_eq!(
        index.get_article_by_uri("/rust/ownership").unwrap().title,
        "Ownership"
    );
    assert_eq!(
        index.get_uri_for_file(&tmp.path().join("rust/traits.md")),
        "/rust/traits"
    );
    assert_eq!(index.get_uri_for_file(&tmp.path().join("rust/README.md")), "/rust");
    assert_eq!(index.get_uri_for_file(&tmp.path().join("missing.md")), "");

    // Hidden and undated articles are excluded, newest first.
    let recent: Vec<String> = index
        .get_recent_articles(10)
        .iter()
        .map(|a| a.slug.clone())
        .collect();
    assert_eq!(recent, vec!["traits", "ownership"]);
    assert_eq!(index.get_recent_articles(1).len(), 1);

    // A quiet cycle leaves the index as it was.
    assert!(updater.update(false).unwrap().is_empty());
    assert_eq!(index.get_last_indexed_time(), Some(first_indexed));

    // An edit to one article keeps the rest of the store in the index.
    write(
        tmp.path(),
        "rust/ownership.md",
        "<!--\ntitle: Ownership and borrowing\npublished: 2024-01-10\n-->\n",
    );
    updater.update(false).unwrap();
    assert_eq!(store.all_articles().unwrap().len(), 3);
    assert_eq!(
        index.get_article_by_identifier("rust", "ownership").unwrap().title,
        "Ownership and borrowing"
    );
    assert!(index.get_article_by_identifier("rust", "traits").is_some());
}

#[test]
fn test_failed_cycle_leaves_index_untouched() {
    let tmp = setup_content();
    let root = tmp.path().join("content");
    fs::rename(tmp.path().join("rust"), tmp.path().join("rust-moved")).unwrap();
    fs::create_dir(&root).unwrap();
    fs::rename(tmp.path().join("rust-moved"), root.join("rust")).unwrap();

    let (updater, _store, index) = indexed_updater(&root);
    updater.update(false).unwrap();
    assert_eq!(index.get_all_topics().len(), 1);

    fs::remove_dir_all(&root).unwrap();
    assert!(updater.update(false).is_err());
    assert_eq!(index.get_all_topics().len(), 1);
    assert!(index.get_article_by_uri("rust/traits").is_some());
}
