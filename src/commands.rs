//! Implementations behind the `blogidx` subcommands.
//!
//! The one-shot commands (`scan`, `topics`, `recent`, `get`, `uri`) run a
//! single refresh cycle into an in-memory store and answer from the
//! resulting index. [`run_daemon`] keeps the index fresh until Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use blog_index_core::delta::Delta;
use blog_index_core::index::Index;
use blog_index_core::metrics::Metrics;
use blog_index_core::store::memory::InMemoryStore;

use crate::config::Config;
use crate::metrics::LogMetrics;
use crate::reader::FileReader;
use crate::receivers::{revalidate_receiver, store_receiver, Revalidator};
use crate::scheduler::{spawn_refresh_loop, DailySchedule};
use crate::updater::Updater;

/// Everything a running indexer holds on to.
pub struct Service {
    pub updater: Arc<Updater>,
    pub store: Arc<InMemoryStore>,
    pub index: Arc<Index>,
    pub revalidator: Option<Arc<Revalidator>>,
}

impl Service {
    /// Wire an updater, store and index from `config`. The index stays empty
    /// until the first update.
    pub fn new(config: &Config) -> Self {
        let metrics: Arc<dyn Metrics> = Arc::new(LogMetrics);
        let store = Arc::new(InMemoryStore::new());
        let index = Arc::new(Index::new(Arc::clone(&metrics)));
        let revalidator = config
            .site
            .clone()
            .map(|site| Arc::new(Revalidator::new(site)));

        let mut updater = Updater::from_config(config)
            .with_reader(Arc::new(FileReader::new(Arc::clone(&metrics))))
            .with_metrics(metrics)
            .with_receiver(store_receiver(store.clone(), Arc::clone(&index)));
        if let Some(revalidator) = &revalidator {
            updater.register_receiver(revalidate_receiver(Arc::clone(revalidator)));
        }

        Self {
            updater: Arc::new(updater),
            store,
            index,
            revalidator,
        }
    }

    /// Run one cycle on the blocking pool.
    pub async fn update(&self, force_fresh: bool) -> Result<Delta> {
        let updater = Arc::clone(&self.updater);
        let delta = tokio::task::spawn_blocking(move || updater.update(force_fresh))
            .await
            .context("update task failed")??;
        Ok(delta)
    }
}

async fn load_index(config: &Config) -> Result<Arc<Index>> {
    let service = Service::new(config);
    service.update(false).await?;
    Ok(service.index)
}

pub async fn run_scan(config: &Config) -> Result<()> {
    let service = Service::new(config);
    let delta = service.update(false).await?;

    println!("Scanned {}", config.content.path.display());
    println!(
        "  topics:   {} new, {} updated",
        delta.new_topics.len(),
        delta.updated_topics.len()
    );
    println!(
        "  articles: {} new, {} updated",
        delta.new_articles.len(),
        delta.updated_articles.len()
    );
    println!("  files tracked: {}", service.updater.tracked_files());
    Ok(())
}

pub async fn run_topics(config: &Config) -> Result<()> {
    let index = load_index(config).await?;
    let snapshot = index.snapshot();

    let mut topics = snapshot.topics();
    topics.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.slug.cmp(&b.slug)));

    if topics.is_empty() {
        println!("No topics found.");
        return Ok(());
    }
    for topic in topics {
        println!(
            "{:<24} {:<28} {:>4}  {}",
            topic.slug,
            topic.uri,
            snapshot.articles_for_topic(&topic.slug).len(),
            topic.title
        );
    }
    Ok(())
}

pub async fn run_recent(config: &Config, limit: usize) -> Result<()> {
    let index = load_index(config).await?;
    let articles = index.get_recent_articles(limit);

    if articles.is_empty() {
        println!("No published articles.");
        return Ok(());
    }
    for article in articles {
        let date = chrono::DateTime::from_timestamp(article.published_at, 0)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{}  {:<40} {}", date, article.uri, article.title);
    }
    Ok(())
}

pub async fn run_get(config: &Config, topic_slug: &str, article_slug: Option<&str>) -> Result<()> {
    let index = load_index(config).await?;

    let json = match article_slug {
        Some(slug) => match index.get_article_by_identifier(topic_slug, slug) {
            Some(article) => serde_json::to_string_pretty(&*article)?,
            None => bail!("article not found: {}/{}", topic_slug, slug),
        },
        None => match index.get_topic_by_identifier(topic_slug) {
            Some(topic) => serde_json::to_string_pretty(&*topic)?,
            None => bail!("topic not found: {}", topic_slug),
        },
    };
    println!("{}", json);
    Ok(())
}

pub async fn run_uri(config: &Config, file: &Path) -> Result<()> {
    let index = load_index(config).await?;

    let mut uri = index.get_uri_for_file(file);
    if uri.is_empty() && file.is_relative() {
        uri = index.get_uri_for_file(&config.content.path.join(file));
    }
    if uri.is_empty() {
        bail!("no topic or article loaded from {}", file.display());
    }
    println!("{}", uri);
    Ok(())
}

/// Initial forced update, then periodic refreshes and a daily reindex until
/// Ctrl-C.
pub async fn run_daemon(config: &Config) -> Result<()> {
    let reindex_at = config.refresh.reindex_time()?;
    let service = Service::new(config);

    let delta = service.update(true).await?;
    log::info!(
        "initial load: {} topics, {} articles",
        delta.topic_count(),
        delta.article_count()
    );

    let refresh = spawn_refresh_loop(Arc::clone(&service.updater), config.refresh.interval());

    let store = Arc::clone(&service.store);
    let index = Arc::clone(&service.index);
    let revalidator = service.revalidator.clone();
    let daily = DailySchedule::start(reindex_at, move || {
        log::info!("running scheduled reindex");
        if let Err(e) = index.reindex_from_store(store.as_ref()) {
            log::error!("scheduled reindex failed: {:#}", e);
        }
        if let Some(revalidator) = &revalidator {
            if let Err(e) = revalidator.revalidate("/") {
                log::error!("failed to invalidate site cache: {:#}", e);
            }
        }
    });

    println!(
        "Serving {} ({} topics, {} articles). Press Ctrl-C to stop.",
        config.content.path.display(),
        service.index.snapshot().topic_count(),
        service.index.snapshot().article_count()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    log::info!("shutting down");
    refresh.abort();
    daily.shutdown();
    Ok(())
}
