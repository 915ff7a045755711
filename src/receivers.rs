//! Stock receivers wired into the [`Updater`](crate::updater::Updater).
//!
//! | Receiver | Effect |
//! |----------|--------|
//! | [`store_receiver`] | Persist the delta, then reindex from the full store |
//! | [`revalidate_receiver`] | Ask the blog front-end to drop cached pages for changed URIs |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use blog_index_core::index::Index;
use blog_index_core::store::ContentStore;

use crate::config::SiteConfig;
use crate::updater::Receiver;

/// Write every changed entity into `store` and, when anything changed,
/// rebuild `index` from the store's complete contents.
pub fn store_receiver(store: Arc<dyn ContentStore>, index: Arc<Index>) -> Receiver {
    Box::new(move |topics, articles| {
        for topic in topics {
            if let Err(e) = store.store_topic(topic.clone()) {
                log::error!("failed to store topic {}: {:#}", topic.slug, e);
            }
        }
        for article in articles {
            if let Err(e) = store.store_article(article.clone()) {
                log::error!("failed to store article {}: {:#}", article.uri, e);
            }
        }

        if topics.is_empty() && articles.is_empty() {
            return;
        }
        log::info!(
            "reindexing after storing {} topics and {} articles",
            topics.len(),
            articles.len()
        );
        if let Err(e) = index.reindex_from_store(store.as_ref()) {
            log::error!("reindex failed, serving previous index: {:#}", e);
        }
    })
}

/// Client for the blog front-end's revalidation endpoint.
pub struct Revalidator {
    site: SiteConfig,
    // Built on first use so it is created on the thread that runs receivers,
    // outside any async context.
    client: OnceLock<reqwest::blocking::Client>,
}

impl Revalidator {
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            client: OnceLock::new(),
        }
    }

    /// Revalidation endpoint, without the query string.
    pub fn endpoint(&self) -> String {
        format!("{}/api/revalidate", self.site.host.trim_end_matches('/'))
    }

    /// Invalidate the cached page at `path` (a URI such as `/rust/traits`).
    pub fn revalidate(&self, path: &str) -> Result<()> {
        log::info!("invalidating site cache for {}", path);
        let client = self.client.get_or_init(reqwest::blocking::Client::new);
        client
            .post(self.endpoint())
            .query(&[("path", path), ("secret", self.site.secret.as_str())])
            .send()
            .with_context(|| format!("revalidate request for {} failed", path))?
            .error_for_status()
            .with_context(|| format!("revalidate for {} rejected", path))?;
        Ok(())
    }
}

/// Revalidate the URI of every changed topic and article.
///
/// The first delivery is the initial load of an empty cache and is skipped,
/// as are empty deltas. Failures are logged and do not stop the remaining
/// URIs.
pub fn revalidate_receiver(revalidator: Arc<Revalidator>) -> Receiver {
    let first_receive = AtomicBool::new(true);
    Box::new(move |topics, articles| {
        if first_receive.swap(false, Ordering::SeqCst) {
            log::info!("first receive, not clearing site cache");
            return;
        }

        let uris = topics
            .iter()
            .map(|t| t.uri.as_str())
            .chain(articles.iter().map(|a| a.uri.as_str()));
        for uri in uris {
            if let Err(e) = revalidator.revalidate(uri) {
                log::error!("failed to invalidate site cache for {}: {:#}", uri, e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_index_core::entity::{article_from_headers, topic_from_headers};
    use blog_index_core::headers::Headers;
    use blog_index_core::metrics::NoopMetrics;
    use blog_index_core::store::memory::InMemoryStore;
    use std::path::Path;

    #[test]
    fn test_store_receiver_accumulates_and_reindexes() {
        let store = Arc::new(InMemoryStore::new());
        let index = Arc::new(Index::new(Arc::new(NoopMetrics)));
        let receiver = store_receiver(store.clone(), Arc::clone(&index));

        let rust = topic_from_headers(&Headers::new(), Path::new("/c/rust/README.md"));
        let a = article_from_headers(&Headers::new(), Path::new("/c/rust/a.md"), "rust");
        receiver(&[rust], &[a]);
        assert!(index.get_last_indexed_time().is_some());
        assert_eq!(index.get_all_articles_for_topic("rust").len(), 1);

        // A later delta only carries the change; the index still covers everything.
        let b = article_from_headers(&Headers::new(), Path::new("/c/rust/b.md"), "rust");
        receiver(&[], &[b]);
        assert_eq!(index.get_all_topics().len(), 1);
        assert_eq!(index.get_all_articles_for_topic("rust").len(), 2);
        assert_eq!(store.article_count(), 2);
    }

    #[test]
    fn test_empty_delta_does_not_reindex() {
        let store = Arc::new(InMemoryStore::new());
        let index = Arc::new(Index::new(Arc::new(NoopMetrics)));
        let receiver = store_receiver(store, Arc::clone(&index));

        receiver(&[], &[]);
        assert!(index.get_last_indexed_time().is_none());
    }

    #[test]
    fn test_revalidate_endpoint() {
        let revalidator = Revalidator::new(SiteConfig {
            host: "https://blog.example.com/".to_string(),
            secret: "s".to_string(),
        });
        assert_eq!(
            revalidator.endpoint(),
            "https://blog.example.com/api/revalidate"
        );
    }

    #[test]
    fn test_revalidate_receiver_skips_first_and_empty_deltas() {
        let revalidator = Arc::new(Revalidator::new(SiteConfig {
            host: "http://127.0.0.1:9".to_string(),
            secret: "s".to_string(),
        }));
        let receiver = revalidate_receiver(Arc::clone(&revalidator));
        let topic = topic_from_headers(&Headers::new(), Path::new("/c/rust/README.md"));

        receiver(&[topic], &[]);
        assert!(revalidator.client.get().is_none());

        receiver(&[], &[]);
        assert!(revalidator.client.get().is_none());
    }
}
