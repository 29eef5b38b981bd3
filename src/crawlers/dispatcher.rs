use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::crawlers::base::Crawler;
use crate::error::AppError;
use crate::models::documents::UserDocument;

/// Maps URLs to registered crawler strategies by domain and aggregates
/// batch run statistics.
///
/// Registration and lookup both key on the normalized domain (lowercased
/// host with any leading `www.` stripped), so scheme and `www` variants of
/// the same site resolve to one strategy.
#[derive(Default)]
pub struct CrawlerDispatcher {
    crawlers: HashMap<String, Arc<dyn Crawler>>,
}

/// Summary of one batch run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CrawlReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Per-domain breakdown of the same counts.
    pub metadata: HashMap<String, DomainStats>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DomainStats {
    pub successful: usize,
    pub total: usize,
}

impl CrawlerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `crawler` with the domain of `pattern` (any URL on the
    /// target site works as a pattern).
    pub fn register(&mut self, pattern: &str, crawler: Arc<dyn Crawler>) -> Result<(), AppError> {
        let domain = normalize_domain(pattern)?;
        self.crawlers.insert(domain, crawler);
        Ok(())
    }

    /// Convenience: wire `crawler` to the GitHub domain.
    pub fn register_github(&mut self, crawler: Arc<dyn Crawler>) -> Result<(), AppError> {
        self.register("https://github.com", crawler)
    }

    /// Resolve the strategy for `link`. An unknown domain is an explicit
    /// error, never a silent default.
    pub fn get_strategy(&self, link: &str) -> Result<Arc<dyn Crawler>, AppError> {
        let domain = normalize_domain(link)?;
        self.crawlers
            .get(&domain)
            .cloned()
            .ok_or(AppError::UnregisteredDomain(domain))
    }

    /// Run the matched strategy for every link. A failure on one link is
    /// counted and logged; it never aborts the batch.
    pub async fn crawl_links(&self, user: &UserDocument, links: &[String]) -> CrawlReport {
        let mut report = CrawlReport::default();

        for link in links {
            report.total += 1;
            let domain = normalize_domain(link).unwrap_or_else(|_| link.clone());
            let stats = report.metadata.entry(domain).or_default();
            stats.total += 1;

            let outcome = match self.get_strategy(link) {
                Ok(crawler) => crawler.extract(link, user).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    report.successful += 1;
                    stats.successful += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(url = %link, "Failed to crawl: {e}");
                }
            }
        }

        info!(
            total = report.total,
            successful = report.successful,
            failed = report.failed,
            "Crawl batch finished"
        );
        report
    }
}

fn normalize_domain(url: &str) -> Result<String, AppError> {
    let parsed =
        Url::parse(url).map_err(|e| AppError::Crawl(format!("Invalid URL {url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::Crawl(format!("URL has no host: {url}")))?;
    let host = host.to_ascii_lowercase();
    Ok(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts extracts; fails on links containing "broken".
    #[derive(Default)]
    struct StubCrawler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Crawler for StubCrawler {
        async fn extract(&self, link: &str, _user: &UserDocument) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if link.contains("broken") {
                return Err(AppError::Crawl("boom".into()));
            }
            Ok(())
        }
    }

    fn user() -> UserDocument {
        UserDocument::new("Ada".to_string(), "Lovelace".to_string())
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("https://example.com").unwrap(), "example.com");
        assert_eq!(
            normalize_domain("https://www.Example.COM/path?q=1").unwrap(),
            "example.com"
        );
        assert!(normalize_domain("not a url").is_err());
    }

    #[test]
    fn test_registered_domain_resolves() {
        let mut dispatcher = CrawlerDispatcher::new();
        let crawler: Arc<dyn Crawler> = Arc::new(StubCrawler::default());
        dispatcher.register("https://example.com", crawler.clone()).unwrap();

        let resolved = dispatcher
            .get_strategy("https://www.example.com/anything")
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &crawler));
    }

    #[test]
    fn test_unregistered_domain_is_an_error() {
        let dispatcher = CrawlerDispatcher::new();
        let err = dispatcher.get_strategy("https://unknown.org/x").err().unwrap();
        assert!(matches!(err, AppError::UnregisteredDomain(_)));
    }

    #[tokio::test]
    async fn test_batch_report_accounting() {
        let mut dispatcher = CrawlerDispatcher::new();
        dispatcher
            .register("https://example.com", Arc::new(StubCrawler::default()))
            .unwrap();

        let links = vec![
            "https://example.com/one".to_string(),
            "https://example.com/broken".to_string(),
            "https://www.example.com/two".to_string(),
            "https://unknown.org/ignored".to_string(),
        ];
        let report = dispatcher.crawl_links(&user(), &links).await;

        assert_eq!(report.total, 4);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 2);

        let example = &report.metadata["example.com"];
        assert_eq!(example.total, 3);
        assert_eq!(example.successful, 2);
        let unknown = &report.metadata["unknown.org"];
        assert_eq!(unknown.total, 1);
        assert_eq!(unknown.successful, 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_batch() {
        let mut dispatcher = CrawlerDispatcher::new();
        let crawler = Arc::new(StubCrawler::default());
        dispatcher
            .register("https://example.com", crawler.clone())
            .unwrap();

        let links = vec![
            "https://example.com/broken".to_string(),
            "https://example.com/after".to_string(),
        ];
        let report = dispatcher.crawl_links(&user(), &links).await;

        assert_eq!(crawler.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.successful, 1);
    }
}
