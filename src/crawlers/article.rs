use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use tracing::{info, warn};
use url::Url;

use crate::content::client::PageLoader;
use crate::crawlers::base::Crawler;
use crate::db::store::DocumentStore;
use crate::error::AppError;
use crate::models::documents::{ArticleDocument, UserDocument};

/// Generic article-page strategy: works on any site whose pages reduce to
/// title/description/body text.
pub struct ArticleCrawler {
    store: DocumentStore,
    loader: Arc<dyn PageLoader>,
}

impl ArticleCrawler {
    pub fn new(store: DocumentStore, loader: Arc<dyn PageLoader>) -> Self {
        Self { store, loader }
    }
}

#[async_trait]
impl Crawler for ArticleCrawler {
    async fn extract(&self, link: &str, user: &UserDocument) -> Result<(), AppError> {
        let existing: Option<ArticleDocument> = self.store.find(doc! { "link": link }).await;
        if existing.is_some() {
            info!(url = %link, "Article already exists in the database");
            return Ok(());
        }

        info!(url = %link, "Starting to scrape article");

        let parsed =
            Url::parse(link).map_err(|e| AppError::Crawl(format!("Invalid link {link}: {e}")))?;
        let platform = parsed
            .host_str()
            .ok_or_else(|| AppError::Crawl(format!("Link has no host: {link}")))?
            .to_string();

        let page = self.loader.load(link).await?;

        let mut content = HashMap::new();
        if let Some(title) = page.title {
            content.insert("Title".to_string(), title);
        }
        if let Some(description) = page.description {
            content.insert("Subtitle".to_string(), description);
        }
        content.insert("Content".to_string(), page.text);
        if let Some(language) = page.language {
            content.insert("language".to_string(), language);
        }

        let instance = ArticleDocument::new(
            content,
            link.to_string(),
            platform,
            user.id,
            user.full_name(),
        );
        if self.store.save(instance).await.is_none() {
            warn!(url = %link, "Article was scraped but not persisted");
        }

        info!(url = %link, "Finished scraping article");
        Ok(())
    }
}
