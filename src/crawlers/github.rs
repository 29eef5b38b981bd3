use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::crawlers::base::Crawler;
use crate::db::store::DocumentStore;
use crate::error::AppError;
use crate::models::documents::{RepositoryDocument, UserDocument};
use crate::vcs::client::RepoCloner;

/// Default ignore set: VCS bookkeeping, manifests, lockfiles, images.
pub const DEFAULT_IGNORE: &[&str] = &[".git", ".toml", ".lock", ".png"];

/// Source-code-repository strategy: clones the repository into an
/// ephemeral working directory and stores the kept files as one document.
pub struct GithubCrawler {
    store: DocumentStore,
    cloner: Arc<dyn RepoCloner>,
    ignore: Vec<String>,
}

impl GithubCrawler {
    pub fn new(store: DocumentStore, cloner: Arc<dyn RepoCloner>) -> Self {
        Self {
            store,
            cloner,
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the default ignore set.
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }
}

/// A relative path is skipped when it starts or ends with any entry of the
/// ignore set.
fn is_ignored(ignore: &[String], relative_path: &str) -> bool {
    ignore
        .iter()
        .any(|entry| relative_path.starts_with(entry) || relative_path.ends_with(entry))
}

/// The repository name is the last path segment of the link.
fn repo_name(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[async_trait]
impl Crawler for GithubCrawler {
    async fn extract(&self, link: &str, user: &UserDocument) -> Result<(), AppError> {
        let existing: Option<RepositoryDocument> = self.store.find(doc! { "link": link }).await;
        if existing.is_some() {
            info!(url = %link, "Repository already exists in the database");
            return Ok(());
        }

        info!(url = %link, "Starting to scrape GitHub repository");

        let name = repo_name(link)
            .ok_or_else(|| AppError::Crawl(format!("Cannot derive repository name from {link}")))?
            .to_string();

        // Removed on every exit path below, including the error ones.
        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::Crawl(format!("Failed to create working directory: {e}")))?;

        self.cloner.clone_repo(link, workdir.path()).await?;

        // The clone lands in a single subdirectory named after the repo.
        let mut repo_path = None;
        let mut entries = tokio::fs::read_dir(workdir.path())
            .await
            .map_err(|e| AppError::Crawl(format!("Failed to list working directory: {e}")))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Crawl(format!("Failed to list working directory: {e}")))?
        {
            if entry.path().is_dir() {
                repo_path = Some(entry.path());
                break;
            }
        }

        let Some(repo_path) = repo_path else {
            // Empty clone directory: log and bail without persisting.
            error!(url = %link, "Failed to clone repository {name}, the directory is empty");
            return Ok(());
        };

        info!(url = %link, "Repository {name} cloned successfully");

        let mut tree = BTreeMap::new();
        for entry in WalkDir::new(&repo_path).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&repo_path)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            if is_ignored(&self.ignore, &relative) {
                continue;
            }
            match tokio::fs::read(entry.path()).await {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes).replace(' ', "");
                    tree.insert(relative, text);
                }
                Err(e) => {
                    warn!(path = %relative, "Skipping unreadable file: {e}");
                }
            }
        }

        let instance = RepositoryDocument::new(
            name,
            tree,
            link.to_string(),
            "github".to_string(),
            user.id,
            user.full_name(),
        );
        if self.store.save(instance).await.is_none() {
            warn!(url = %link, "Repository was scraped but not persisted");
        }

        info!(url = %link, "Finished scraping GitHub repository");
        Ok(())
    }
}
