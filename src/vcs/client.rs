use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;

/// Trait for cloning a remote repository into a local directory.
///
/// Abstracted as a trait so tests can materialize a fake checkout without
/// shelling out to git.
#[async_trait]
pub trait RepoCloner: Send + Sync {
    /// Clone `link` into `target`. The caller owns `target` and its
    /// cleanup; a non-zero exit is an error.
    async fn clone_repo(&self, link: &str, target: &Path) -> Result<(), AppError>;
}

/// `git clone` via the system git binary.
pub struct GitCli;

#[async_trait]
impl RepoCloner for GitCli {
    async fn clone_repo(&self, link: &str, target: &Path) -> Result<(), AppError> {
        debug!(url = %link, "Cloning repository");
        let status = tokio::process::Command::new("git")
            .arg("clone")
            .arg(link)
            .current_dir(target)
            .status()
            .await
            .map_err(|e| AppError::Crawl(format!("Failed to run git: {e}")))?;

        if !status.success() {
            return Err(AppError::Crawl(format!(
                "git clone of {link} exited with {status}"
            )));
        }

        Ok(())
    }
}
