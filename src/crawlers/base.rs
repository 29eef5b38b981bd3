use async_trait::async_trait;

use crate::error::AppError;
use crate::models::documents::UserDocument;

/// A site-specific extraction strategy bound to one document variant.
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Extract the content behind `link` and persist at most one new
    /// document, attributed to `user`.
    ///
    /// An already-crawled link is a no-op, not an error. Nothing is
    /// persisted unless extraction completed fully.
    async fn extract(&self, link: &str, user: &UserDocument) -> Result<(), AppError>;
}
