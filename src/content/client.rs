use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::AppError;

/// A fetched page, reduced to plain text plus the metadata the article
/// crawler records.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub text: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
}

/// Trait for page acquisition.
///
/// Abstracted as a trait so tests can substitute a canned page without
/// network access.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Fetch the page at `link` and reduce it to text + metadata.
    async fn load(&self, link: &str) -> Result<LoadedPage, AppError>;
}

/// HTTP implementation of [`PageLoader`].
pub struct HttpPageLoader {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpPageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: "quarry/0.3".to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, link: &str) -> Result<LoadedPage, AppError> {
        debug!(url = %link, "Fetching page");
        let response = self
            .client
            .get(link)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| AppError::Crawl(format!("Request to {link} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Crawl(format!("HTTP {status} fetching {link}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Crawl(format!("Failed to read body of {link}: {e}")))?;

        Ok(LoadedPage {
            title: extract_title(&html),
            description: extract_description(&html),
            language: extract_language(&html),
            text: html_to_text(&html),
        })
    }
}

fn extract_title(html: &str) -> Option<String> {
    let pattern = Regex::new(r"(?s)<title[^>]*>(.*?)</title>").ok()?;
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_description(html: &str) -> Option<String> {
    let pattern = Regex::new(
        r#"<meta[^>]*name\s*=\s*["']description["'][^>]*content\s*=\s*["']([^"']*)["']"#,
    )
    .ok()?;
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty())
}

fn extract_language(html: &str) -> Option<String> {
    let pattern = Regex::new(r#"<html[^>]*lang\s*=\s*["']([^"']+)["']"#).ok()?;
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Reduce an HTML page to readable plain text.
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    // Drop non-content blocks first
    let script_pattern = Regex::new(r"(?s)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = Regex::new(r"(?s)<style[^>]*>.*?</style>").unwrap();
    text = script_pattern.replace_all(&text, "").to_string();
    text = style_pattern.replace_all(&text, "").to_string();

    // Block-level tags become line breaks
    let p_pattern = Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap();
    let br_pattern = Regex::new(r"<br\s*/?>").unwrap();
    let heading_pattern = Regex::new(r"(?s)<h[1-6][^>]*>(.*?)</h[1-6]>").unwrap();
    text = p_pattern.replace_all(&text, "$1\n\n").to_string();
    text = br_pattern.replace_all(&text, "\n").to_string();
    text = heading_pattern.replace_all(&text, "$1\n\n").to_string();

    // Remove remaining tags
    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();
    text = tag_pattern.replace_all(&text, "").to_string();

    // Decode the common entities
    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    // Collapse runs of blank lines
    let multi_newline = Regex::new(r"\n{3,}").unwrap();
    text = multi_newline.replace_all(&text, "\n\n").to_string();

    text.trim().to_string()
}
