use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use quarry::config::{AppConfig, CrawlSources};
use quarry::content::client::HttpPageLoader;
use quarry::crawlers::article::ArticleCrawler;
use quarry::crawlers::dispatcher::CrawlerDispatcher;
use quarry::crawlers::github::GithubCrawler;
use quarry::db::connection::MongoConnection;
use quarry::models::documents::UserDocument;
use quarry::vcs::client::GitCli;

/// Crawl the links listed in a sources file into the document store.
#[derive(Parser)]
#[command(name = "quarry", version)]
struct Args {
    /// Path to the YAML sources file.
    #[arg(long, default_value = "sources.yaml")]
    sources: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarry=info".into()),
        )
        .init();

    let args = Args::parse();
    let sources = CrawlSources::from_yaml_file(&args.sources).await?;

    let config = AppConfig::from_env()?;
    let connection = MongoConnection::connect(&config).await?;
    let store = connection.store();

    let user: UserDocument = store
        .get_or_create(bson::doc! {
            "first_name": &sources.user.first_name,
            "last_name": &sources.user.last_name,
        })
        .await?;
    tracing::info!(user = %user.full_name(), "Attributing crawled content");

    let mut dispatcher = CrawlerDispatcher::new();
    dispatcher.register_github(Arc::new(GithubCrawler::new(
        store.clone(),
        Arc::new(GitCli),
    )))?;

    let loader = Arc::new(HttpPageLoader::new());
    for domain in &sources.article_domains {
        dispatcher.register(
            domain,
            Arc::new(ArticleCrawler::new(store.clone(), loader.clone())),
        )?;
    }

    let report = dispatcher.crawl_links(&user, &sources.links).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
