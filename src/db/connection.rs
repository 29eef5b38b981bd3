use bson::doc;
use tracing::info;

use crate::config::AppConfig;
use crate::db::store::DocumentStore;
use crate::error::AppError;

/// The shared MongoDB connection, established once at process start and
/// cloned into every store-backed component.
///
/// `mongodb::Client` handles are internally shared, so clones reuse the
/// same session pool; there is no teardown, the connection lives for the
/// process lifetime.
#[derive(Clone)]
pub struct MongoConnection {
    client: mongodb::Client,
    database: mongodb::Database,
}

impl MongoConnection {
    /// Connect using the configured host/port/credentials/database.
    ///
    /// The store is a boot-time dependency: a `ping` is issued immediately
    /// so an unreachable store fails fast with [`AppError::Connection`]
    /// instead of surfacing later as per-operation errors. No retry.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let uri = config.mongo_uri()?;
        info!(host = %config.mongo_host, port = config.mongo_port, "Connecting to MongoDB");

        let client = mongodb::Client::with_uri_str(&uri)
            .await
            .map_err(|e| AppError::Connection(format!("Couldn't connect to the database: {e}")))?;
        let database = client.database(&config.database_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Connection(format!("Couldn't reach the database: {e}")))?;

        info!(database = %config.database_name, "Connected to MongoDB");
        Ok(Self { client, database })
    }

    /// Wrap an already-connected client (useful for tests / DI).
    pub fn from_client(client: mongodb::Client, database_name: &str) -> Self {
        let database = client.database(database_name);
        Self { client, database }
    }

    pub fn client(&self) -> &mongodb::Client {
        &self.client
    }

    pub fn database(&self) -> &mongodb::Database {
        &self.database
    }

    /// A [`DocumentStore`] bound to this connection's database.
    pub fn store(&self) -> DocumentStore {
        DocumentStore::new(self.database.clone())
    }
}
