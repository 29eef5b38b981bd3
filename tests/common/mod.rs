use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use quarry::db::connection::MongoConnection;
use quarry::db::store::DocumentStore;

/// Holds a running MongoDB container and a store wired to it.
///
/// The container is kept alive for as long as this struct lives and is
/// stopped and cleaned up automatically when dropped. Every test gets its
/// own container, so collection counts are exact.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub connection: MongoConnection,
    pub store: DocumentStore,
}

impl TestEnv {
    /// Spin up a MongoDB container and connect to it.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);

        let client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let connection = MongoConnection::from_client(client, "quarry_test");
        let store = connection.store();

        Self {
            _mongo: mongo_container,
            connection,
            store,
        }
    }
}
