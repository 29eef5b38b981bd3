use bson::Document;
use futures::TryStreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::db::odm::{from_mongo, to_mongo, NoSqlDocument, ToMongoOptions, MONGO_ID_FIELD};
use crate::error::AppError;

/// Generic CRUD over every document variant, implemented once against a
/// schemaless MongoDB database.
///
/// Collections are addressed by each variant's `collection_name()`; records
/// go through the `to_mongo`/`from_mongo` contract, so the store only ever
/// sees `bson::Document` values.
#[derive(Clone)]
pub struct DocumentStore {
    database: mongodb::Database,
}

impl DocumentStore {
    pub fn new(database: mongodb::Database) -> Self {
        Self { database }
    }

    fn collection<T: NoSqlDocument>(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::collection_name())
    }

    /// Insert one document. A rejected write is logged and swallowed;
    /// callers get `None` and must check for it.
    pub async fn save<T: NoSqlDocument>(&self, doc: T) -> Option<T> {
        let mongo = match to_mongo(&doc, &ToMongoOptions::default()) {
            Ok(mongo) => mongo,
            Err(e) => {
                error!(collection = T::collection_name(), "Failed to serialize document: {e}");
                return None;
            }
        };

        debug!(collection = T::collection_name(), id = %doc.id(), "Inserting document");
        match self.collection::<T>().insert_one(mongo).await {
            Ok(_) => Some(doc),
            Err(e) => {
                error!(collection = T::collection_name(), "Failed to insert document: {e}");
                None
            }
        }
    }

    /// Look up at most one record, keeping the distinction between
    /// "not found" and "the operation failed".
    pub async fn try_find<T: NoSqlDocument>(
        &self,
        filter: Document,
    ) -> Result<Option<T>, AppError> {
        let record = self
            .collection::<T>()
            .find_one(filter)
            .await
            .map_err(|e| AppError::OperationFailed(e.to_string()))?;

        record.map(from_mongo).transpose()
    }

    /// Look up at most one record. A failed operation collapses to `None`
    /// after logging, same as no match.
    pub async fn find<T: NoSqlDocument>(&self, filter: Document) -> Option<T> {
        match self.try_find(filter).await {
            Ok(found) => found,
            Err(e) => {
                error!(collection = T::collection_name(), "Failed to retrieve document: {e}");
                None
            }
        }
    }

    /// All matches for a filter, with per-record deserialization failures
    /// kept as errors.
    pub async fn try_bulk_find<T: NoSqlDocument>(
        &self,
        filter: Document,
    ) -> Result<Vec<T>, AppError> {
        let mut cursor = self
            .collection::<T>()
            .find(filter)
            .await
            .map_err(|e| AppError::OperationFailed(e.to_string()))?;

        let mut documents = Vec::new();
        while let Some(record) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::OperationFailed(e.to_string()))?
        {
            documents.push(from_mongo(record)?);
        }

        Ok(documents)
    }

    /// All matches for a filter. Records that fail to deserialize are
    /// dropped with a log line; a failed operation collapses to an empty
    /// list.
    pub async fn bulk_find<T: NoSqlDocument>(&self, filter: Document) -> Vec<T> {
        let mut cursor = match self.collection::<T>().find(filter).await {
            Ok(cursor) => cursor,
            Err(e) => {
                error!(collection = T::collection_name(), "Failed to retrieve documents: {e}");
                return Vec::new();
            }
        };

        let mut documents = Vec::new();
        loop {
            match cursor.try_next().await {
                Ok(Some(record)) => match from_mongo(record) {
                    Ok(doc) => documents.push(doc),
                    Err(e) => {
                        warn!(collection = T::collection_name(), "Dropping malformed record: {e}");
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    error!(collection = T::collection_name(), "Failed to retrieve documents: {e}");
                    return Vec::new();
                }
            }
        }

        documents
    }

    /// Insert every document in one batched operation. Returns `false` on
    /// any write error; there is no partial-success reporting.
    pub async fn bulk_insert<T: NoSqlDocument>(&self, documents: Vec<T>) -> bool {
        let mut records = Vec::with_capacity(documents.len());
        for doc in &documents {
            match to_mongo(doc, &ToMongoOptions::default()) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(collection = T::collection_name(), "Failed to serialize document: {e}");
                    return false;
                }
            }
        }

        match self.collection::<T>().insert_many(records).await {
            Ok(_) => true,
            Err(e) => {
                error!(collection = T::collection_name(), "Failed to insert documents: {e}");
                false
            }
        }
    }

    /// Return the matching document, creating it from the filter fields if
    /// absent. Lookup failures propagate: the caller needs to know whether
    /// "not found" was determinate before anything is inserted.
    ///
    /// Find-then-insert is not transactional; two concurrent callers can
    /// both miss and both insert. Single-writer ingestion tolerates the
    /// duplicate.
    pub async fn get_or_create<T: NoSqlDocument>(&self, filter: Document) -> Result<T, AppError> {
        if let Some(found) = self.try_find(filter.clone()).await? {
            debug!(collection = T::collection_name(), "Document found");
            return Ok(found);
        }

        let mut record = filter;
        record.insert(MONGO_ID_FIELD, Uuid::new_v4().to_string());
        let instance: T = from_mongo(record)?;

        self.save(instance)
            .await
            .ok_or_else(|| AppError::Write("Failed to insert new document".into()))
    }
}
