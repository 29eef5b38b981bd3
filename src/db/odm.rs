use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// The field name MongoDB reserves for record identity.
pub const MONGO_ID_FIELD: &str = "_id";

/// Contract every persisted document variant implements.
///
/// Variants are plain serde structs; the collection binding and the
/// identity accessor are all the store layer needs beyond that. Equality
/// and hashing of a variant are expected to follow `id` alone.
pub trait NoSqlDocument: Serialize + DeserializeOwned + Send + Sync {
    /// The collection this variant is stored in.
    fn collection_name() -> &'static str;

    /// The unique identifier, generated at construction time.
    fn id(&self) -> Uuid;

    /// Field renames applied when serializing with `by_alias` set.
    fn field_aliases() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Serialization flags for [`to_mongo`].
#[derive(Debug, Clone)]
pub struct ToMongoOptions {
    /// Drop fields whose serialized value is Null (unset optionals).
    pub exclude_unset: bool,
    /// Apply the variant's declared field aliases.
    pub by_alias: bool,
}

impl Default for ToMongoOptions {
    fn default() -> Self {
        Self {
            exclude_unset: false,
            by_alias: true,
        }
    }
}

/// Serialize a document into its store representation.
///
/// The `id` field is renamed to `_id` and stored as the hyphenated UUID
/// string; Uuid-typed fields serialize to strings, so the output mapping
/// never carries an identifier as a non-string value.
pub fn to_mongo<T: NoSqlDocument>(doc: &T, options: &ToMongoOptions) -> Result<Document, AppError> {
    let mut parsed = bson::to_document(doc).map_err(|e| {
        AppError::Schema(format!(
            "Failed to serialize {} document: {e}",
            T::collection_name()
        ))
    })?;

    if options.by_alias {
        for (field, alias) in T::field_aliases() {
            if field != alias {
                if let Some(value) = parsed.remove(*field) {
                    parsed.insert(alias.to_string(), value);
                }
            }
        }
    }

    if options.exclude_unset {
        let unset: Vec<String> = parsed
            .iter()
            .filter(|(_, value)| matches!(value, Bson::Null))
            .map(|(key, _)| key.clone())
            .collect();
        for key in unset {
            parsed.remove(&key);
        }
    }

    if !parsed.contains_key(MONGO_ID_FIELD) && parsed.remove("id").is_some() {
        parsed.insert(MONGO_ID_FIELD, doc.id().to_string());
    }

    Ok(parsed)
}

/// Reconstruct a typed document from its store representation.
pub fn from_mongo<T: NoSqlDocument>(mut document: Document) -> Result<T, AppError> {
    if document.is_empty() {
        return Err(AppError::Validation("Document is empty".into()));
    }

    let id = match document.remove(MONGO_ID_FIELD) {
        Some(Bson::String(raw)) => Uuid::parse_str(&raw)
            .map_err(|e| AppError::Schema(format!("Invalid document id '{raw}': {e}")))?,
        Some(other) => {
            return Err(AppError::Schema(format!(
                "Document id is not a string: {other}"
            )))
        }
        None => return Err(AppError::Schema("Document is missing an id".into())),
    };

    for (field, alias) in T::field_aliases() {
        if field != alias {
            if let Some(value) = document.remove(*alias) {
                document.insert(field.to_string(), value);
            }
        }
    }

    document.insert("id", id.to_string());

    bson::from_document(document).map_err(|e| {
        AppError::Schema(format!(
            "Malformed {} record: {e}",
            T::collection_name()
        ))
    })
}
