use crate::value::RecordId;
use async_trait::async_trait;
use bson::Document;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Connection(String),
    #[error("unsupported connection string: {0}")]
    UnsupportedUrl(String),
    #[error("E11000 duplicate key error collection: {collection} dup key: {{ _id: {id} }}")]
    DuplicateKey { collection: String, id: String },
    #[error("performing an update on the path '_id' would modify the immutable field '_id'")]
    ImmutableId,
    #[error("{0}")]
    Codec(String),
    #[error("{0}")]
    Backend(String),
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

/// insert_one 的结果描述，字段名与驱动返回值一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOneResult {
    #[serde(rename = "InsertedID")]
    pub inserted_id: RecordId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateResult {
    #[serde(rename = "MatchedCount")]
    pub matched_count: u64,
    #[serde(rename = "ModifiedCount")]
    pub modified_count: u64,
    #[serde(rename = "UpsertedCount")]
    pub upserted_count: u64,
    #[serde(rename = "UpsertedID")]
    pub upserted_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "DeletedCount")]
    pub deleted_count: u64,
}

/// A named set of documents. Filters are top-level field equality matches,
/// `set` is the body of a `$set` update.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    async fn insert_one(&self, doc: Document) -> Result<InsertOneResult, StoreError>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError>;

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError>;

    async fn update_one(&self, filter: Document, set: Document)
        -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
