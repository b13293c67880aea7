use async_trait::async_trait;
use bson::{doc, Bson, Document};
use domain::store::{
    DeleteResult, DocumentCollection, DocumentStore, InsertOneResult, StoreError, UpdateResult,
};
use domain::value::RecordId;
use futures::TryStreamExt;
use log::info;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::sync::Arc;

const APP_NAME: &str = "discog";

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn record_id(value: &Bson) -> Result<RecordId, StoreError> {
    value
        .as_object_id()
        .map(RecordId::from)
        .ok_or_else(|| StoreError::Codec(format!("unexpected _id: {}", value)))
}

pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// 连接 MongoDB，URI 中带有数据库名时优先使用，否则使用 `database`
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());
        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(database));
        info!("MongoDB client created for database '{}'", db.name());
        Ok(Self { db })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, StoreError> {
        Ok(Arc::new(MongoCollection {
            inner: self.db.collection::<Document>(name),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}

pub struct MongoCollection {
    inner: Collection<Document>,
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, doc: Document) -> Result<InsertOneResult, StoreError> {
        let result = self.inner.insert_one(doc, None).await.map_err(backend)?;
        Ok(InsertOneResult {
            inserted_id: record_id(&result.inserted_id)?,
        })
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        self.inner.find_one(filter, None).await.map_err(backend)
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self.inner.find(filter, None).await.map_err(backend)?;
        cursor.try_collect().await.map_err(backend)
    }

    async fn update_one(
        &self,
        filter: Document,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        let result = self
            .inner
            .update_one(filter, doc! { "$set": set }, None)
            .await
            .map_err(backend)?;
        let upserted_id = result.upserted_id.as_ref().map(record_id).transpose()?;
        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: upserted_id.is_some() as u64,
            upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        let result = self.inner.delete_one(filter, None).await.map_err(backend)?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }
}
