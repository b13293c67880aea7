use crate::error::AppError;
use domain::entity::{id_filter, Entity, ListFilter};
use domain::store::{DocumentCollection, InsertOneResult, StoreError, UpdateResult};
use domain::value::RecordId;
use log::{debug, info, warn};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

const NO_DOCUMENTS: &str = "no documents in result";
const DEADLINE_EXCEEDED: &str = "context deadline exceeded";

/// Create/get/update/delete/list for one entity type against its collection.
///
/// Every method issues exactly one store call, bounded by `timeout`.
pub struct ResourceService<T> {
    collection: Arc<dyn DocumentCollection>,
    timeout: Duration,
    _marker: PhantomData<T>,
}

impl<T: Entity> ResourceService<T> {
    pub fn new(collection: Arc<dyn DocumentCollection>, timeout: Duration) -> Self {
        Self {
            collection,
            timeout,
            _marker: PhantomData,
        }
    }

    /// 新建记录，ID 由服务端生成，请求体中的 `_id` 被忽略
    pub async fn create(&self, body: &[u8]) -> Result<InsertOneResult, AppError> {
        let entity: T = serde_json::from_slice(body)?;
        let id = RecordId::generate();
        let doc = entity.to_document(&id)?;
        let result = self
            .bounded("insert", self.collection.insert_one(doc))
            .await?;
        info!("{} created: {}", T::KIND, result.inserted_id);
        Ok(result)
    }

    pub async fn get(&self, id: &str) -> Result<T, AppError> {
        let record_id = RecordId::parse(id)?;
        let doc = self
            .bounded("find_one", self.collection.find_one(id_filter(&record_id)))
            .await?
            .ok_or_else(|| AppError::InternalError(NO_DOCUMENTS.to_string()))?;
        let entity = T::from_document(doc)?;
        // 解码后再次确认返回的记录就是请求的记录
        let consistent = entity
            .id()
            .map(|found| found.to_string().contains(id))
            .unwrap_or(false);
        if !consistent {
            return Err(self.not_found());
        }
        debug!("{} {} loaded", T::KIND, id);
        Ok(entity)
    }

    /// Writes the fields chosen by `T::UPDATE_POLICY`. A missing target is
    /// not an error, the result just reports zero matches.
    pub async fn update(&self, id: &str, body: &[u8]) -> Result<UpdateResult, AppError> {
        let record_id = RecordId::parse(id)?;
        let entity: T = serde_json::from_slice(body)?;
        let fields = entity.update_fields()?;
        let result = self
            .bounded(
                "update_one",
                self.collection.update_one(id_filter(&record_id), fields),
            )
            .await?;
        info!(
            "{} {} updated ({:?}): matched {}, modified {}",
            T::KIND,
            id,
            T::UPDATE_POLICY,
            result.matched_count,
            result.modified_count
        );
        Ok(result)
    }

    pub async fn delete(&self, id: &str) -> Result<String, AppError> {
        let record_id = RecordId::parse(id)?;
        let result = self
            .bounded("delete_one", self.collection.delete_one(id_filter(&record_id)))
            .await?;
        if result.deleted_count < 1 {
            return Err(self.not_found());
        }
        info!("{} {} deleted", T::KIND, id);
        Ok(format!("{} deleted", T::KIND))
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<T>, AppError> {
        let docs = self
            .bounded("find", self.collection.find(T::list_filter(filter)))
            .await?;
        let entities = docs
            .into_iter()
            .map(T::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("{} {} record(s) listed", entities.len(), T::KIND);
        Ok(entities)
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", T::KIND))
    }

    async fn bounded<R, F>(&self, op: &str, fut: F) -> Result<R, AppError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!("{} on {} failed: {}", op, self.collection.name(), err);
                Err(err.into())
            }
            Err(_) => {
                warn!(
                    "{} on {} timed out after {:?}",
                    op,
                    self.collection.name(),
                    self.timeout
                );
                Err(AppError::InternalError(DEADLINE_EXCEEDED.to_string()))
            }
        }
    }
}
