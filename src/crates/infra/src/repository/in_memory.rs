use super::document::{apply_set, ensure_object_id, matches};
use async_trait::async_trait;
use bson::Document;
use dashmap::DashMap;
use domain::store::{
    DeleteResult, DocumentCollection, DocumentStore, InsertOneResult, StoreError, UpdateResult,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// 进程内文档存储，按插入顺序返回结果，主要用于测试
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<DashMap<String, Arc<InMemoryCollection>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, StoreError> {
        let collection: Arc<dyn DocumentCollection> = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCollection::new(name)))
            .clone();
        Ok(collection)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct InMemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut doc: Document) -> Result<InsertOneResult, StoreError> {
        let oid = ensure_object_id(&mut doc)?;
        let mut documents = self.documents.write();
        if documents
            .iter()
            .any(|d| d.get_object_id("_id").ok() == Some(oid))
        {
            return Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                id: oid.to_hex(),
            });
        }
        documents.push(doc);
        Ok(InsertOneResult {
            inserted_id: oid.into(),
        })
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read();
        Ok(documents.iter().find(|d| matches(d, &filter)).cloned())
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read();
        Ok(documents
            .iter()
            .filter(|d| matches(d, &filter))
            .cloned()
            .collect())
    }

    async fn update_one(
        &self,
        filter: Document,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        let mut documents = self.documents.write();
        let Some(doc) = documents.iter_mut().find(|d| matches(d, &filter)) else {
            return Ok(UpdateResult::default());
        };
        let modified = apply_set(doc, &set)?;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: modified as u64,
            ..Default::default()
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        let mut documents = self.documents.write();
        match documents.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;

    #[tokio::test]
    async fn test_collection_is_shared_by_name() {
        let store = InMemoryDocumentStore::new();
        let first = store.collection("artists").unwrap();
        let second = store.collection("artists").unwrap();
        first.insert_one(doc! { "name": "A" }).await.unwrap();
        assert_eq!(second.find(doc! {}).await.unwrap().len(), 1);
        assert_eq!(store.collection("albums").unwrap().name(), "albums");
        assert!(store
            .collection("albums")
            .unwrap()
            .find(doc! {})
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let collection = InMemoryCollection::new("albums");
        let oid = ObjectId::new();
        let result = collection
            .insert_one(doc! { "_id": oid, "name": "Blue", "artist_id": "a1" })
            .await
            .unwrap();
        assert_eq!(result.inserted_id.as_object_id(), oid);
        collection
            .insert_one(doc! { "name": "Hejira", "artist_id": "a1" })
            .await
            .unwrap();
        collection
            .insert_one(doc! { "name": "Nevermind", "artist_id": "a2" })
            .await
            .unwrap();

        let found = collection.find_one(doc! { "_id": oid }).await.unwrap();
        assert_eq!(found.unwrap().get_str("name").unwrap(), "Blue");

        let by_artist = collection.find(doc! { "artist_id": "a1" }).await.unwrap();
        let names: Vec<&str> = by_artist
            .iter()
            .map(|d| d.get_str("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Blue", "Hejira"]);

        assert!(collection
            .find_one(doc! { "_id": ObjectId::new() })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let collection = InMemoryCollection::new("artists");
        let oid = ObjectId::new();
        collection.insert_one(doc! { "_id": oid }).await.unwrap();
        let err = collection.insert_one(doc! { "_id": oid }).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_update_one() {
        let collection = InMemoryCollection::new("artists");
        let oid = ObjectId::new();
        collection
            .insert_one(doc! { "_id": oid, "name": "A", "website": "a.io" })
            .await
            .unwrap();

        let result = collection
            .update_one(doc! { "_id": oid }, doc! { "name": "B" })
            .await
            .unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.modified_count, 1);

        let unchanged = collection
            .update_one(doc! { "_id": oid }, doc! { "name": "B" })
            .await
            .unwrap();
        assert_eq!(unchanged.matched_count, 1);
        assert_eq!(unchanged.modified_count, 0);

        let missing = collection
            .update_one(doc! { "_id": ObjectId::new() }, doc! { "name": "C" })
            .await
            .unwrap();
        assert_eq!(missing, UpdateResult::default());

        let doc = collection.find_one(doc! { "_id": oid }).await.unwrap().unwrap();
        assert_eq!(doc, doc! { "_id": oid, "name": "B", "website": "a.io" });
    }

    #[tokio::test]
    async fn test_update_cannot_touch_id() {
        let collection = InMemoryCollection::new("artists");
        let oid = ObjectId::new();
        collection.insert_one(doc! { "_id": oid }).await.unwrap();
        let err = collection
            .update_one(doc! { "_id": oid }, doc! { "_id": ObjectId::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ImmutableId));
    }

    #[tokio::test]
    async fn test_delete_one() {
        let collection = InMemoryCollection::new("artists");
        let oid = ObjectId::new();
        collection.insert_one(doc! { "_id": oid }).await.unwrap();

        let result = collection.delete_one(doc! { "_id": oid }).await.unwrap();
        assert_eq!(result.deleted_count, 1);
        let again = collection.delete_one(doc! { "_id": oid }).await.unwrap();
        assert_eq!(again.deleted_count, 0);
        assert!(collection.find(doc! {}).await.unwrap().is_empty());
    }
}
