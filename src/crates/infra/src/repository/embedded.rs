use super::document::{apply_set, decode, encode, ensure_object_id, id_lookup, matches};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;
use domain::store::{
    DeleteResult, DocumentCollection, DocumentStore, InsertOneResult, StoreError, UpdateResult,
};
use sled::{Db, IVec, Tree};
use std::path::Path;
use std::sync::Arc;

fn backend(err: sled::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// 基于 sled 的嵌入式文档存储
/// 每个集合对应一个 tree，key 为 ObjectId 的 12 字节，value 为 BSON 编码的文档
pub struct SledDocumentStore {
    db: Db,
}

impl SledDocumentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl DocumentStore for SledDocumentStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, StoreError> {
        let tree = self.db.open_tree(name).map_err(backend)?;
        Ok(Arc::new(SledCollection {
            name: name.to_string(),
            tree,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.size_on_disk().map_err(backend)?;
        Ok(())
    }
}

pub struct SledCollection {
    name: String,
    tree: Tree,
}

impl SledCollection {
    /// 按 key 顺序扫描，返回第一个匹配的文档及其原始字节
    fn scan_first(
        &self,
        filter: &Document,
    ) -> Result<Option<(IVec, IVec, Document)>, StoreError> {
        if let Some(oid) = id_lookup(filter) {
            let found = self.tree.get(oid.bytes()).map_err(backend)?;
            return match found {
                Some(value) => {
                    let doc = decode(&value)?;
                    Ok(Some((IVec::from(&oid.bytes()[..]), value, doc)))
                }
                None => Ok(None),
            };
        }
        for item in self.tree.iter() {
            let (key, value) = item.map_err(backend)?;
            let doc = decode(&value)?;
            if matches(&doc, filter) {
                return Ok(Some((key, value, doc)));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl DocumentCollection for SledCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut doc: Document) -> Result<InsertOneResult, StoreError> {
        let oid: ObjectId = ensure_object_id(&mut doc)?;
        let value = encode(&doc)?;
        let swapped = self
            .tree
            .compare_and_swap(oid.bytes(), None as Option<&[u8]>, Some(value))
            .map_err(backend)?;
        if swapped.is_err() {
            return Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                id: oid.to_hex(),
            });
        }
        Ok(InsertOneResult {
            inserted_id: oid.into(),
        })
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        Ok(self.scan_first(&filter)?.map(|(_, _, doc)| doc))
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        for item in self.tree.iter() {
            let (_, value) = item.map_err(backend)?;
            let doc = decode(&value)?;
            if matches(&doc, &filter) {
                documents.push(doc);
            }
        }
        Ok(documents)
    }

    async fn update_one(
        &self,
        filter: Document,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        loop {
            let Some((key, current, mut doc)) = self.scan_first(&filter)? else {
                return Ok(UpdateResult::default());
            };
            let modified = apply_set(&mut doc, &set)?;
            if modified {
                // 只在记录未被并发修改或删除时写回，否则重新读取
                let swapped = self
                    .tree
                    .compare_and_swap(&key, Some(&current), Some(encode(&doc)?))
                    .map_err(backend)?;
                if swapped.is_err() {
                    continue;
                }
            }
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: modified as u64,
                ..Default::default()
            });
        }
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        let Some((key, _, _)) = self.scan_first(&filter)? else {
            return Ok(DeleteResult::default());
        };
        let removed = self.tree.remove(key).map_err(backend)?;
        Ok(DeleteResult {
            deleted_count: removed.is_some() as u64,
        })
    }
}
