//! Helpers shared by the embedded document stores (in-memory and sled).

use bson::oid::ObjectId;
use bson::{Bson, Document};
use domain::entity::ID_FIELD;
use domain::store::StoreError;

/// Top-level field equality, the only filter shape the handlers issue.
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// 应用 $set，返回文档是否真的发生了变化
pub fn apply_set(doc: &mut Document, set: &Document) -> Result<bool, StoreError> {
    if set.contains_key(ID_FIELD) {
        return Err(StoreError::ImmutableId);
    }
    let mut modified = false;
    for (key, value) in set {
        if doc.get(key) != Some(value) {
            doc.insert(key.clone(), value.clone());
            modified = true;
        }
    }
    Ok(modified)
}

/// Returns the document's `_id`, assigning a new one when it is missing.
pub fn ensure_object_id(doc: &mut Document) -> Result<ObjectId, StoreError> {
    match doc.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Ok(*oid),
        Some(other) => Err(StoreError::Codec(format!(
            "unsupported _id type: {:?}",
            other.element_type()
        ))),
        None => {
            let oid = ObjectId::new();
            doc.insert(ID_FIELD, oid);
            Ok(oid)
        }
    }
}

/// `Some(oid)` when the filter is exactly `{ _id: <ObjectId> }`.
pub fn id_lookup(filter: &Document) -> Option<ObjectId> {
    if filter.len() != 1 {
        return None;
    }
    match filter.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Some(*oid),
        _ => None,
    }
}

pub fn encode(doc: &Document) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    doc.to_writer(&mut buf)?;
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<Document, StoreError> {
    Ok(Document::from_reader(bytes)?)
}
