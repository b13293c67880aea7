use crate::value::RecordId;
use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const ID_FIELD: &str = "_id";

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("{0}")]
    Encode(#[from] bson::ser::Error),
    #[error("{0}")]
    Decode(#[from] bson::de::Error),
    #[error("document has no valid _id: {0}")]
    InvalidId(String),
}

/// How an update request is turned into a `$set` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Every mutable field is written; omitted fields become their zero value.
    FullReplace,
    /// Only non-empty fields are written; the rest of the record is kept.
    PartialMerge,
}

pub const ARTIST_ID_PARAM: &str = "artistId";

/// 列表查询参数，`artistId` 只对专辑生效
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub artist_id: Option<String>,
}

impl ListFilter {
    /// 从查询参数构造，重复出现的参数只取第一个值，未知参数忽略
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let artist_id = pairs
            .into_iter()
            .find(|(key, _)| key == ARTIST_ID_PARAM)
            .map(|(_, value)| value);
        Self { artist_id }
    }
}

/// A record type persisted in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Human readable name used in messages, e.g. "Artist not found".
    const KIND: &'static str;
    const UPDATE_POLICY: UpdatePolicy;

    fn id(&self) -> Option<&RecordId>;

    fn set_id(&mut self, id: RecordId);

    /// Fields written by an update, shaped by `UPDATE_POLICY`.
    fn update_fields(&self) -> Result<Document, EntityError> {
        body_fields(self)
    }

    /// Whether list requests accept query filters. Lists of other types
    /// ignore the query string entirely.
    const FILTERED_LIST: bool = false;

    fn list_filter(_filter: &ListFilter) -> Document {
        Document::new()
    }

    fn to_document(&self, id: &RecordId) -> Result<Document, EntityError> {
        let mut doc = Document::new();
        doc.insert(ID_FIELD, Bson::from(*id));
        for (key, value) in body_fields(self)? {
            doc.insert(key, value);
        }
        Ok(doc)
    }

    fn from_document(mut doc: Document) -> Result<Self, EntityError> {
        let id = match doc.remove(ID_FIELD) {
            Some(Bson::ObjectId(oid)) => RecordId::from(oid),
            other => return Err(EntityError::InvalidId(format!("{:?}", other))),
        };
        let mut entity: Self = bson::from_document(doc)?;
        entity.set_id(id);
        Ok(entity)
    }
}

pub fn id_filter(id: &RecordId) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD, Bson::from(*id));
    filter
}

// 按 omitempty 规则序列化，去掉 _id
fn body_fields<T: Serialize + ?Sized>(entity: &T) -> Result<Document, EntityError> {
    let mut doc = bson::to_document(entity)?;
    doc.remove(ID_FIELD);
    Ok(doc)
}

/// `null` and missing both read as the zero value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn is_zero(v: &i64) -> bool {
    *v == 0
}
