use crate::entity::{is_zero, nullable, Entity, ListFilter, UpdatePolicy};
use crate::value::RecordId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// An album. `artist_id` holds an artist's hex id but is never checked
/// against the artists collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "_id", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub length: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub artist_id: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub amt_songs: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub release_year: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub sales: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub producer: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub genre: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub studio: String,
}

impl Entity for Album {
    const COLLECTION: &'static str = "albums";
    const KIND: &'static str = "Album";
    // update_fields 使用默认实现：omitempty 序列化，空字段不会被覆盖
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::PartialMerge;
    const FILTERED_LIST: bool = true;

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn list_filter(filter: &ListFilter) -> Document {
        match filter.artist_id.as_deref() {
            Some(artist_id) if !artist_id.is_empty() => doc! { "artist_id": artist_id },
            _ => Document::new(),
        }
    }
}
