use crate::entity::{is_zero, nullable, Entity, EntityError, UpdatePolicy};
use crate::value::RecordId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "_id", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub artist_since: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub monthly_listeners: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub website: String,
}

impl Entity for Artist {
    const COLLECTION: &'static str = "artists";
    const KIND: &'static str = "Artist";
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::FullReplace;

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// 全量覆盖：五个字段始终写入，未提供的字段被置为零值
    fn update_fields(&self) -> Result<Document, EntityError> {
        Ok(doc! {
            "name": self.name.as_str(),
            "artist_since": self.artist_since,
            "genres": self.genres.clone(),
            "monthly_listeners": self.monthly_listeners,
            "website": self.website.as_str(),
        })
    }
}
