use bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("the provided hex string is not a valid ObjectID: {0}")]
pub struct InvalidRecordId(pub String);

/// 文档主键，存储端为原生 ObjectId，对外为 24 位十六进制字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(ObjectId);

impl RecordId {
    /// 生成新的唯一 ID
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(hex: &str) -> Result<Self, InvalidRecordId> {
        ObjectId::parse_str(hex)
            .map(Self)
            .map_err(|_| InvalidRecordId(hex.to_string()))
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<RecordId> for bson::Bson {
    fn from(id: RecordId) -> Self {
        bson::Bson::ObjectId(id.0)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

// JSON 中始终输出十六进制字符串，而不是 {"$oid": ...}
impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}
