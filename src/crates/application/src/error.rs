use domain::entity::EntityError;
use domain::store::StoreError;
use domain::value::InvalidRecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体或 ID 无法解析
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// 存储不可达、查询失败、解码失败或超时
    #[error("{0}")]
    InternalError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<EntityError> for AppError {
    fn from(err: EntityError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<InvalidRecordId> for AppError {
    fn from(err: InvalidRecordId) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
