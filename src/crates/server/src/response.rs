use crate::consts;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Payload<T> {
    pub data: T,
}

/// 统一响应格式：`{"status": 200, "message": "success", "data": {"data": ...}}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: &'static str,
    pub data: Payload<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self::success(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::success(StatusCode::CREATED, data)
    }

    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: consts::MESSAGE_SUCCESS,
            data: Payload { data },
        }
    }

    pub fn error(status: StatusCode, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: consts::MESSAGE_ERROR,
            data: Payload { data },
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_response()
    }
}
