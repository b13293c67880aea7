use crate::consts;
use actix_cors::Cors;
use actix_web::http::header;
use log::info;

/// 只允许配置中的前端地址跨域访问，`*` 表示不限制来源
pub fn cors(origin: &str) -> Cors {
    info!("CORS allowed origin: {}", origin);
    let cors = if origin == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(origin)
    };
    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LENGTH,
        ])
        .supports_credentials()
        .max_age(consts::CORS_MAX_AGE)
}
