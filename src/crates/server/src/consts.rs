pub const URL_PATH_API: &str = "/api";
pub const URL_PATH_ARTISTS: &str = "/artists";
pub const URL_PATH_ALBUMS: &str = "/albums";

pub const MESSAGE_SUCCESS: &str = "success";
pub const MESSAGE_ERROR: &str = "error";

/// 浏览器缓存预检结果的时间（秒）
pub const CORS_MAX_AGE: usize = 3600;
