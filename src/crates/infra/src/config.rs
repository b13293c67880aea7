use config::{Config, ConfigError, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// 文档数据库连接串
    database_url: String,
    /// 连接串中未指定数据库时使用的数据库名
    database_name: String,
    /// 单次存储操作超时（秒）
    store_timeout_secs: u64,
    /// 日志文件路径
    log_file: String,
    /// 服务器配置
    server: RawServerConfig,
}

/// 服务器配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawServerConfig {
    /// 监听地址
    host: String,
    /// 监听端口
    port: u16,
    /// 允许跨域访问的前端地址
    cors_origin: String,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4201,
            cors_origin: "http://localhost:4200".to_string(),
        }
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            database_url: "mongodb://localhost:27017".to_string(),
            database_name: "discog".to_string(),
            store_timeout_secs: 10,
            log_file: "app.log".to_string(),
            server: RawServerConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    pub cors_origin: String,
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    database_url: String,
    database_name: String,
    store_timeout: Duration,
    log_file: String,
    server: ServerConfig,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        AppConfigImpl {
            database_url: data.database_url,
            database_name: data.database_name,
            store_timeout: Duration::from_secs(data.store_timeout_secs),
            log_file: data.log_file,
            server: ServerConfig {
                host: data.server.host,
                port: data.server.port,
                cors_origin: data.server.cors_origin,
            },
        }
    }

    /// 依次读取 ./config.{toml,yaml,json}、.env 与 APP__ 前缀的环境变量
    pub fn load() -> Result<AppConfigImpl, ConfigError> {
        dotenv().ok();

        let builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"));
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<AppConfigImpl, ConfigError> {
        let raw: RawConfig = builder.build()?.try_deserialize()?; // serde 自动填充默认值
        Ok(AppConfigImpl::new(raw))
    }

    /// 替换连接串，其余配置保持不变
    pub fn with_database_url(mut self, url: &str) -> Self {
        self.database_url = url.to_string();
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone()
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}
