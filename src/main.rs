use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use std::io;

use infra::config::AppConfigImpl;
use log::info;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use server::middleware::other;
use server::AppState;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

fn init_logging(log_file: &str) -> io::Result<()> {
    // 配置日志同时输出到控制台和文件
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build(
            "stdout",
            Box::new(
                ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                    .build(),
            ),
        ))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    log4rs::init_config(config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cfg = AppConfigImpl::load().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    init_logging(cfg.log_file())?;

    let store = AppState::init_store(&cfg)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    let app_state = AppState::new(store, cfg)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let server_cfg = app_state.app_cfg.server();
    info!("Listening on {}:{}", server_cfg.host, server_cfg.port);
    HttpServer::new(move || {
        let state = app_state.clone();
        let cors = other::cors(&state.app_cfg.server().cors_origin);
        App::new()
            .configure(move |svc| server::native_api::configure_service(svc, &state))
            .wrap(Logger::default())
            .wrap(cors)
    })
    .bind((server_cfg.host.as_str(), server_cfg.port))?
    .run()
    .await
}
