pub mod consts;
pub mod middleware;
pub mod native_api;
pub mod response;

use actix_web::web;
use application::resource::ResourceService;
use domain::album::Album;
use domain::artist::Artist;
use domain::entity::Entity;
use domain::store::{DocumentStore, StoreError};
use infra::config::AppConfigImpl;
use infra::repository::DocumentStoreFactory;
use log::info;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub artists: web::Data<ResourceService<Artist>>,
    pub albums: web::Data<ResourceService<Album>>,
}

impl AppState {
    /// 按配置连接文档存储，并在启动时 ping 一次确认可用
    pub async fn init_store(
        app_cfg: &AppConfigImpl,
    ) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let factory = DocumentStoreFactory::new(app_cfg.database_name());
        let store = factory.connect(app_cfg.database_url()).await?;
        tokio::time::timeout(app_cfg.store_timeout(), store.ping())
            .await
            .map_err(|_| StoreError::Connection("ping timed out".to_string()))??;
        info!("Document store connection verified");
        Ok(store)
    }

    pub fn new(store: Arc<dyn DocumentStore>, app_cfg: AppConfigImpl) -> Result<Self, StoreError> {
        let timeout = app_cfg.store_timeout();
        let artists = ResourceService::new(store.collection(Artist::COLLECTION)?, timeout);
        let albums = ResourceService::new(store.collection(Album::COLLECTION)?, timeout);
        Ok(Self {
            app_cfg,
            artists: web::Data::new(artists),
            albums: web::Data::new(albums),
        })
    }
}
