use super::consts;
use super::response::Envelope;
use super::AppState;
use actix_web::error::PathError;
use actix_web::{
    http::StatusCode, web, web::Path, web::Query, HttpRequest, HttpResponse, Scope,
};
use application::error::AppError;
use application::resource::ResourceService;
use domain::entity::{Entity, ListFilter};
use domain::store::{InsertOneResult, UpdateResult};
use log::info;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestfulError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    ResourceNotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<AppError> for RestfulError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => RestfulError::BadRequest(msg),
            AppError::NotFound(msg) => RestfulError::ResourceNotFound(msg),
            AppError::InternalError(msg) => RestfulError::Internal(msg),
        }
    }
}

impl actix_web::error::ResponseError for RestfulError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        Envelope::error(self.status_code(), self.to_string()).into_response()
    }
}

type Service<T> = web::Data<ResourceService<T>>;

pub struct Restful<T> {
    _marker: PhantomData<T>,
}

impl<T: Entity> Restful<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    async fn create(
        svc: Service<T>,
        body: web::Bytes,
    ) -> Result<Envelope<InsertOneResult>, RestfulError> {
        let result = svc.create(&body).await?;
        Ok(Envelope::created(result))
    }

    async fn update(
        svc: Service<T>,
        path: Path<String>,
        body: web::Bytes,
    ) -> Result<Envelope<UpdateResult>, RestfulError> {
        let result = svc.update(&path.into_inner(), &body).await?;
        Ok(Envelope::ok(result))
    }

    async fn list(svc: Service<T>, req: HttpRequest) -> Result<Envelope<Vec<T>>, RestfulError> {
        let filter = if T::FILTERED_LIST {
            list_filter(req.query_string())?
        } else {
            ListFilter::default()
        };
        let items = svc.list(&filter).await?;
        Ok(Envelope::ok(items))
    }

    async fn retrieve(svc: Service<T>, path: Path<String>) -> Result<Envelope<T>, RestfulError> {
        let instance = svc.get(&path.into_inner()).await?;
        Ok(Envelope::ok(instance))
    }

    async fn delete(svc: Service<T>, path: Path<String>) -> Result<Envelope<String>, RestfulError> {
        let message = svc.delete(&path.into_inner()).await?;
        Ok(Envelope::ok(message))
    }

    fn rx(&self, nest_prefix: &str, svc: Service<T>) -> Scope {
        info!("http config for {} ({})", nest_prefix, T::KIND);
        web::scope(nest_prefix)
            .app_data(svc)
            .service(
                web::resource("/{id}")
                    .route(web::get().to(Self::retrieve))
                    .route(web::put().to(Self::update))
                    .route(web::delete().to(Self::delete)),
            )
            .service(
                web::resource("")
                    .route(web::get().to(Self::list))
                    .route(web::post().to(Self::create)),
            )
    }
}

impl<T: Entity> Default for Restful<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 查询串按原始键值对解析，参数重复时取第一个值
fn list_filter(query: &str) -> Result<ListFilter, RestfulError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::from_query(query)
        .map_err(|e| RestfulError::BadRequest(e.to_string()))?;
    Ok(ListFilter::from_pairs(pairs))
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    RestfulError::BadRequest(err.to_string()).into()
}

/// 注册 `/api/artists` 与 `/api/albums`
pub fn configure_service(svc: &mut web::ServiceConfig, state: &AppState) {
    let rx_artist: Restful<domain::artist::Artist> = Restful::new();
    let rx_album: Restful<domain::album::Album> = Restful::new();
    svc.service(
        web::scope(consts::URL_PATH_API)
            .app_data(web::PathConfig::default().error_handler(path_error))
            .service(rx_artist.rx(consts::URL_PATH_ARTISTS, state.artists.clone()))
            .service(rx_album.rx(consts::URL_PATH_ALBUMS, state.albums.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use infra::config::AppConfigImpl;
    use infra::repository::InMemoryDocumentStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Arc::new(InMemoryDocumentStore::new()),
            AppConfigImpl::default(),
        )
        .unwrap()
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = $state.clone();
            test::init_service(App::new().configure(move |svc| configure_service(svc, &state)))
                .await
        }};
    }

    async fn body_json(resp: actix_web::dev::ServiceResponse) -> Value {
        let bytes = test::read_body(resp).await;
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_artist_lifecycle() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/artists")
            .set_payload(r#"{"name":"Test","artist_since":2000}"#)
            .insert_header(("content-type", "application/json"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["status"], 201);
        assert_eq!(body["message"], "success");
        let id = body["data"]["data"]["InsertedID"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 24);

        let req = test::TestRequest::get()
            .uri(&format!("/api/artists/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let artist = &body["data"]["data"];
        assert_eq!(artist["_id"], id.as_str());
        assert_eq!(artist["name"], "Test");
        assert_eq!(artist["artist_since"], 2000);
        assert!(artist.get("genres").is_none());

        let req = test::TestRequest::put()
            .uri(&format!("/api/artists/{}", id))
            .set_payload(r#"{"name":"Renamed"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(
            body["data"]["data"],
            json!({"MatchedCount": 1, "ModifiedCount": 1, "UpsertedCount": 0, "UpsertedID": null})
        );

        let req = test::TestRequest::get().uri("/api/artists").to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        let listed = body["data"]["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "Renamed");
        assert!(listed[0].get("artist_since").is_none());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/artists/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["data"], "Artist deleted");

        let req = test::TestRequest::get()
            .uri(&format!("/api/artists/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "error");
        assert_eq!(body["data"]["data"], "no documents in result");
    }

    #[actix_web::test]
    async fn test_delete_unknown_is_not_found() {
        let app = app!(state());
        let req = test::TestRequest::delete()
            .uri("/api/artists/65a1b2c3d4e5f60718293a4b")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "error");
        assert_eq!(body["data"]["data"], "Artist not found");
    }

    #[actix_web::test]
    async fn test_albums_filtered_by_artist() {
        let app = app!(state());
        for (name, artist) in [("Blue", "joni"), ("Nevermind", "nirvana")] {
            let req = test::TestRequest::post()
                .uri("/api/albums")
                .set_payload(json!({"name": name, "artist_id": artist}).to_string())
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED
            );
        }

        let req = test::TestRequest::get()
            .uri("/api/albums?artistId=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["data"], json!([]));

        let req = test::TestRequest::get()
            .uri("/api/albums?artistId=joni")
            .to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        let albums = body["data"]["data"].as_array().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0]["name"], "Blue");

        let req = test::TestRequest::get().uri("/api/albums").to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_repeated_query_param_keeps_first_value() {
        let app = app!(state());
        for (name, artist) in [("Blue", "a"), ("Nevermind", "b")] {
            let req = test::TestRequest::post()
                .uri("/api/albums")
                .set_payload(json!({"name": name, "artist_id": artist}).to_string())
                .to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::post()
            .uri("/api/artists")
            .set_payload(r#"{"name":"Joni"}"#)
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/albums?artistId=a&artistId=b")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "success");
        let albums = body["data"]["data"].as_array().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0]["name"], "Blue");

        let req = test::TestRequest::get()
            .uri("/api/artists?artistId=a&artistId=b&page=x")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_path_error_is_enveloped() {
        use actix_web::ResponseError;
        use serde::de::Error as _;

        let req = test::TestRequest::default().to_http_request();
        let err = path_error(
            PathError::Deserialize(serde::de::value::Error::custom("bad segment")),
            &req,
        );
        let resp = err.as_response_error().error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "error");
        assert!(body["data"]["data"]
            .as_str()
            .unwrap()
            .contains("bad segment"));
    }

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request() {
        let app = app!(state());
        for req in [
            test::TestRequest::get().uri("/api/albums/not-an-id"),
            test::TestRequest::put()
                .uri("/api/artists/123")
                .set_payload(r#"{"name":"X"}"#),
            test::TestRequest::delete().uri("/api/albums/zzzz"),
        ] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = body_json(resp).await;
            assert_eq!(body["status"], 400);
            assert!(body["data"]["data"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app!(state());
        let req = test::TestRequest::post()
            .uri("/api/artists")
            .set_payload(r#"{"monthly_listeners":"lots"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/artists").to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["data"], json!([]));
    }
}
