use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const PACKAGE_CONTENT_TYPE: &str = "binary/octet-stream";
pub const APP_NAME_HEADER: &str = "x-app-name";
pub const DEFAULT_APP_NAME: &str = "Imported App";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppAttributes {
    pub id: Uuid,
    pub name: String,
    pub file_size: u64,
    pub published: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppEnvelope {
    pub attributes: AppAttributes,
}

pub type Db = Arc<RwLock<HashMap<Uuid, AppAttributes>>>;

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Router over a caller-held store, so tests can inspect what was imported.
pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/v1/apps/import", post(import_app))
        .route("/v1/apps", get(list_apps))
        .route("/v1/apps/{id}", get(get_app))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_db(listener, Db::default()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

async fn import_app(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AppEnvelope>, (StatusCode, String)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type != PACKAGE_CONTENT_TYPE {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("expected content type {PACKAGE_CONTENT_TYPE}, got {content_type:?}"),
        ));
    }
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "empty app package".to_string()));
    }

    let name = headers
        .get(APP_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_APP_NAME)
        .to_string();
    let app = AppAttributes {
        id: Uuid::new_v4(),
        name,
        file_size: body.len() as u64,
        published: false,
    };
    info!(id = %app.id, name = %app.name, bytes = app.file_size, "imported app");
    db.write().await.insert(app.id, app.clone());
    Ok(Json(AppEnvelope { attributes: app }))
}

async fn list_apps(State(db): State<Db>) -> Json<Vec<AppEnvelope>> {
    let apps = db.read().await;
    Json(
        apps.values()
            .cloned()
            .map(|attributes| AppEnvelope { attributes })
            .collect(),
    )
}

async fn get_app(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppEnvelope>, StatusCode> {
    let apps = db.read().await;
    apps.get(&id)
        .cloned()
        .map(|attributes| Json(AppEnvelope { attributes }))
        .ok_or(StatusCode::NOT_FOUND)
}
