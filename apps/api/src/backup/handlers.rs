use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::backup::snapshot::{build_envelope, parse_upload};
use crate::errors::AppError;
use crate::models::backup::{RecordCounts, AUTOMATIC_BACKUP};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    pub success: bool,
    pub message: String,
    pub backup_id: i64,
    pub created_at: DateTime<Utc>,
    pub records: RecordCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
    pub backup_id: i64,
    pub created_at: DateTime<Utc>,
}

/// POST /backup
pub async fn handle_backup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BackupResponse>, AppError> {
    let upload = parse_upload(&body)?;
    let envelope = build_envelope(upload, Utc::now());
    let records = envelope.total_records;
    let backup_data = serde_json::to_value(&envelope)?;

    let inserted = state.store.insert(&backup_data, AUTOMATIC_BACKUP).await?;
    info!(
        "Backup {} saved: {} users, {} attendance, {} income",
        inserted.id, records.users, records.attendance, records.income
    );

    Ok(Json(BackupResponse {
        success: true,
        message: "Backup saved successfully".to_string(),
        backup_id: inserted.id,
        created_at: inserted.created_at,
        records,
    }))
}

/// POST /backupdata
///
/// Deprecated alias kept for clients still pointed at the old function name.
/// Accepts only the `/backup` body shape.
pub async fn handle_legacy_backup(
    state: State<AppState>,
    body: Bytes,
) -> Result<Json<BackupResponse>, AppError> {
    warn!("POST /backupdata is deprecated, use POST /backup");
    handle_backup(state, body).await
}

/// GET /restore
pub async fn handle_restore(
    State(state): State<AppState>,
) -> Result<Json<RestoreResponse>, AppError> {
    let row = state
        .store
        .latest()
        .await?
        .ok_or_else(|| AppError::NotFound("No backups found in the cloud".to_string()))?;

    info!("Restoring backup {} from {}", row.id, row.created_at);

    Ok(Json(RestoreResponse {
        success: true,
        message: "Data restored successfully".to_string(),
        data: row.backup_data,
        backup_id: row.id,
        created_at: row.created_at,
    }))
}

/// OPTIONS on any endpoint: always 200 with an empty body.
pub async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::backup::store::memory::MemoryBackupStore;
    use crate::routes::build_router;
    use crate::state::AppState;

    use super::*;

    fn app_with(store: Arc<MemoryBackupStore>) -> Router {
        build_router(AppState { store })
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_backup(body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/backup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_restore() -> Request<Body> {
        Request::builder()
            .uri("/restore")
            .body(Body::empty())
            .unwrap()
    }

    fn snapshot(tag: &str) -> Value {
        json!({
            "users": [{
                "id": format!("_u{tag}"),
                "name": "Laura Gómez",
                "document": "1020304050",
                "status": "active",
                "classTime": "6:00 AM"
            }],
            "attendance": [
                {"id": format!("_a{tag}"), "userId": format!("_u{tag}"), "date": "2024-05-01", "timestamp": "2024-05-01T11:00:00.000Z"},
                {"id": format!("_b{tag}"), "userId": format!("_u{tag}"), "date": "2024-05-02", "timestamp": "2024-05-02T11:00:00.000Z"}
            ],
            "income": [{"id": format!("_p{tag}"), "userId": format!("_u{tag}"), "amount": 120000.5, "method": "cash"}],
            "lastBackup": "2024-05-02T12:00:00.000Z"
        })
    }

    #[tokio::test]
    async fn test_backup_then_restore_round_trips_collections() {
        let store = Arc::new(MemoryBackupStore::new());
        let app = app_with(store.clone());
        let sent = snapshot("1");

        let (status, body) = send_json(&app, post_backup(&sent)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["backupId"], 1);
        assert_eq!(
            body["records"],
            json!({"users": 1, "attendance": 2, "income": 1})
        );
        assert!(body["createdAt"].is_string());

        let (status, body) = send_json(&app, get_restore()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["backupId"], 1);
        assert_eq!(body["data"]["users"], sent["users"]);
        assert_eq!(body["data"]["attendance"], sent["attendance"]);
        assert_eq!(body["data"]["income"], sent["income"]);
        assert_eq!(body["data"]["lastBackup"], sent["lastBackup"]);
        assert_eq!(body["data"]["totalRecords"]["attendance"], 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_returns_latest_of_many() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));
        for tag in ["1", "2", "3"] {
            let (status, _) = send(&app, post_backup(&snapshot(tag))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send_json(&app, get_restore()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backupId"], 3);
        assert_eq!(body["data"]["users"], snapshot("3")["users"]);
    }

    #[tokio::test]
    async fn test_backup_with_empty_list_is_bad_request() {
        let store = Arc::new(MemoryBackupStore::new());
        let app = app_with(store.clone());
        let mut body = snapshot("1");
        body["income"] = json!([]);

        let (status, resp) = send_json(&app, post_backup(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_backup_with_missing_list_is_bad_request() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));
        let body = json!({ "users": [{"id": "_u"}], "income": [{"id": "_p"}] });

        let (status, _) = send_json(&app, post_backup(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_backup_with_malformed_json_is_internal_error() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/backup")
            .body(Body::from("{\"users\": ["))
            .unwrap();

        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_details() {
        let app = app_with(Arc::new(MemoryBackupStore::failing("connection refused")));

        let (status, body) = send_json(&app, post_backup(&snapshot("1"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "connection refused");

        let (status, body) = send_json(&app, get_restore()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_wrong_methods_are_rejected() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));

        let req = Request::builder()
            .uri("/backup")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body["error"].is_string());

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/backup")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/restore")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_preflight_is_empty_ok() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));

        for uri in ["/backup", "/restore", "/backupdata"] {
            let req = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body.is_empty(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_for_disallowed_method_still_ok() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/backup")
            .header(header::ORIGIN, "https://box23.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .body(Body::empty())
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let methods = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("POST"));
        assert!(!methods.contains("GET"));
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    fn cors_preflight(uri: &str, method: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, "https://box23.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    fn header_str(resp: &axum::response::Response, name: header::HeaderName) -> String {
        resp.headers()
            .get(name)
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase()
    }

    #[tokio::test]
    async fn test_cors_headers_per_route_group() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));

        let resp = app
            .clone()
            .oneshot(cors_preflight("/backup", "POST"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header_str(&resp, header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
        assert!(header_str(&resp, header::ACCESS_CONTROL_ALLOW_HEADERS).contains("content-type"));
        let methods = header_str(&resp, header::ACCESS_CONTROL_ALLOW_METHODS);
        assert!(methods.contains("post"));
        assert!(methods.contains("options"));
        assert!(!methods.contains("get"));

        let resp = app
            .clone()
            .oneshot(cors_preflight("/restore", "GET"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header_str(&resp, header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
        assert!(header_str(&resp, header::ACCESS_CONTROL_ALLOW_HEADERS).contains("content-type"));
        let methods = header_str(&resp, header::ACCESS_CONTROL_ALLOW_METHODS);
        assert!(methods.contains("get"));
        assert!(methods.contains("options"));
        assert!(!methods.contains("post"));
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_head_on_restore_is_rejected() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/restore")
            .body(Body::empty())
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_restore_without_backups_is_not_found() {
        let app = app_with(Arc::new(MemoryBackupStore::new()));

        let (status, body) = send_json(&app, get_restore()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_legacy_route_stores_canonical_shape() {
        let store = Arc::new(MemoryBackupStore::new());
        let app = app_with(store.clone());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/backupdata")
            .body(Body::from(snapshot("1").to_string()))
            .unwrap();

        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"]["users"], 1);
        assert_eq!(store.len(), 1);
    }
}
