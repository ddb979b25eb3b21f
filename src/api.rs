// 🌐 HTTP API - the allocation engine over JSON
//
// One Session per server process, shared behind a Mutex. Every response is
// wrapped in the same envelope: { success, data, error?, errors? }.

use crate::allocation::AnimalRecord;
use crate::config::AppConfig;
use crate::distribution::PublicPoolSummary;
use crate::error::SessionError;
use crate::input::{AnimalSubmission, DistributionInput, FieldError};
use crate::registry::UpsertOutcome;
use crate::report::AllocationReport;
use crate::session::Session;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(session: Session, config: AppConfig) -> Self {
        AppState {
            session: Arc::new(Mutex::new(session)),
            config: Arc::new(config),
        }
    }

    /// A panicked handler leaves the session intact, so a poisoned lock is
    /// still usable.
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }

    fn failure(error: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            errors,
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    outcome: &'static str,
    animal: Option<AnimalRecord>,
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    format: Option<String>,
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure(
            format!("Animal {} not found", id.to_uppercase()),
            Vec::new(),
        )),
    )
        .into_response()
}

/// Malformed bodies get the same envelope as every other failure
fn rejected(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "request body rejected");
    (
        rejection.status(),
        Json(ApiResponse::<()>::failure(rejection.body_text(), Vec::new())),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/animals - All calculated animals, sorted by ID
async fn list_animals(State(state): State<AppState>) -> impl IntoResponse {
    let animals = state.session().animals().to_vec();
    Json(ApiResponse::ok(animals))
}

/// POST /api/animals - Calculate and store (or replace) one animal
async fn submit_animal(
    State(state): State<AppState>,
    payload: Result<Json<AnimalSubmission>, JsonRejection>,
) -> Response {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => return rejected(rejection),
    };
    let mut session = state.session();

    match session.submit(&submission) {
        Ok(outcome) => {
            let animal = session.animal(submission.animal_id.trim()).cloned();
            let status = match outcome {
                UpsertOutcome::Inserted => StatusCode::CREATED,
                UpsertOutcome::Replaced => StatusCode::OK,
            };
            let body = SubmitResponse {
                outcome: outcome.as_str(),
                animal,
            };
            (status, Json(ApiResponse::ok(body))).into_response()
        }
        Err(err) => {
            warn!(animal = %submission.animal_id, error = %err, "submission rejected");
            let errors = match &err {
                SessionError::Invalid(errors) => errors.clone(),
                SessionError::Allocation(_) => Vec::new(),
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<()>::failure(err.to_string(), errors)),
            )
                .into_response()
        }
    }
}

/// GET /api/animals/:id
async fn get_animal(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.session().animal(&id) {
        Some(animal) => (StatusCode::OK, Json(ApiResponse::ok(animal.clone()))).into_response(),
        None => not_found(&id),
    }
}

/// DELETE /api/animals/:id
async fn delete_animal(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.session().remove(&id) {
        Some(animal) => (StatusCode::OK, Json(ApiResponse::ok(animal))).into_response(),
        None => not_found(&id),
    }
}

/// GET /api/config - Current household count and deductions
async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.session().config().clone();
    Json(ApiResponse::ok(config))
}

/// PUT /api/config - Replace distribution settings from raw form values
async fn put_config(
    State(state): State<AppState>,
    payload: Result<Json<DistributionInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejected(rejection),
    };
    let config = input.into_config();
    info!(
        households = config.household_count,
        meat = config.deductions.meat,
        bone = config.deductions.bone,
        liver = config.deductions.liver,
        "distribution settings updated"
    );

    state.session().set_config(config.clone());
    Json(ApiResponse::ok(config)).into_response()
}

/// GET /api/summary - Public pool per household
async fn get_summary(State(state): State<AppState>) -> Json<ApiResponse<PublicPoolSummary>> {
    Json(ApiResponse::ok(state.session().summary()))
}

/// GET /api/report[?format=text] - Full allocation report
async fn get_report(State(state): State<AppState>, Query(query): Query<ReportQuery>) -> Response {
    let report: AllocationReport = state.session().report(&state.config);

    match query.format.as_deref() {
        Some("text") => report.render_text().into_response(),
        _ => Json(ApiResponse::ok(report)).into_response(),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/animals", get(list_animals).post(submit_animal))
        .route("/animals/:id", get(get_animal).delete(delete_animal))
        .route("/config", get(get_config).put(put_config))
        .route("/summary", get(get_summary))
        .route("/report", get(get_report))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionConfig;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(
            Session::new(DistributionConfig::new(4)),
            AppConfig::default(),
        ))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_submit_then_replace() {
        let app = app();
        let submission = json!({"animal_id": "b1", "meat_weights": [30.0], "bone_weights": [6.0]});

        let (status, body) = send(&app, Method::POST, "/api/animals", Some(submission.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["outcome"], "inserted");
        assert_eq!(body["data"]["animal"]["id"], "B1");

        let (status, body) = send(&app, Method::POST, "/api/animals", Some(submission)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], "replaced");

        let (_, body) = send(&app, Method::GET, "/api/animals", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_returns_field_errors() {
        let app = app();
        let submission = json!({"animal_id": "", "meat_weights": [10.0, -2.0]});

        let (status, body) = send(&app, Method::POST, "/api/animals", Some(submission)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);

        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors[0]["field"], "animal_id");
        assert_eq!(errors[0]["message"], "Animal ID is required.");
        assert_eq!(errors[1]["field"], "meat_weights[1]");

        let (_, body) = send(&app, Method::GET, "/api/animals", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_envelope() {
        let app = app();

        let submission = json!({"animal_id": "B1", "meat_weights": [10.0, null, "7"]});
        let (status, body) = send(&app, Method::POST, "/api/animals", Some(submission)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert!(body["error"].as_str().unwrap().contains("meat_weights"));

        let (status, body) = send(&app, Method::PUT, "/api/config", Some(json!({"households": 12}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);

        let (_, body) = send(&app, Method::GET, "/api/animals", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_delete_animal() {
        let app = app();
        send(&app, Method::POST, "/api/animals", Some(json!({"animal_id": "B7", "liver_weights": [3.0]}))).await;

        let (status, body) = send(&app, Method::GET, "/api/animals/b7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totals"]["liver"], 3.0);

        let (status, _) = send(&app, Method::DELETE, "/api/animals/B7", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/api/animals/B7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Animal B7 not found");
    }

    #[tokio::test]
    async fn test_config_update_drives_summary() {
        let app = app();
        send(&app, Method::POST, "/api/animals", Some(json!({"animal_id": "B1", "meat_weights": [30.0]}))).await;

        let input = json!({"households": "10 homes", "meat_deduction": "5", "bone_deduction": "", "liver_deduction": "-1"});
        let (status, body) = send(&app, Method::PUT, "/api/config", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["household_count"], 10);
        assert_eq!(body["data"]["deductions"]["liver"], 0.0);

        let (_, body) = send(&app, Method::GET, "/api/summary", None).await;
        let per_household = body["data"]["per_household"]["meat"].as_f64().unwrap();
        assert!((per_household - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_report_formats() {
        let app = app();
        send(&app, Method::POST, "/api/animals", Some(json!({"animal_id": "B1", "meat_weights": [9.0]}))).await;

        let (status, body) = send(&app, Method::GET, "/api/report", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["animals"][0]["id"], "B1");
        assert_eq!(body["data"]["distribution"]["households"], 4);

        let request = Request::builder()
            .uri("/api/report?format=text")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Animal Summary: B1"));
    }
}
