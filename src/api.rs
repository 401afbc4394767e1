use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::{self, StudentStore};
use crate::models::{LevelCounts, RiskLevel, RiskResult, StudentInput, StudentRecord};
use crate::risk;
use crate::sentiment::PolarityAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
    pub analyzer: Arc<dyn PolarityAnalyzer>,
}

impl AppState {
    pub fn new(store: Arc<dyn StudentStore>, analyzer: Arc<dyn PolarityAnalyzer>) -> Self {
        Self { store, analyzer }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct SeedResponse {
    message: &'static str,
    inserted: usize,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/seed", post(seed))
        .route("/students", get(list_students))
        .route("/high-risk", get(list_high_risk))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn predict(
    State(state): State<AppState>,
    Json(input): Json<StudentInput>,
) -> Result<Json<RiskResult>, ApiError> {
    let breakdown = risk::score_with_breakdown(&input, state.analyzer.as_ref());
    let result = breakdown.result;

    tracing::debug!(
        academic_risk = breakdown.academic_risk,
        mental_risk = breakdown.mental_risk,
        polarity = breakdown.polarity,
        crisis_detected = breakdown.crisis_detected,
        risk = result.risk_percentage,
        "scored student input"
    );
    if result.risk_level == RiskLevel::High {
        tracing::info!(
            risk = result.risk_percentage,
            crisis_detected = breakdown.crisis_detected,
            "high risk student recorded"
        );
    }

    state
        .store
        .insert(&StudentRecord::from_scored(input, result))
        .await?;

    Ok(Json(result))
}

async fn seed(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let inserted = db::seed(state.store.as_ref(), state.analyzer.as_ref()).await?;
    tracing::info!(count = inserted.len(), "seeded sample records");

    Ok(Json(SeedResponse {
        message: "Sample data inserted",
        inserted: inserted.len(),
    }))
}

async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    Ok(Json(state.store.find_all().await?))
}

async fn list_high_risk(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    Ok(Json(state.store.find_by_level(RiskLevel::High).await?))
}

async fn stats(State(state): State<AppState>) -> Result<Json<LevelCounts>, ApiError> {
    Ok(Json(db::level_counts(state.store.as_ref()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStudentStore;
    use crate::risk::tests::FixedPolarity;
    use crate::sentiment::LexiconAnalyzer;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(LexiconAnalyzer::new()),
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn predict_scores_and_persists() {
        let state = test_state();
        let app = router(state.clone());

        let (status, json) = send(
            &app,
            post_json(
                "/predict",
                serde_json::json!({
                    "attendance": 40,
                    "grades": 35,
                    "assignments": 30,
                    "mood": "I feel hopeless and want to give up"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({ "risk_percentage": 100, "risk_level": "HIGH" })
        );

        let stored = state.store.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].attendance, 40.0);
        assert_eq!(stored[0].mood, "I feel hopeless and want to give up");
        assert_eq!(stored[0].risk, 100);
        assert_eq!(stored[0].level, RiskLevel::High);
    }

    #[tokio::test]
    async fn predict_low_risk_student() {
        let app = router(test_state());

        let (status, json) = send(
            &app,
            post_json(
                "/predict",
                serde_json::json!({
                    "attendance": 85,
                    "grades": 78,
                    "assignments": 90,
                    "mood": "Feeling good and motivated"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["risk_percentage"], 0);
        assert_eq!(json["risk_level"], "LOW");
    }

    #[tokio::test]
    async fn predict_rejects_non_numeric_fields() {
        let state = test_state();
        let app = router(state.clone());

        let (status, _) = send(
            &app,
            post_json(
                "/predict",
                serde_json::json!({
                    "attendance": "high",
                    "grades": 35,
                    "assignments": 30,
                    "mood": "fine"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn students_listing_omits_identity() {
        let app = router(test_state());
        let (status, json) = send(&app, post_json("/seed", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["inserted"], 3);
        assert!(json["message"].is_string());

        let (status, json) = send(&app, get_request("/students")).await;
        assert_eq!(status, StatusCode::OK);
        let students = json.as_array().unwrap();
        assert_eq!(students.len(), 3);

        let mut keys: Vec<_> = students[0].as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["assignments", "attendance", "grades", "level", "mood", "risk"]
        );
    }

    #[tokio::test]
    async fn high_risk_only_returns_high_records() {
        let app = router(AppState::new(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(FixedPolarity(0.0)),
        ));

        for (attendance, grades, assignments) in [(90, 90, 90), (50, 40, 90), (10, 10, 10)] {
            let (status, _) = send(
                &app,
                post_json(
                    "/predict",
                    serde_json::json!({
                        "attendance": attendance,
                        "grades": grades,
                        "assignments": assignments,
                        "mood": "ok"
                    }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, json) = send(&app, get_request("/high-risk")).await;
        assert_eq!(status, StatusCode::OK);
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r["level"] == "HIGH"));
        assert_eq!(records[0]["risk"], 80);
    }

    #[tokio::test]
    async fn stats_counts_each_level() {
        let app = router(test_state());
        send(&app, post_json("/seed", serde_json::json!({}))).await;

        let (status, json) = send(&app, get_request("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({ "total": 3, "high": 1, "medium": 1, "low": 1 })
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(test_state());
        let (status, json) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    struct FailingStore;

    #[async_trait]
    impl StudentStore for FailingStore {
        async fn insert(&self, _record: &StudentRecord) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }

        async fn find_all(&self) -> anyhow::Result<Vec<StudentRecord>> {
            anyhow::bail!("connection refused")
        }

        async fn find_by_level(&self, _level: RiskLevel) -> anyhow::Result<Vec<StudentRecord>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn storage_failures_surface_as_server_errors() {
        let app = router(AppState::new(
            Arc::new(FailingStore),
            Arc::new(FixedPolarity(0.0)),
        ));

        let (status, json) = send(
            &app,
            post_json(
                "/predict",
                serde_json::json!({
                    "attendance": 90,
                    "grades": 90,
                    "assignments": 90,
                    "mood": "ok"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "connection refused");

        let (status, _) = send(&app, get_request("/high-risk")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
