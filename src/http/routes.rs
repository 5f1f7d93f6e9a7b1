use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::state::AppState;

use super::handlers::{attendance, auth, faculty, leaderboard, student};

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.frontend_origins);

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/attendance/submit", post(attendance::submit_attendance))
        .route(
            "/attendance/notifications/{rollNo}",
            get(attendance::student_notifications),
        )
        .route("/faculty/dashboard", get(faculty::dashboard))
        .route("/faculty/subject-attendance", get(faculty::subject_attendance))
        .route("/faculty/report", get(faculty::report))
        .route("/faculty/bulk-notify", post(faculty::bulk_notify))
        .route("/faculty/warning-email", post(faculty::warning_email))
        .route(
            "/student/subject-attendance/{rollNo}",
            get(student::subject_attendance),
        )
        .route("/student/streaks/{rollNo}", get(student::streaks))
        .route("/leaderboard", get(leaderboard::leaderboard))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
