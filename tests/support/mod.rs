#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use attendanced::config::Config;
use attendanced::db::{self, Status};
use attendanced::division::Division;
use attendanced::mail::{MailTransport, Message};
use attendanced::state::AppState;

/// Transport double: records every delivered message and can be primed to
/// fail for chosen addresses.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Message>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn messages(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to.clone())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &Message) -> anyhow::Result<()> {
        if self.failing.lock().unwrap().contains(&message.to) {
            anyhow::bail!("simulated transport failure for {}", message.to);
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub state: Arc<AppState>,
    _db_dir: TempDir,
}

pub fn build_app(demo_login: bool) -> TestApp {
    let db_dir = TempDir::new().expect("temp dir");
    let conn = db::open_store(db_dir.path()).expect("open store");
    let mailer = Arc::new(RecordingMailer::default());
    let config = Config {
        port: 0,
        db_dir: db_dir.path().to_path_buf(),
        frontend_origins: vec!["http://localhost:5173".to_string()],
        demo_login,
        mail: None,
    };
    let state = AppState::with_parts(conn, mailer.clone(), config);
    TestApp {
        router: attendanced::http::routes::router(state.clone()),
        mailer,
        state,
        _db_dir: db_dir,
    }
}

pub fn test_app() -> TestApp {
    build_app(true)
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response json")
    };
    (status, value)
}

/// POST with an arbitrary body, for exercising payloads that are not valid
/// JSON at all.
pub async fn post_raw(
    router: &Router,
    uri: &str,
    content_type: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .expect("build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response json")
    };
    (status, value)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response json")
    };
    (status, value)
}

/// GET that keeps the body as text, for the CSV endpoint.
pub async fn get_raw(router: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route request");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, headers, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

pub async fn register_student(
    router: &Router,
    name: &str,
    email: &str,
    roll_no: i64,
    division: &str,
) -> Value {
    let (status, body) = post_json(
        router,
        "/auth/register",
        json!({
            "name": name,
            "email": email,
            "password": "secret",
            "role": "student",
            "rollNo": roll_no,
            "division": division,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
    body
}

pub async fn submit_roster(
    router: &Router,
    subject: &str,
    division: &str,
    faculty_email: Option<&str>,
    roster: &[(i64, &str)],
) -> (StatusCode, Value) {
    let students: Vec<Value> = roster
        .iter()
        .map(|(roll_no, status)| json!({ "rollNo": roll_no, "status": status }))
        .collect();
    let mut payload = json!({
        "subject": subject,
        "division": division,
        "students": students,
    });
    if let Some(email) = faculty_email {
        payload["facultyEmail"] = json!(email);
    }
    post_json(router, "/attendance/submit", payload).await
}

/// Writes a session straight into the store, bypassing HTTP, so tests can
/// backdate history.
pub async fn insert_session(
    state: &AppState,
    subject: &str,
    date: &str,
    time: &str,
    division: Division,
    roster: &[(i64, Status)],
) {
    let mut conn = state.db.lock().await;
    db::replace_session(&mut conn, subject, date, time, division, roster)
        .expect("insert session");
}
