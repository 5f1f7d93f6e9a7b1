use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::db::{self, Status, User};
use crate::division::Division;
use crate::error::AppError;
use crate::http::params::{json_body, required_roll};
use crate::notify;
use crate::state::AppState;
use crate::stats::{self, Dashboard, StudentStat, SubjectStat, POOR_ATTENDANCE_THRESHOLD};

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<Dashboard>, AppError> {
    let (records, total_students) = {
        let conn = state.db.lock().await;
        (db::all_records(&conn)?, db::count_students(&conn)?)
    };
    Ok(Json(stats::dashboard(&records, total_students)))
}

#[derive(Debug, Deserialize)]
pub struct SubjectAttendanceQuery {
    pub division: Option<String>,
}

/// Subject-wise tallies across all records, optionally scoped to one
/// division. An empty `division=` parameter means no filter.
pub async fn subject_attendance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubjectAttendanceQuery>,
) -> Result<Json<Vec<SubjectStat>>, AppError> {
    let division = match query.division.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            Division::parse(raw)
                .ok_or_else(|| AppError::Validation("Invalid division".to_string()))?,
        ),
    };
    let records = {
        let conn = state.db.lock().await;
        db::all_records(&conn)?
    };
    Ok(Json(stats::subject_breakdown(&records, division)))
}

pub async fn report(
    State(state): State<Arc<AppState>>,
) -> Result<([(HeaderName, &'static str); 2], String), AppError> {
    let records = {
        let conn = state.db.lock().await;
        db::all_records(&conn)?
    };
    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=attendance-report.csv",
            ),
        ],
        stats::report_csv(&records),
    ))
}

/// Emails a warning to every registered student currently below the
/// attendance threshold. Reports how many sends the transport confirmed;
/// one failed recipient never aborts the run.
pub async fn bulk_notify(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let flagged: Vec<(StudentStat, User)> = {
        let conn = state.db.lock().await;
        let records = db::all_records(&conn)?;
        let mut flagged = Vec::new();
        for stat in stats::poor_performers(&records, POOR_ATTENDANCE_THRESHOLD) {
            if let Some(user) = db::find_user_by_roll_no(&conn, stat.roll_no)? {
                flagged.push((stat, user));
            }
        }
        flagged
    };

    let mut count = 0i64;
    for (stat, user) in &flagged {
        let message = notify::warning_message(&user.email, &user.name, stat);
        match state.mailer.send(&message).await {
            Ok(()) => count += 1,
            Err(e) => error!(roll_no = stat.roll_no, error = %e, "attendance warning failed"),
        }
    }
    info!(count, flagged = flagged.len(), "bulk attendance warnings dispatched");
    Ok(Json(json!({ "count": count })))
}

/// Emails a personal warning to one student by roll number, whatever their
/// current percentage. Unlike the bulk run, a transport failure here is the
/// whole point of the request and surfaces as an error.
pub async fn warning_email(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let params = json_body(body)?;
    let roll_no = required_roll(&params, "rollNo")?;

    let (user, percentage) = {
        let conn = state.db.lock().await;
        let user = db::find_user_by_roll_no(&conn, roll_no)?
            .ok_or_else(|| AppError::NotFound("Student not found or no email".to_string()))?;
        let records = db::records_for_roll(&conn, roll_no)?;
        let present = records
            .iter()
            .filter(|r| r.status == Status::Present)
            .count() as i64;
        (user, stats::percentage(present, records.len() as i64))
    };

    let message = notify::individual_warning_message(&user.email, &user.name, roll_no, percentage);
    state
        .mailer
        .send(&message)
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;
    Ok(Json(json!({ "message": "Warning email sent successfully" })))
}
