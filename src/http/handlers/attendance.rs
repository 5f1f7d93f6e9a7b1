use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::db::{self, AttendanceRecord};
use crate::error::AppError;
use crate::http::params::{json_body, optional_str, required_division, required_str, roster_entries};
use crate::state::AppState;
use crate::stats;
use crate::submit::{self, Submission, SubmitOutcome};

pub async fn submit_attendance(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, AppError> {
    let params = json_body(body)?;
    let subject = required_str(&params, "subject")?;
    let division = required_division(&params, "division")?;
    let roster = roster_entries(&params, "students")?;
    let faculty_email = optional_str(&params, "facultyEmail");

    let outcome = submit::submit(
        &state,
        Submission {
            subject,
            division,
            roster,
            faculty_email,
        },
    )
    .await?;
    Ok(Json(outcome))
}

/// A student's full attendance history, most recent day first. The frontend
/// renders absences from this feed as notifications.
pub async fn student_notifications(
    State(state): State<Arc<AppState>>,
    Path(roll_no): Path<i64>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let mut records = {
        let conn = state.db.lock().await;
        db::records_for_roll(&conn, roll_no)?
    };
    stats::sort_records_desc(&mut records);
    Ok(Json(records))
}
