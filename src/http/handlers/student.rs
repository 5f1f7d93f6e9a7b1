use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::stats::{self, StreakInfo, SubjectStat};

/// Per-subject streaks for one student. Unknown roll numbers simply have no
/// records and get an empty map.
pub async fn streaks(
    State(state): State<Arc<AppState>>,
    Path(roll_no): Path<i64>,
) -> Result<Json<BTreeMap<String, StreakInfo>>, AppError> {
    let records = {
        let conn = state.db.lock().await;
        db::records_for_roll(&conn, roll_no)?
    };
    Ok(Json(stats::subject_streaks(&records)))
}

pub async fn subject_attendance(
    State(state): State<Arc<AppState>>,
    Path(roll_no): Path<i64>,
) -> Result<Json<Vec<SubjectStat>>, AppError> {
    let records = {
        let conn = state.db.lock().await;
        db::records_for_roll(&conn, roll_no)?
    };
    Ok(Json(stats::subject_breakdown(&records, None)))
}
