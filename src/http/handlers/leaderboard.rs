use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::stats::{self, LeaderboardEntry};

pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let records = {
        let conn = state.db.lock().await;
        db::all_records(&conn)?
    };
    Ok(Json(stats::leaderboard(&records)))
}
