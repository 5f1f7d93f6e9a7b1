use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::db::{self, NewUser, Role};
use crate::error::AppError;
use crate::http::params::{json_body, optional_str, required_division, required_roll, required_str};
use crate::state::AppState;

/// Demo credentials honored when demo login is enabled. They resolve to a
/// fixed profile without touching the store, so the app can be tried before
/// anyone registers.
const DEMO_EMAIL: &str = "at@gmail.com";
const DEMO_PASSWORD: &str = "at123";

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let params = json_body(body)?;
    let name = required_str(&params, "name")?;
    let email = required_str(&params, "email")?;
    let password = required_str(&params, "password")?;
    let role = Role::parse(&required_str(&params, "role")?)
        .ok_or_else(|| AppError::Validation("Invalid role".to_string()))?;

    let (roll_no, division, faculty_id) = match role {
        Role::Student => {
            let roll_no = required_roll(&params, "rollNo")?;
            let division = required_division(&params, "division")?;
            if !division.contains_roll(roll_no) {
                let range = division.roll_range();
                return Err(AppError::Validation(format!(
                    "{}: Roll number must be between {}-{}",
                    division.label(),
                    range.start(),
                    range.end(),
                )));
            }
            (Some(roll_no), Some(division), None)
        }
        Role::Faculty => (None, None, optional_str(&params, "facultyId")),
    };

    let user = {
        let conn = state.db.lock().await;
        if db::find_user_by_email(&conn, &email)?.is_some() {
            return Err(AppError::Duplicate("User already exists".to_string()));
        }
        if let Some(roll) = roll_no {
            if db::find_user_by_roll_no(&conn, roll)?.is_some() {
                return Err(AppError::Duplicate("Roll number already exists".to_string()));
            }
        }
        db::create_user(
            &conn,
            &NewUser {
                name,
                email,
                password,
                role,
                roll_no,
                division,
                faculty_id,
            },
        )?
    };

    info!(email = %user.email, role = user.role.as_str(), "user registered");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let params = json_body(body)?;
    let email = required_str(&params, "email")?;
    let password = required_str(&params, "password")?;

    if state.config.demo_login && email == DEMO_EMAIL && password == DEMO_PASSWORD {
        return Ok(Json(json!({
            "user": {
                "id": "test123",
                "name": "Test User",
                "email": DEMO_EMAIL,
                "role": "student"
            }
        })));
    }

    let user = {
        let conn = state.db.lock().await;
        db::find_user_by_email(&conn, &email)?
    };
    match user {
        Some(user) if user.password == password => Ok(Json(json!({ "user": user }))),
        _ => Err(AppError::Validation("Invalid credentials".to_string())),
    }
}
