//! Request-body field extraction. Handlers take the raw JSON value and pull
//! fields through these helpers so every missing or malformed field turns
//! into the same 400 envelope the frontend expects.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::db::Status;
use crate::division::Division;
use crate::error::AppError;
use crate::submit::RosterEntry;

pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    }
}

pub fn required_str(params: &Value, key: &str) -> Result<String, AppError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Missing required fields".to_string()))
}

pub fn optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Roll numbers arrive as JSON numbers from the roster grid and as strings
/// from the signup form; both spellings are accepted everywhere.
pub fn required_roll(params: &Value, key: &str) -> Result<i64, AppError> {
    params
        .get(key)
        .and_then(roll_value)
        .ok_or_else(|| AppError::Validation("Invalid roll number".to_string()))
}

fn roll_value(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// A missing division trips the generic required-fields error; a present
/// but unknown identifier gets the more specific message.
pub fn required_division(params: &Value, key: &str) -> Result<Division, AppError> {
    let raw = params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("Missing required fields".to_string()))?;
    Division::parse(raw).ok_or_else(|| AppError::Validation("Invalid division".to_string()))
}

/// The marked roster: an array of `{rollNo, status}` objects. An empty
/// array is allowed here; the submission layer rejects it.
pub fn roster_entries(params: &Value, key: &str) -> Result<Vec<RosterEntry>, AppError> {
    let items = params
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Validation("Missing required fields".to_string()))?;

    let mut roster = Vec::with_capacity(items.len());
    for item in items {
        let roll_no = item
            .get("rollNo")
            .and_then(roll_value)
            .ok_or_else(|| AppError::Validation("Invalid roll number".to_string()))?;
        let status = item
            .get("status")
            .and_then(|v| v.as_str())
            .and_then(Status::parse)
            .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?;
        roster.push(RosterEntry { roll_no, status });
    }
    Ok(roster)
}
