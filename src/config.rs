use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::warn;

/// Outbound mail settings. Absent entirely when no mail API is configured,
/// in which case sends are logged instead of delivered.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub url: String,
    pub token: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_dir: PathBuf,
    pub frontend_origins: Vec<String>,
    pub demo_login: bool,
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let mail = env::var("ATTENDANCE_MAIL_URL").ok().map(|url| MailConfig {
            url,
            token: env::var("ATTENDANCE_MAIL_TOKEN").ok(),
            from: env_or(
                "ATTENDANCE_MAIL_FROM",
                "Student Attendance System <no-reply@attendance.local>",
            ),
        });

        Self {
            port: parse_or("ATTENDANCE_PORT", 3001),
            db_dir: PathBuf::from(env_or("ATTENDANCE_DB_DIR", "data")),
            frontend_origins: env_or("ATTENDANCE_FRONTEND_ORIGIN", "http://localhost:5173")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            demo_login: flag_or("ATTENDANCE_DEMO_LOGIN", true),
            mail,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid {key} value {raw:?}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

fn flag_or(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => parse_boolish(&raw).unwrap_or_else(|| {
            warn!("invalid {key} value {raw:?}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

fn parse_boolish(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
