//! Wipes the store and loads the demo roster: ten Division 1 students with
//! roll numbers 1-10 plus the fixed test account.

use attendanced::config::Config;
use attendanced::db::{self, NewUser, Role};
use attendanced::division::Division;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env();
    let conn = db::open_store(&config.db_dir)?;
    db::clear_store(&conn)?;

    for i in 1..=10i64 {
        db::create_user(
            &conn,
            &NewUser {
                name: format!("Student {i}"),
                email: format!("student{i}@demo.com"),
                password: format!("pass{i}"),
                role: Role::Student,
                roll_no: Some(i),
                division: Some(Division::Div1),
                faculty_id: None,
            },
        )?;
    }
    info!("created 10 demo students (rolls 1-10, Division 1)");

    // The test account keeps its historical roll number 99, which falls in
    // the Division 2 range.
    db::create_user(
        &conn,
        &NewUser {
            name: "Test User".to_string(),
            email: "at@gmail.com".to_string(),
            password: "at123".to_string(),
            role: Role::Student,
            roll_no: Some(99),
            division: Some(Division::Div2),
            faculty_id: None,
        },
    )?;
    info!("created test account at@gmail.com / at123");

    for i in 1..=10 {
        info!("roll {i}: student{i}@demo.com / pass{i}");
    }
    Ok(())
}
