mod support;

use attendanced::db::Status;
use attendanced::division::Division;
use axum::http::StatusCode;
use serde_json::json;
use support::{get_json, insert_session, test_app, TestApp};

async fn math_history(app: &TestApp, roll_no: i64, days: &[(&str, Status)]) {
    for (date, status) in days {
        insert_session(
            &app.state,
            "Math",
            date,
            "09:00:00",
            Division::Div1,
            &[(roll_no, *status)],
        )
        .await;
    }
}

#[tokio::test]
async fn trailing_presents_form_the_active_streak() {
    let app = test_app();
    math_history(
        &app,
        7,
        &[
            ("01/01/2024", Status::Present),
            ("02/01/2024", Status::Present),
            ("03/01/2024", Status::Absent),
            ("04/01/2024", Status::Present),
            ("05/01/2024", Status::Present),
            ("06/01/2024", Status::Present),
        ],
    )
    .await;

    let (status, body) = get_json(&app.router, "/student/streaks/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Math"]["current"], 3, "{body}");
    assert_eq!(body["Math"]["max"], 3);
    assert_eq!(body["Math"]["isActive"], true);
}

#[tokio::test]
async fn a_single_trailing_present_is_not_active() {
    let app = test_app();
    math_history(
        &app,
        7,
        &[
            ("01/01/2024", Status::Absent),
            ("02/01/2024", Status::Present),
        ],
    )
    .await;

    let (_, body) = get_json(&app.router, "/student/streaks/7").await;
    assert_eq!(body["Math"]["current"], 0, "one day is not a streak: {body}");
    assert_eq!(body["Math"]["max"], 1);
    assert_eq!(body["Math"]["isActive"], false);
}

#[tokio::test]
async fn an_absence_on_the_latest_day_ends_the_streak() {
    let app = test_app();
    math_history(
        &app,
        7,
        &[
            ("01/01/2024", Status::Present),
            ("02/01/2024", Status::Present),
            ("03/01/2024", Status::Present),
            ("04/01/2024", Status::Absent),
        ],
    )
    .await;

    let (_, body) = get_json(&app.router, "/student/streaks/7").await;
    assert_eq!(body["Math"]["current"], 0);
    assert_eq!(body["Math"]["max"], 3, "history still remembers the best run");
    assert_eq!(body["Math"]["isActive"], false);
}

#[tokio::test]
async fn history_is_ordered_by_parsed_date_not_string_order() {
    let app = test_app();
    // Inserted out of order; chronological is 28/12 (A), 02/01 (P), 15/01 (P).
    // A lexicographic sort would put 28/12/2023 last and break the run.
    math_history(
        &app,
        7,
        &[
            ("02/01/2024", Status::Present),
            ("28/12/2023", Status::Absent),
            ("15/01/2024", Status::Present),
        ],
    )
    .await;

    let (_, body) = get_json(&app.router, "/student/streaks/7").await;
    assert_eq!(body["Math"]["current"], 2, "{body}");
    assert_eq!(body["Math"]["isActive"], true);
}

#[tokio::test]
async fn streaks_are_scoped_per_subject() {
    let app = test_app();
    math_history(
        &app,
        7,
        &[
            ("01/01/2024", Status::Present),
            ("02/01/2024", Status::Present),
        ],
    )
    .await;
    insert_session(
        &app.state,
        "Physics",
        "02/01/2024",
        "11:00:00",
        Division::Div1,
        &[(7, Status::Absent)],
    )
    .await;

    let (_, body) = get_json(&app.router, "/student/streaks/7").await;
    assert_eq!(body["Math"]["current"], 2);
    assert_eq!(body["Math"]["isActive"], true);
    assert_eq!(body["Physics"]["current"], 0);
    assert_eq!(body["Physics"]["max"], 0);
}

#[tokio::test]
async fn unknown_roll_gets_an_empty_map() {
    let app = test_app();
    let (status, body) = get_json(&app.router, "/student/streaks/55").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}
