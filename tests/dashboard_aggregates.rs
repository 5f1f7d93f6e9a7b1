mod support;

use attendanced::db::Status;
use attendanced::division::Division;
use axum::http::StatusCode;
use support::{get_json, insert_session, register_student, test_app};

#[tokio::test]
async fn headline_stats_cover_roster_classes_and_average() {
    let app = test_app();
    register_student(&app.router, "Student 1", "s1@demo.com", 1, "div1").await;
    register_student(&app.router, "Student 2", "s2@demo.com", 2, "div1").await;
    register_student(&app.router, "Student 3", "s3@demo.com", 3, "div1").await;

    // Roll 1 attends 1 of 2, roll 2 attends 2 of 2. Average of the raw
    // ratios is (50 + 100) / 2 = 75. Roll 3 never appears in a session.
    insert_session(
        &app.state,
        "Math",
        "01/01/2024",
        "09:00:00",
        Division::Div1,
        &[(1, Status::Present), (2, Status::Present)],
    )
    .await;
    insert_session(
        &app.state,
        "Math",
        "02/01/2024",
        "09:00:00",
        Division::Div1,
        &[(1, Status::Absent), (2, Status::Present)],
    )
    .await;

    let (status, body) = get_json(&app.router, "/faculty/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalStudents"], 3, "registered roster, not records: {body}");
    assert_eq!(body["stats"]["totalClasses"], 2);
    assert_eq!(body["stats"]["avgAttendance"], 75);
    assert_eq!(body["stats"]["poorAttendance"], 1, "only roll 1 is below 75%");
}

#[tokio::test]
async fn poor_performers_use_a_strict_threshold_and_sort_worst_first() {
    let app = test_app();
    // Over four days: roll 1 at 50%, roll 2 at exactly 75%, roll 3 at 25%.
    let days = ["01/01/2024", "02/01/2024", "03/01/2024", "04/01/2024"];
    for (i, date) in days.iter().enumerate() {
        insert_session(
            &app.state,
            "Math",
            date,
            "09:00:00",
            Division::Div1,
            &[
                (1, if i < 2 { Status::Present } else { Status::Absent }),
                (2, if i < 3 { Status::Present } else { Status::Absent }),
                (3, if i < 1 { Status::Present } else { Status::Absent }),
            ],
        )
        .await;
    }

    let (_, body) = get_json(&app.router, "/faculty/dashboard").await;
    let poor = body["poorPerformers"].as_array().unwrap();
    let rolls: Vec<i64> = poor
        .iter()
        .map(|entry| entry["rollNo"].as_i64().unwrap())
        .collect();
    assert_eq!(rolls, vec![3, 1], "75% exactly stays off the list: {body}");
    assert_eq!(poor[0]["percentage"], 25);
    assert_eq!(poor[1]["percentage"], 50);
}

#[tokio::test]
async fn poor_count_is_not_capped_by_the_display_list() {
    let app = test_app();
    let roster: Vec<(i64, Status)> = (1..=23).map(|roll| (roll, Status::Absent)).collect();
    insert_session(
        &app.state,
        "Math",
        "01/01/2024",
        "09:00:00",
        Division::Div1,
        &roster,
    )
    .await;

    let (_, body) = get_json(&app.router, "/faculty/dashboard").await;
    assert_eq!(body["stats"]["poorAttendance"], 23);
    assert_eq!(
        body["poorPerformers"].as_array().unwrap().len(),
        20,
        "display list stops at twenty"
    );
}

#[tokio::test]
async fn recent_classes_sort_by_parsed_date_and_split_divisions() {
    let app = test_app();
    insert_session(
        &app.state,
        "Math",
        "28/12/2023",
        "09:00:00",
        Division::Div1,
        &[(1, Status::Present)],
    )
    .await;
    insert_session(
        &app.state,
        "Math",
        "02/01/2024",
        "09:00:00",
        Division::Div1,
        &[(1, Status::Present), (2, Status::Absent)],
    )
    .await;
    insert_session(
        &app.state,
        "Math",
        "02/01/2024",
        "10:00:00",
        Division::Div2,
        &[(92, Status::Present)],
    )
    .await;

    let (_, body) = get_json(&app.router, "/faculty/dashboard").await;
    let classes = body["recentClasses"].as_array().unwrap();
    assert_eq!(classes.len(), 3, "same day, different division stays split");
    assert_eq!(
        classes[0]["date"], "02/01/2024",
        "string order would put 28/12/2023 first: {body}"
    );
    assert_eq!(classes[2]["date"], "28/12/2023");

    let div1_on_jan2 = classes
        .iter()
        .find(|c| c["date"] == "02/01/2024" && c["division"] == "div1")
        .unwrap();
    assert_eq!(div1_on_jan2["presentCount"], 1);
    assert_eq!(div1_on_jan2["totalCount"], 2);
}

#[tokio::test]
async fn empty_store_reports_zeroes() {
    let app = test_app();
    let (status, body) = get_json(&app.router, "/faculty/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalStudents"], 0);
    assert_eq!(body["stats"]["totalClasses"], 0);
    assert_eq!(body["stats"]["avgAttendance"], 0);
    assert_eq!(body["stats"]["poorAttendance"], 0);
    assert!(body["recentClasses"].as_array().unwrap().is_empty());
    assert!(body["poorPerformers"].as_array().unwrap().is_empty());
}
