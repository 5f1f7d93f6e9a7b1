use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::db::{self, Status, DATE_FORMAT, TIME_FORMAT};
use crate::division::Division;
use crate::error::AppError;
use crate::notify::{self, AbsentStudent, SessionInfo};
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RosterEntry {
    pub roll_no: i64,
    pub status: Status,
}

/// A full class submission: the marked roster for one subject and division,
/// stamped with the submission moment.
#[derive(Debug, Clone)]
pub struct Submission {
    pub subject: String,
    pub division: Division,
    pub roster: Vec<RosterEntry>,
    pub faculty_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub message: &'static str,
    pub faculty_email_sent: bool,
    pub student_emails_sent: i64,
}

/// Stores the session and fires the absence notifications.
///
/// The write replaces any earlier submission for the same subject, date and
/// division in one transaction, so a re-marked class never leaves stale
/// rows behind. Mail goes out only after the store lock is released; both
/// reported counters reflect confirmed sends, not attempts.
pub async fn submit(state: &AppState, submission: Submission) -> Result<SubmitOutcome, AppError> {
    if submission.subject.trim().is_empty() || submission.roster.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let now = Local::now();
    let date = now.format(DATE_FORMAT).to_string();
    let time = now.format(TIME_FORMAT).to_string();

    let roster: Vec<(i64, Status)> = submission
        .roster
        .iter()
        .map(|entry| (entry.roll_no, entry.status))
        .collect();
    let absent_rolls: Vec<i64> = submission
        .roster
        .iter()
        .filter(|entry| entry.status == Status::Absent)
        .map(|entry| entry.roll_no)
        .collect();

    let absentees = {
        let mut conn = state.db.lock().await;
        let stored = db::replace_session(
            &mut conn,
            &submission.subject,
            &date,
            &time,
            submission.division,
            &roster,
        )?;
        info!(
            subject = %submission.subject,
            division = submission.division.as_str(),
            records = stored,
            "attendance session stored"
        );

        let mut absentees = Vec::with_capacity(absent_rolls.len());
        for &roll_no in &absent_rolls {
            let email = db::find_user_by_roll_no(&conn, roll_no)?.map(|user| user.email);
            absentees.push(AbsentStudent { roll_no, email });
        }
        absentees
    };

    let session = SessionInfo {
        subject: submission.subject.clone(),
        date,
        time,
        division: submission.division,
    };

    let faculty_email_sent = notify::notify_faculty(
        state.mailer.as_ref(),
        submission.faculty_email.as_deref(),
        &session,
        &absent_rolls,
    )
    .await;
    let outcomes = notify::notify_absent_students(state.mailer.as_ref(), &absentees, &session).await;

    Ok(SubmitOutcome {
        message: "Attendance submitted successfully",
        faculty_email_sent,
        student_emails_sent: notify::sent_count(&outcomes),
    })
}
