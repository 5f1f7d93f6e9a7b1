use tracing::{error, info};

use crate::division::Division;
use crate::mail::{MailTransport, Message};
use crate::stats::{StudentStat, POOR_ATTENDANCE_THRESHOLD};

/// The class a notification run is about.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub subject: String,
    pub date: String,
    pub time: String,
    pub division: Division,
}

#[derive(Debug, Clone)]
pub struct AbsentStudent {
    pub roll_no: i64,
    pub email: Option<String>,
}

/// What happened to one recipient. Only `Sent` counts toward the totals
/// reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NoAddress,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    pub roll_no: i64,
    pub outcome: SendOutcome,
}

pub fn sent_count(outcomes: &[RecipientOutcome]) -> i64 {
    outcomes
        .iter()
        .filter(|o| o.outcome == SendOutcome::Sent)
        .count() as i64
}

/// Emails the session report to the faculty address, if one was given.
/// Returns true only when the transport confirmed the send.
pub async fn notify_faculty(
    transport: &dyn MailTransport,
    faculty_email: Option<&str>,
    session: &SessionInfo,
    absent_rolls: &[i64],
) -> bool {
    let Some(to) = faculty_email else {
        return false;
    };
    let message = faculty_report_message(to, session, absent_rolls);
    match transport.send(&message).await {
        Ok(()) => {
            info!(to, subject = %session.subject, "faculty report sent");
            true
        }
        Err(e) => {
            error!(to, error = %e, "faculty report failed");
            false
        }
    }
}

/// Emails an absence alert to each student independently. A failed or
/// unaddressable recipient never blocks the rest.
pub async fn notify_absent_students(
    transport: &dyn MailTransport,
    absentees: &[AbsentStudent],
    session: &SessionInfo,
) -> Vec<RecipientOutcome> {
    let mut outcomes = Vec::with_capacity(absentees.len());
    for student in absentees {
        let outcome = match &student.email {
            None => {
                info!(roll_no = student.roll_no, "no email on file, skipping alert");
                SendOutcome::NoAddress
            }
            Some(to) => {
                let message = absence_alert_message(to, student.roll_no, session);
                match transport.send(&message).await {
                    Ok(()) => {
                        info!(roll_no = student.roll_no, to, "absence alert sent");
                        SendOutcome::Sent
                    }
                    Err(e) => {
                        error!(roll_no = student.roll_no, error = %e, "absence alert failed");
                        SendOutcome::Failed(e.to_string())
                    }
                }
            }
        };
        outcomes.push(RecipientOutcome {
            roll_no: student.roll_no,
            outcome,
        });
    }
    outcomes
}

/// Session report for the faculty inbox: class details plus the absentee
/// roll list, or a placeholder line when nobody was absent.
pub fn faculty_report_message(to: &str, session: &SessionInfo, absent_rolls: &[i64]) -> Message {
    let absent_list = if absent_rolls.is_empty() {
        "No students absent".to_string()
    } else {
        absent_rolls
            .iter()
            .map(|roll| format!("Roll No: {roll}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        "Attendance Report\n\n\
         Class Details:\n\
         Subject: {}\n\
         Date: {}\n\
         Time: {}\n\
         Division: {}\n\n\
         Absent Students ({}):\n\
         {}\n\n\
         This is an automated email from Student Attendance System.\n",
        session.subject,
        session.date,
        session.time,
        session.division.label(),
        absent_rolls.len(),
        absent_list,
    );

    Message {
        to: to.to_string(),
        subject: format!("Attendance Report - {} ({})", session.subject, session.date),
        body,
    }
}

/// Alert for one absent student, echoing the session fields back to them.
pub fn absence_alert_message(to: &str, roll_no: i64, session: &SessionInfo) -> Message {
    let body = format!(
        "Attendance Alert\n\n\
         You are absent today!\n\
         Subject: {}\n\
         Date: {}\n\
         Time: {}\n\
         Division: {}\n\
         Roll No: {}\n\n\
         Important: Regular attendance is mandatory. Please ensure you attend \
         future classes to maintain the required {}% attendance.\n\n\
         This is an automated notification from Student Attendance System.\n",
        session.subject,
        session.date,
        session.time,
        session.division.label(),
        roll_no,
        POOR_ATTENDANCE_THRESHOLD,
    );

    Message {
        to: to.to_string(),
        subject: format!("Attendance Alert - You are absent in {}", session.subject),
        body,
    }
}

/// Bulk warning for a student flagged below the attendance threshold.
pub fn warning_message(to: &str, name: &str, stat: &StudentStat) -> Message {
    let body = format!(
        "Attendance Warning\n\n\
         Dear {},\n\
         Your attendance is below the required {}% threshold.\n\
         Current Attendance: {}%\n\
         Roll No: {}\n\
         Classes Attended: {} / {}\n\n\
         Action Required: Please improve your attendance to meet the minimum \
         {}% requirement.\n",
        name,
        POOR_ATTENDANCE_THRESHOLD,
        stat.percentage,
        stat.roll_no,
        stat.present,
        stat.total,
        POOR_ATTENDANCE_THRESHOLD,
    );

    Message {
        to: to.to_string(),
        subject: "Attendance Warning - Action Required".to_string(),
        body,
    }
}

/// Targeted warning sent to one student on faculty request, regardless of
/// their current percentage.
pub fn individual_warning_message(to: &str, name: &str, roll_no: i64, percentage: i64) -> Message {
    let body = format!(
        "Individual Warning\n\n\
         Dear {name},\n\
         This is a personal warning regarding your attendance.\n\
         Current Status: {percentage}%\n\
         Roll No: {roll_no}\n\
         Please contact faculty for guidance on improving attendance.\n"
    );

    Message {
        to: to.to_string(),
        subject: "Individual Attendance Warning".to_string(),
        body,
    }
}
