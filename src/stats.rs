use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{AttendanceRecord, Status, DATE_FORMAT};
use crate::division::Division;

/// Attendance below this whole-number percentage flags a student.
pub const POOR_ATTENDANCE_THRESHOLD: i64 = 75;
/// Leaderboard points awarded per Present record.
pub const POINTS_PER_PRESENT: i64 = 10;
/// Leaderboard length cap.
pub const LEADERBOARD_SIZE: usize = 20;
/// The dashboard displays at most this many poor performers; the headline
/// count is never capped.
const DASHBOARD_POOR_LIMIT: usize = 20;

/// Whole-number attendance percentage, rounded half-up. Defined as 0 when
/// there are no records.
pub fn percentage(present: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (present as f64 / total as f64 * 100.0).round() as i64
}

/// Dates are stored in the fixed DD/MM/YYYY display format; comparisons must
/// go through the parsed value, never the raw string. Unparseable dates sort
/// oldest.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Orders records most recent first, preserving insertion order within a day.
pub fn sort_records_desc(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStat {
    pub roll_no: i64,
    pub present: i64,
    pub total: i64,
    pub percentage: i64,
}

/// Per-student present/total tallies over the snapshot, one entry per
/// distinct roll number in first-seen order.
pub fn student_stats(records: &[AttendanceRecord]) -> Vec<StudentStat> {
    let mut order: Vec<i64> = Vec::new();
    let mut tallies: HashMap<i64, (i64, i64)> = HashMap::new();
    for record in records {
        let (present, total) = tallies.entry(record.roll_no).or_insert_with(|| {
            order.push(record.roll_no);
            (0, 0)
        });
        *total += 1;
        if record.status == Status::Present {
            *present += 1;
        }
    }
    order
        .into_iter()
        .map(|roll_no| {
            let (present, total) = tallies[&roll_no];
            StudentStat {
                roll_no,
                present,
                total,
                percentage: percentage(present, total),
            }
        })
        .collect()
}

/// Students strictly below the threshold, worst first. Equal percentages
/// keep their first-seen order.
pub fn poor_performers(records: &[AttendanceRecord], threshold: i64) -> Vec<StudentStat> {
    let mut poor: Vec<StudentStat> = student_stats(records)
        .into_iter()
        .filter(|stat| stat.percentage < threshold)
        .collect();
    poor.sort_by_key(|stat| stat.percentage);
    poor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub subject: String,
    pub present: i64,
    pub absent: i64,
    pub percentage: i64,
}

/// Per-subject tallies, optionally restricted to one division. Subjects
/// appear in first-seen order.
pub fn subject_breakdown(
    records: &[AttendanceRecord],
    division: Option<Division>,
) -> Vec<SubjectStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, (i64, i64)> = HashMap::new();
    for record in records {
        if let Some(filter) = division {
            if record.division != filter {
                continue;
            }
        }
        let (present, total) = tallies.entry(record.subject.as_str()).or_insert_with(|| {
            order.push(record.subject.as_str());
            (0, 0)
        });
        *total += 1;
        if record.status == Status::Present {
            *present += 1;
        }
    }
    order
        .into_iter()
        .map(|subject| {
            let (present, total) = tallies[subject];
            SubjectStat {
                subject: subject.to_string(),
                present,
                absent: total - present,
                percentage: percentage(present, total),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRollup {
    pub subject: String,
    pub date: String,
    pub time: String,
    pub division: Division,
    pub present_count: i64,
    pub total_count: i64,
}

/// Groups the snapshot by (subject, date, division), most recent day first.
/// The group key deliberately omits `time`: repeat submissions for the same
/// session key on one day collapse into a single rollup carrying the first
/// record's time.
pub fn session_rollups(records: &[AttendanceRecord]) -> Vec<SessionRollup> {
    let mut index: HashMap<(String, String, Division), usize> = HashMap::new();
    let mut rollups: Vec<SessionRollup> = Vec::new();
    for record in records {
        let key = (record.subject.clone(), record.date.clone(), record.division);
        let slot = *index.entry(key).or_insert_with(|| {
            rollups.push(SessionRollup {
                subject: record.subject.clone(),
                date: record.date.clone(),
                time: record.time.clone(),
                division: record.division,
                present_count: 0,
                total_count: 0,
            });
            rollups.len() - 1
        });
        rollups[slot].total_count += 1;
        if record.status == Status::Present {
            rollups[slot].present_count += 1;
        }
    }
    rollups.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));
    rollups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInfo {
    pub current: i64,
    pub max: i64,
    pub is_active: bool,
}

/// Per-subject streaks for one student's records. History is ordered by
/// parsed date then time before scanning; the map is empty when the student
/// has no records.
pub fn subject_streaks(records: &[AttendanceRecord]) -> BTreeMap<String, StreakInfo> {
    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        parse_date(&a.date)
            .cmp(&parse_date(&b.date))
            .then_with(|| a.time.cmp(&b.time))
    });

    let mut by_subject: BTreeMap<&str, Vec<Status>> = BTreeMap::new();
    for record in &sorted {
        by_subject
            .entry(record.subject.as_str())
            .or_default()
            .push(record.status);
    }

    by_subject
        .into_iter()
        .map(|(subject, history)| (subject.to_string(), streak_of(&history)))
        .collect()
}

/// Streak rules over one subject's chronological history: `max` is the
/// longest Present run anywhere; the trailing Present run counts as the
/// current streak only once it reaches length 2, so a lone Present never
/// shows as an active streak.
fn streak_of(history: &[Status]) -> StreakInfo {
    let mut max = 0i64;
    let mut run = 0i64;
    for status in history {
        if *status == Status::Present {
            run += 1;
            if run > max {
                max = run;
            }
        } else {
            run = 0;
        }
    }
    // After the scan, `run` is the trailing Present run; zero means the
    // latest record was an absence.
    let is_active = run >= 2;
    StreakInfo {
        current: if is_active { run } else { 0 },
        max,
        is_active,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub roll_no: i64,
    pub division: &'static str,
    pub present: i64,
    pub total: i64,
    pub points: i64,
    pub percentage: i64,
}

/// Top students by points (10 per Present), capped at 20. Only students with
/// at least one record appear; equal points keep first-seen order. The
/// division label comes from the roll-number boundary, not the records.
pub fn leaderboard(records: &[AttendanceRecord]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = student_stats(records)
        .into_iter()
        .map(|stat| LeaderboardEntry {
            roll_no: stat.roll_no,
            division: Division::for_roll(stat.roll_no).label(),
            present: stat.present,
            total: stat.total,
            points: stat.present * POINTS_PER_PRESENT,
            percentage: stat.percentage,
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_classes: i64,
    pub avg_attendance: i64,
    pub poor_attendance: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_classes: Vec<SessionRollup>,
    pub poor_performers: Vec<StudentStat>,
}

/// The faculty landing aggregate. `avg_attendance` is the rounded mean of
/// the raw (unrounded) per-student ratios; `poor_attendance` counts every
/// flagged student even though the displayed list stops at 20.
pub fn dashboard(records: &[AttendanceRecord], total_students: i64) -> Dashboard {
    let stats = student_stats(records);
    let avg_attendance = if stats.is_empty() {
        0
    } else {
        let sum: f64 = stats
            .iter()
            .map(|s| s.present as f64 / s.total as f64 * 100.0)
            .sum();
        (sum / stats.len() as f64).round() as i64
    };

    let mut poor = poor_performers(records, POOR_ATTENDANCE_THRESHOLD);
    let poor_attendance = poor.len() as i64;
    poor.truncate(DASHBOARD_POOR_LIMIT);

    let rollups = session_rollups(records);

    Dashboard {
        stats: DashboardStats {
            total_students,
            total_classes: rollups.len() as i64,
            avg_attendance,
            poor_attendance,
        },
        recent_classes: rollups,
        poor_performers: poor,
    }
}

/// CSV export of the full snapshot, most recent day first, with a fixed
/// header row and division labels instead of wire identifiers.
pub fn report_csv(records: &[AttendanceRecord]) -> String {
    let mut rows: Vec<&AttendanceRecord> = records.iter().collect();
    rows.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));

    let mut csv = String::from("Date,Time,Subject,Division,Roll No,Status\n");
    for record in rows {
        let line = [
            csv_quote(&record.date),
            csv_quote(&record.time),
            csv_quote(&record.subject),
            csv_quote(record.division.label()),
            record.roll_no.to_string(),
            record.status.as_str().to_string(),
        ]
        .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

fn csv_quote(field: &str) -> String {
    let needs_quotes = field.chars().any(|c| matches!(c, ',' | '"' | '\n' | '\r'));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
