use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::division::Division;

/// Fixed display formats for record date and time stamps.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            _ => None,
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Role::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown role {s:?}").into()))
    }
}

/// Attendance status, stored and serialized with the capitalized spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Present,
    Absent,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Absent => "Absent",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "Present" => Some(Status::Present),
            "Absent" => Some(Status::Absent),
            _ => None,
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Status::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown status {s:?}").into()))
    }
}

/// A registered identity. The password never serializes into responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<Division>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub roll_no: Option<i64>,
    pub division: Option<Division>,
    pub faculty_id: Option<String>,
}

/// One student's status for one class session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub roll_no: i64,
    pub subject: String,
    pub date: String,
    pub time: String,
    pub status: Status,
    pub division: Division,
}

pub fn open_store(dir: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(dir)?;
    let conn = Connection::open(dir.join("attendance.sqlite3"))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL,
            roll_no INTEGER,
            division TEXT,
            faculty_id TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_roll ON users(roll_no)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_records(
            id TEXT PRIMARY KEY,
            roll_no INTEGER NOT NULL,
            subject TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            status TEXT NOT NULL,
            division TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_roll ON attendance_records(roll_no)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_session ON attendance_records(subject, date, division)",
        [],
    )?;

    Ok(conn)
}

/// Wipes both collections. Used by the demo seeder.
pub fn clear_store(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DELETE FROM attendance_records", [])?;
    conn.execute("DELETE FROM users", [])?;
    Ok(())
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        roll_no: row.get(5)?,
        division: row.get(6)?,
        faculty_id: row.get(7)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password, role, roll_no, division, faculty_id";

pub fn create_user(conn: &Connection, new: &NewUser) -> anyhow::Result<User> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO users(id, name, email, password, role, roll_no, division, faculty_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            new.name,
            new.email,
            new.password,
            new.role,
            new.roll_no,
            new.division,
            new.faculty_id
        ],
    )?;
    Ok(User {
        id,
        name: new.name.clone(),
        email: new.email.clone(),
        password: new.password.clone(),
        role: new.role,
        roll_no: new.roll_no,
        division: new.division,
        faculty_id: new.faculty_id.clone(),
    })
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            [email],
            map_user,
        )
        .optional()?;
    Ok(user)
}

pub fn find_user_by_roll_no(conn: &Connection, roll_no: i64) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE roll_no = ?1"),
            [roll_no],
            map_user,
        )
        .optional()?;
    Ok(user)
}

pub fn count_students(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = 'student'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        roll_no: row.get(1)?,
        subject: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        status: row.get(5)?,
        division: row.get(6)?,
    })
}

const RECORD_COLUMNS: &str = "id, roll_no, subject, date, time, status, division";

/// Full snapshot in insertion order, which downstream aggregation treats
/// as the stable iteration order.
pub fn all_records(conn: &Connection) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records ORDER BY rowid"
    ))?;
    let records = stmt
        .query_map([], map_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn records_for_roll(conn: &Connection, roll_no: i64) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE roll_no = ?1 ORDER BY rowid"
    ))?;
    let records = stmt
        .query_map([roll_no], map_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn records_for_session(
    conn: &Connection,
    subject: &str,
    date: &str,
    division: Division,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records
         WHERE subject = ?1 AND date = ?2 AND division = ?3 ORDER BY rowid"
    ))?;
    let records = stmt
        .query_map(params![subject, date, division], map_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Replaces the whole (subject, date, division) session in one transaction.
/// Latest submission wins; the prior roster is never merged with the new one.
pub fn replace_session(
    conn: &mut Connection,
    subject: &str,
    date: &str,
    time: &str,
    division: Division,
    roster: &[(i64, Status)],
) -> anyhow::Result<usize> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM attendance_records WHERE date = ?1 AND subject = ?2 AND division = ?3",
        params![date, subject, division],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO attendance_records(id, roll_no, subject, date, time, status, division)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for &(roll_no, status) in roster {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                roll_no,
                subject,
                date,
                time,
                status,
                division
            ])?;
        }
    }
    tx.commit()?;
    Ok(roster.len())
}
