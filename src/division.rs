use std::ops::RangeInclusive;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// The two fixed cohorts. Each owns a disjoint, contiguous roll-number
/// range; a roll number can never belong to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Div1,
    Div2,
}

impl Division {
    /// Wire identifier used in requests and stored rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Division::Div1 => "div1",
            Division::Div2 => "div2",
        }
    }

    /// Human-readable label used in reports, mails and the leaderboard.
    pub fn label(self) -> &'static str {
        match self {
            Division::Div1 => "Division 1",
            Division::Div2 => "Division 2",
        }
    }

    pub fn parse(s: &str) -> Option<Division> {
        match s {
            "div1" => Some(Division::Div1),
            "div2" => Some(Division::Div2),
            _ => None,
        }
    }

    /// Inclusive roll-number range assigned to this division.
    pub fn roll_range(self) -> RangeInclusive<i64> {
        match self {
            Division::Div1 => 1..=91,
            Division::Div2 => 92..=167,
        }
    }

    pub fn contains_roll(self, roll_no: i64) -> bool {
        self.roll_range().contains(&roll_no)
    }

    /// Division a bare roll number is attributed to, by the range boundary.
    pub fn for_roll(roll_no: i64) -> Division {
        if roll_no <= 91 {
            Division::Div1
        } else {
            Division::Div2
        }
    }
}

impl ToSql for Division {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Division {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Division::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown division {s:?}").into()))
    }
}
