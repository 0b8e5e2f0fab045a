//! Data model of an extracted course schedule.

use std::{collections::BTreeMap, fmt};

use chrono::{NaiveDate, NaiveTime, Weekday};

use crate::error::FormatError;

/// A two-letter weekday code as used in recurrence rules (`MO`, `TU`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCode {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl DayCode {
    /// Parse a case-insensitive two-letter code.
    pub fn parse(code: &str) -> Result<Self, FormatError> {
        match code.to_uppercase().as_str() {
            "MO" => Ok(Self::Mo),
            "TU" => Ok(Self::Tu),
            "WE" => Ok(Self::We),
            "TH" => Ok(Self::Th),
            "FR" => Ok(Self::Fr),
            "SA" => Ok(Self::Sa),
            "SU" => Ok(Self::Su),
            _ => Err(FormatError::DayCode(code.to_string())),
        }
    }

    /// The canonical upper-case code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mo => "MO",
            Self::Tu => "TU",
            Self::We => "WE",
            Self::Th => "TH",
            Self::Fr => "FR",
            Self::Sa => "SA",
            Self::Su => "SU",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            Self::Mo => Weekday::Mon,
            Self::Tu => Weekday::Tue,
            Self::We => Weekday::Wed,
            Self::Th => Weekday::Thu,
            Self::Fr => Weekday::Fri,
            Self::Sa => Weekday::Sat,
            Self::Su => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One recurring weekly time slot of a course component.
///
/// Fields are written once during extraction, except `start_date` which
/// recurrence derivation may shift forward so that its weekday matches the
/// first entry of `days`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingBlock {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Ordered weekday codes the block recurs on.
    pub days: Vec<DayCode>,
    /// Full street address when the building code is known, the literal
    /// source text otherwise.
    pub building: String,
    pub room: String,
    pub instructor: String,
    pub class_number: String,
    pub section: String,
    /// Component label shortened to three characters, e.g. `Lec`.
    pub component: String,
}

/// A single course with its meeting blocks keyed by component type.
///
/// Keys are the upper-cased three-letter component prefixes (`LEC`, `TUT`,
/// `LAB`); at most one block per component, last seen wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub title: String,
    pub subtitle: String,
    pub credit_units: String,
    pub meeting_blocks: BTreeMap<String, MeetingBlock>,
}

/// All courses of one extraction run, keyed by course title.
pub type CourseSet = BTreeMap<String, Course>;

/// Weekly recurrence rule body for a block, e.g.
/// `FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20230810T000000Z`.
pub fn weekly_rule(days: &[DayCode], until: NaiveDate) -> String {
    let by_day: Vec<&str> = days.iter().map(DayCode::code).collect();
    format!(
        "FREQ=WEEKLY;BYDAY={};UNTIL={}T000000Z",
        by_day.join(","),
        until.format("%Y%m%d")
    )
}
