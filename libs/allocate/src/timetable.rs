//! Timetable normalization.
//!
//! Each input row carries a date and two course lists. A course list is a
//! `;`-separated sequence of course codes or the `NO EXAM` sentinel. The
//! normalizer emits one slot per (date, session) and orders each slot's
//! courses largest roster first so big classes get first pick of rooms.

use std::cmp::Reverse;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use seatplan_codes::CourseCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AllocError, AllocResult};
use crate::roster::RosterIndex;

/// Course-list sentinel for an empty slot.
pub const NO_EXAM: &str = "NO EXAM";

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Exam session within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Morning,
    Evening,
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Evening => "evening",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timetable row as read from the timetable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimetableRow {
    pub date: String,
    pub morning: String,
    pub evening: String,
}

/// Identifies one (date, session) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub session: Session,
}

impl SlotKey {
    /// English weekday name, e.g. `Saturday`.
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.session)
    }
}

/// A course scheduled in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledCourse {
    pub code: CourseCode,
    pub roster_size: usize,
    /// False when the course has no roster; it seats nobody.
    pub known: bool,
}

/// One (date, session) unit of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableSlot {
    pub key: SlotKey,
    /// Courses largest roster first; empty for a `NO EXAM` slot.
    pub courses: Vec<ScheduledCourse>,
}

impl TimetableSlot {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Students the slot needs seats for.
    pub fn demand(&self) -> usize {
        self.courses.iter().map(|c| c.roster_size).sum()
    }
}

/// Normalized timetable, in input order with morning before evening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timetable {
    slots: Vec<TimetableSlot>,
}

impl Timetable {
    /// Normalizes raw rows against the roster index.
    ///
    /// Fails with `MalformedDate` on the first unparseable date so no partial
    /// timetable is produced.
    pub fn normalize(
        rows: impl IntoIterator<Item = RawTimetableRow>,
        roster: &RosterIndex,
    ) -> AllocResult<Self> {
        let mut slots = Vec::new();

        for row in rows {
            let date = parse_exam_date(&row.date)?;
            let lists = [(Session::Morning, &row.morning), (Session::Evening, &row.evening)];
            for (session, list) in lists {
                let key = SlotKey { date, session };
                let courses = schedule_courses(&key, list, roster)?;
                slots.push(TimetableSlot { key, courses });
            }
        }

        debug!(slot_count = slots.len(), "Normalized timetable");
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[TimetableSlot] {
        &self.slots
    }

    /// Slots with at least one course.
    pub fn exam_slots(&self) -> impl Iterator<Item = &TimetableSlot> {
        self.slots.iter().filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Parses a timetable date in one of the accepted layouts.
pub fn parse_exam_date(raw: &str) -> AllocResult<NaiveDate> {
    let trimmed = raw.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    Err(AllocError::MalformedDate(raw.to_string()))
}

/// Splits a course-list cell. Blank cells and `NO EXAM` mean an empty slot.
pub fn parse_course_list(raw: &str) -> AllocResult<Vec<CourseCode>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_EXAM) {
        return Ok(Vec::new());
    }

    trimmed
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| CourseCode::parse(entry).map_err(AllocError::from))
        .collect()
}

fn schedule_courses(
    key: &SlotKey,
    list: &str,
    roster: &RosterIndex,
) -> AllocResult<Vec<ScheduledCourse>> {
    let mut courses: Vec<ScheduledCourse> = parse_course_list(list)?
        .into_iter()
        .map(|code| {
            let size = roster.size_of(&code);
            if size.is_none() {
                warn!(slot = %key, course = %code, "Scheduled course has no roster; treating as empty");
            }
            ScheduledCourse {
                roster_size: size.unwrap_or(0),
                known: size.is_some(),
                code,
            }
        })
        .collect();

    // Stable: equal sizes keep input order, unknown courses go last.
    courses.sort_by_key(|c| (Reverse(c.roster_size), !c.known));
    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Enrollment;
    use rstest::rstest;
    use seatplan_codes::RollNo;

    fn roster(entries: &[(&str, usize)]) -> RosterIndex {
        let mut rows = Vec::new();
        for (course, size) in entries {
            for i in 0..*size {
                rows.push(Enrollment::new(
                    CourseCode::parse(course).unwrap(),
                    RollNo::parse(&format!("{course}-{i:03}")).unwrap(),
                ));
            }
        }
        RosterIndex::build(rows)
    }

    fn row(date: &str, morning: &str, evening: &str) -> RawTimetableRow {
        RawTimetableRow {
            date: date.to_string(),
            morning: morning.to_string(),
            evening: evening.to_string(),
        }
    }

    fn codes(slot: &TimetableSlot) -> Vec<&str> {
        slot.courses.iter().map(|c| c.code.as_str()).collect()
    }

    #[rstest]
    #[case("2024-05-04 00:00:00")]
    #[case("2024-05-04T09:30:00")]
    #[case("2024-05-04")]
    #[case("04-05-2024")]
    #[case("04/05/2024")]
    #[case(" 04.05.2024 ")]
    fn test_parse_exam_date_formats(#[case] raw: &str) {
        let date = parse_exam_date(raw).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2024-13-01")]
    fn test_parse_exam_date_malformed(#[case] raw: &str) {
        assert_eq!(
            parse_exam_date(raw).unwrap_err(),
            AllocError::MalformedDate(raw.to_string())
        );
    }

    #[rstest]
    #[case("NO EXAM", 0)]
    #[case("no exam", 0)]
    #[case("   ", 0)]
    #[case("CS101", 1)]
    #[case("CS101; MA101", 2)]
    #[case("CS101;MA101;", 2)]
    fn test_parse_course_list(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(parse_course_list(raw).unwrap().len(), expected);
    }

    #[test]
    fn test_slots_in_order() {
        let timetable = Timetable::normalize(
            vec![
                row("2024-05-04", "CS101", "NO EXAM"),
                row("2024-05-06", "NO EXAM", "MA101"),
            ],
            &roster(&[("CS101", 2), ("MA101", 1)]),
        )
        .unwrap();

        let keys: Vec<String> = timetable.slots().iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "2024-05-04 morning",
                "2024-05-04 evening",
                "2024-05-06 morning",
                "2024-05-06 evening"
            ]
        );
        assert_eq!(timetable.exam_slots().count(), 2);
        assert_eq!(timetable.slots()[0].key.weekday_name(), "Saturday");
    }

    #[test]
    fn test_courses_sorted_by_roster_size() {
        let timetable = Timetable::normalize(
            vec![row("2024-05-04", "A; GHOST; B; C", "NO EXAM")],
            &roster(&[("A", 1), ("B", 5), ("C", 5)]),
        )
        .unwrap();

        let slot = &timetable.slots()[0];
        // B and C tie and keep input order; the unknown course sorts last
        assert_eq!(codes(slot), vec!["B", "C", "A", "GHOST"]);
        assert!(!slot.courses[3].known);
        assert_eq!(slot.courses[3].roster_size, 0);
        assert_eq!(slot.demand(), 11);
    }

    #[test]
    fn test_malformed_date_aborts() {
        let result = Timetable::normalize(
            vec![row("2024-05-04", "A", "B"), row("not a date", "A", "B")],
            &RosterIndex::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            AllocError::MalformedDate("not a date".to_string())
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let index = roster(&[("A", 3), ("B", 3)]);
        let rows = vec![row("2024-05-04", "A; B", "B; A")];
        let first = Timetable::normalize(rows.clone(), &index).unwrap();
        let second = Timetable::normalize(rows, &index).unwrap();
        assert_eq!(first, second);
    }
}
