//! Typed readers for the four input tables.
//!
//! Each reader checks the header row once, then converts every non-blank row.
//! The first bad row fails the whole table.

use std::path::Path;

use seatplan_allocate::{Enrollment, RawRoom, RawTimetableRow};
use seatplan_codes::{CodeError, CourseCode, RollNo, RoomNo};
use tracing::info;

use crate::attendance::NameBook;
use crate::error::WorkbookResult;
use crate::table::{Record, Table};

pub const ROSTER_TABLE: &str = "roster";
pub const ROOMS_TABLE: &str = "rooms";
pub const TIMETABLE_TABLE: &str = "timetable";
pub const NAMES_TABLE: &str = "names";

pub const COL_COURSE_CODE: &str = "course_code";
pub const COL_ROLL_NO: &str = "rollno";
pub const COL_ROOM_NO: &str = "Room No.";
pub const COL_EXAM_CAPACITY: &str = "Exam Capacity";
pub const COL_DATE: &str = "Date";
pub const COL_MORNING: &str = "Morning";
pub const COL_EVENING: &str = "Evening";
pub const COL_ROLL: &str = "Roll";
pub const COL_NAME: &str = "Name";

pub fn read_roster(path: &Path) -> WorkbookResult<Vec<Enrollment>> {
    let rows = roster_from_table(&Table::open(ROSTER_TABLE, path)?)?;
    info!(path = %path.display(), enrollments = rows.len(), "Read roster");
    Ok(rows)
}

pub fn read_rooms(path: &Path) -> WorkbookResult<Vec<RawRoom>> {
    let rooms = rooms_from_table(&Table::open(ROOMS_TABLE, path)?)?;
    info!(path = %path.display(), rooms = rooms.len(), "Read rooms");
    Ok(rooms)
}

pub fn read_timetable(path: &Path) -> WorkbookResult<Vec<RawTimetableRow>> {
    let rows = timetable_from_table(&Table::open(TIMETABLE_TABLE, path)?)?;
    info!(path = %path.display(), days = rows.len(), "Read timetable");
    Ok(rows)
}

pub fn read_names(path: &Path) -> WorkbookResult<NameBook> {
    let names = names_from_table(&Table::open(NAMES_TABLE, path)?)?;
    info!(path = %path.display(), names = names.len(), "Read names");
    Ok(names)
}

pub fn roster_from_table(table: &Table) -> WorkbookResult<Vec<Enrollment>> {
    let course = table.column(COL_COURSE_CODE)?;
    let roll = table.column(COL_ROLL_NO)?;

    table
        .records()
        .map(|record| {
            Ok(Enrollment::new(
                code(&record, course, COL_COURSE_CODE, CourseCode::parse)?,
                code(&record, roll, COL_ROLL_NO, RollNo::parse)?,
            ))
        })
        .collect()
}

pub fn rooms_from_table(table: &Table) -> WorkbookResult<Vec<RawRoom>> {
    let room = table.column(COL_ROOM_NO)?;
    let capacity = table.column(COL_EXAM_CAPACITY)?;

    table
        .records()
        .map(|record| {
            Ok(RawRoom::new(
                code(&record, room, COL_ROOM_NO, RoomNo::parse)?,
                record.count(capacity, COL_EXAM_CAPACITY)?,
            ))
        })
        .collect()
}

/// Date cells are kept as text; the timetable normalizer parses them.
pub fn timetable_from_table(table: &Table) -> WorkbookResult<Vec<RawTimetableRow>> {
    let date = table.column(COL_DATE)?;
    let morning = table.column(COL_MORNING)?;
    let evening = table.column(COL_EVENING)?;

    table
        .records()
        .map(|record| {
            Ok(RawTimetableRow {
                date: record.required(date, COL_DATE)?,
                morning: record.text(morning).unwrap_or_default(),
                evening: record.text(evening).unwrap_or_default(),
            })
        })
        .collect()
}

/// Rows without a name are skipped; later rows win on a repeated roll.
pub fn names_from_table(table: &Table) -> WorkbookResult<NameBook> {
    let roll = table.column(COL_ROLL)?;
    let name = table.column(COL_NAME)?;

    let mut book = NameBook::default();
    for record in table.records() {
        let roll_no = code(&record, roll, COL_ROLL, RollNo::parse)?;
        if let Some(name) = record.text(name) {
            book.insert(roll_no, name);
        }
    }
    Ok(book)
}

fn code<T>(
    record: &Record<'_>,
    index: usize,
    column: &'static str,
    parse: impl Fn(&str) -> Result<T, CodeError>,
) -> WorkbookResult<T> {
    let text = record.required(index, column)?;
    parse(&text).map_err(|err| record.invalid(column, err.to_string()))
}
