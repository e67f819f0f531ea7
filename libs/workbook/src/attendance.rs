//! Attendance workbook: one roster sheet per (date, course, room, session).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use seatplan_allocate::{AllocationRecord, Session};
use seatplan_codes::{CourseCode, RollNo, RoomNo};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::WorkbookResult;
use crate::export::write_header;

pub const ATTENDANCE_FILE: &str = "Attendance_Sheets.xlsx";

/// Name written for a roll missing from the name table.
pub const UNKNOWN_NAME: &str = "Unknown";

pub const ATTENDANCE_HEADERS: [&str; 3] = ["Roll_No", "Name", "Signature"];

/// Longest worksheet name a workbook accepts.
pub const MAX_SHEET_NAME: usize = 31;

const ILLEGAL_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Roll number to student name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameBook {
    names: BTreeMap<RollNo, String>,
}

impl NameBook {
    pub fn insert(&mut self, roll: RollNo, name: String) {
        self.names.insert(roll, name);
    }

    pub fn name_of(&self, roll: &RollNo) -> &str {
        self.names
            .get(roll)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(RollNo, String)> for NameBook {
    fn from_iter<I: IntoIterator<Item = (RollNo, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Students of one course in one room for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceSheet {
    /// Worksheet name, unique within the workbook.
    pub name: String,
    pub date: NaiveDate,
    pub session: Session,
    pub course: CourseCode,
    pub room: RoomNo,
    pub rolls: Vec<RollNo>,
}

type SheetKey = (NaiveDate, CourseCode, RoomNo, Session);

impl AttendanceSheet {
    /// Groups records into sheets in first-appearance order.
    ///
    /// The two halves of a sparse room produce two records with the same key;
    /// they land on one sheet with rolls in record order.
    pub fn project(records: &[AllocationRecord]) -> Vec<AttendanceSheet> {
        let mut index: HashMap<SheetKey, usize> = HashMap::new();
        let mut sheets: Vec<AttendanceSheet> = Vec::new();
        let mut names = SheetNamer::default();

        for record in records {
            let key = (
                record.date,
                record.course.clone(),
                record.room.clone(),
                record.session,
            );
            match index.get(&key) {
                Some(&i) => sheets[i].rolls.extend(record.rolls.iter().cloned()),
                None => {
                    index.insert(key, sheets.len());
                    sheets.push(AttendanceSheet {
                        name: names.assign(&sheet_title(record)),
                        date: record.date,
                        session: record.session,
                        course: record.course.clone(),
                        room: record.room.clone(),
                        rolls: record.rolls.clone(),
                    });
                }
            }
        }

        sheets
    }
}

/// `DD_MM_YYYY_<course>_<room>_<session>`, before sanitizing.
pub fn sheet_title(record: &AllocationRecord) -> String {
    format!(
        "{}_{}_{}_{}",
        record.date.format("%d_%m_%Y"),
        record.course,
        record.room,
        record.session
    )
}

/// Replaces characters a worksheet name may not contain and caps the length.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();

    // A name may not start or end with an apostrophe.
    if name.starts_with('\'') {
        name.replace_range(..1, "_");
    }
    if name.ends_with('\'') {
        name.pop();
        name.push('_');
    }
    name
}

/// Hands out worksheet names that are unique ignoring case.
#[derive(Debug, Default)]
struct SheetNamer {
    taken: HashSet<String>,
}

impl SheetNamer {
    fn assign(&mut self, title: &str) -> String {
        let base = sanitize_sheet_name(title);
        if self.taken.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 1usize;
        loop {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(keep).collect();
            let candidate = sanitize_sheet_name(&format!("{stem}{suffix}"));
            if self.taken.insert(candidate.to_lowercase()) {
                debug!(title, sheet = %candidate, "Renamed colliding attendance sheet");
                return candidate;
            }
            n += 1;
        }
    }
}

/// Writes one worksheet per sheet with `Roll_No`, `Name` and a blank
/// `Signature` column.
pub fn write_attendance(
    path: &Path,
    sheets: &[AttendanceSheet],
    names: &NameBook,
) -> WorkbookResult<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_header(worksheet, &ATTENDANCE_HEADERS)?;

        for (i, roll) in sheet.rolls.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_string(row, 0, roll.as_str())?;
            worksheet.write_string(row, 1, names.name_of(roll))?;
            worksheet.write_string(row, 2, "")?;
        }
    }

    if sheets.is_empty() {
        write_header(workbook.add_worksheet(), &ATTENDANCE_HEADERS)?;
    }

    workbook.save(path)?;
    info!(path = %path.display(), sheets = sheets.len(), "Wrote attendance workbook");
    Ok(())
}
