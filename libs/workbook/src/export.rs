//! Allocation table export.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use seatplan_allocate::AllocationRecord;
use tracing::info;

use crate::error::WorkbookResult;

pub const ALLOCATION_FILE: &str = "exam_allocation.xlsx";
pub const ALLOCATION_SHEET: &str = "Allocation";

pub const ALLOCATION_HEADERS: [&str; 7] = [
    "Date",
    "Day",
    "Time",
    "course_code",
    "Room",
    "Allocated_students_count",
    "Roll_list",
];

// Allocated_students_count is written as a number.
const COUNT_COLUMN: u16 = 5;

/// One row of the allocation table as written.
pub fn allocation_row(record: &AllocationRecord) -> [String; 7] {
    [
        record.date.format("%Y-%m-%d").to_string(),
        record.day.clone(),
        record.session.to_string(),
        record.course.to_string(),
        record.room.to_string(),
        record.seated.to_string(),
        record.roll_list(),
    ]
}

/// Writes the allocation table, one row per record in allocation order.
pub fn write_allocation(path: &Path, records: &[AllocationRecord]) -> WorkbookResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(ALLOCATION_SHEET)?;
    write_header(sheet, &ALLOCATION_HEADERS)?;

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in allocation_row(record).iter().enumerate() {
            let col = col as u16;
            if col == COUNT_COLUMN {
                sheet.write_number(row, col, record.seated as f64)?;
            } else {
                sheet.write_string(row, col, value)?;
            }
        }
    }

    workbook.save(path)?;
    info!(path = %path.display(), rows = records.len(), "Wrote allocation table");
    Ok(())
}

pub(crate) fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> WorkbookResult<()> {
    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    Ok(())
}
