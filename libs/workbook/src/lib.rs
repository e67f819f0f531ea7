//! Spreadsheet I/O for seatplan.
//!
//! - [`table`]: header-checked view over the first worksheet of a workbook
//! - [`ingest`]: typed rows for the roster, room, timetable and name tables
//! - [`export`]: the allocation table
//! - [`attendance`]: one attendance sheet per (date, course, room, session)

pub mod attendance;
pub mod error;
pub mod export;
pub mod ingest;
pub mod table;

pub use attendance::{AttendanceSheet, NameBook, UNKNOWN_NAME};
pub use error::{WorkbookError, WorkbookResult};
pub use table::Table;
