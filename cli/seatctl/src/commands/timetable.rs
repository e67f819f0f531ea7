//! Timetable inspection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use seatplan_allocate::timetable::NO_EXAM;
use seatplan_allocate::{RosterIndex, Timetable, TimetableSlot};
use seatplan_workbook::ingest;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_single, OutputFormat};

use super::CommandContext;

/// Show every (date, session) slot with its courses in seating order.
#[derive(Debug, Args)]
pub struct TimetableCommand {
    /// Roster workbook (`course_code`, `rollno`).
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Timetable workbook (`Date`, `Morning`, `Evening`).
    #[arg(long)]
    timetable: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct SlotRow {
    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Day")]
    day: String,

    #[tabled(rename = "Session")]
    session: String,

    /// Courses with roster sizes; `?` marks a course with no roster.
    #[tabled(rename = "Courses")]
    courses: String,

    #[tabled(rename = "Students")]
    students: usize,
}

impl SlotRow {
    fn new(slot: &TimetableSlot) -> Self {
        let courses = if slot.is_empty() {
            NO_EXAM.to_string()
        } else {
            slot.courses
                .iter()
                .map(|c| {
                    if c.known {
                        format!("{} ({})", c.code, c.roster_size)
                    } else {
                        format!("{} (?)", c.code)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            date: slot.key.date.format("%Y-%m-%d").to_string(),
            day: slot.key.weekday_name(),
            session: slot.key.session.to_string(),
            courses,
            students: slot.demand(),
        }
    }
}

impl TimetableCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let roster_path = ctx.input(self.roster, ctx.config.roster_path())?;
        let timetable_path = ctx.input(self.timetable, ctx.config.timetable_path())?;

        let roster = RosterIndex::build(
            ingest::read_roster(&roster_path)
                .with_context(|| format!("Failed to read roster from {:?}", roster_path))?,
        );
        let rows = ingest::read_timetable(&timetable_path)
            .with_context(|| format!("Failed to read timetable from {:?}", timetable_path))?;
        let timetable = Timetable::normalize(rows, &roster)?;

        match ctx.format {
            OutputFormat::Json => print_single(&timetable),
            OutputFormat::Table => {
                let rows: Vec<SlotRow> = timetable.slots().iter().map(SlotRow::new).collect();
                print_output(&rows, ctx.format);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_allocate::{Enrollment, RawTimetableRow};
    use seatplan_codes::{CourseCode, RollNo};

    #[test]
    fn test_slot_rows() {
        let roster = RosterIndex::build(["R1", "R2"].into_iter().map(|roll| {
            Enrollment::new(
                CourseCode::parse("CS101").unwrap(),
                RollNo::parse(roll).unwrap(),
            )
        }));
        let timetable = Timetable::normalize(
            vec![RawTimetableRow {
                date: "2024-05-04".to_string(),
                morning: "GHOST; CS101".to_string(),
                evening: "NO EXAM".to_string(),
            }],
            &roster,
        )
        .unwrap();

        let rows: Vec<SlotRow> = timetable.slots().iter().map(SlotRow::new).collect();
        assert_eq!(rows[0].courses, "CS101 (2), GHOST (?)");
        assert_eq!(rows[0].students, 2);
        assert_eq!(rows[0].day, "Saturday");
        assert_eq!(rows[1].courses, NO_EXAM);
        assert_eq!(rows[1].session, "evening");
    }
}
