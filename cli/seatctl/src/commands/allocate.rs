//! Allocation run: read inputs, seat students, write workbooks.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use seatplan_allocate::{
    AllocationPlan, AllocationStats, Allocator, Buffer, Density, RoomCatalog, RosterIndex,
    SlotKey, Timetable,
};
use seatplan_workbook::attendance::{write_attendance, AttendanceSheet, ATTENDANCE_FILE};
use seatplan_workbook::export::{write_allocation, ALLOCATION_FILE};
use seatplan_workbook::ingest;
use seatplan_workbook::NameBook;
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use crate::output::{print_output, print_single, print_success, print_warning, OutputFormat};
use crate::prompt;

use super::CommandContext;

/// Seat every scheduled course and write the output workbooks.
#[derive(Debug, Args)]
pub struct AllocateCommand {
    /// Roster workbook (`course_code`, `rollno`).
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Room workbook (`Room No.`, `Exam Capacity`).
    #[arg(long)]
    rooms: Option<PathBuf>,

    /// Timetable workbook (`Date`, `Morning`, `Evening`).
    #[arg(long)]
    timetable: Option<PathBuf>,

    /// Name workbook (`Roll`, `Name`).
    #[arg(long)]
    names: Option<PathBuf>,

    /// Seats held back in every room (0-5). Prompted for if not set.
    #[arg(long, allow_negative_numbers = true)]
    buffer: Option<i64>,

    /// Packing strategy: 1/dense or 2/sparse. Prompted for if not set.
    #[arg(long)]
    density: Option<String>,

    /// Directory for the output workbooks.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Fail instead of writing a plan that leaves students unseated.
    #[arg(long)]
    strict: bool,
}

/// Resolved inputs for one run.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub roster: PathBuf,
    pub rooms: PathBuf,
    pub timetable: PathBuf,
    /// Absent names file means every name is written as unknown.
    pub names: Option<PathBuf>,
    pub buffer: Buffer,
    pub density: Density,
    pub strict: bool,
    pub out_dir: PathBuf,
}

/// What a run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub density: Density,
    pub buffer: Buffer,
    pub stats: AllocationStats,
    pub slots: Vec<SlotSummary>,
    pub unseated: Vec<UnseatedRow>,
    pub allocation_file: PathBuf,
    pub attendance_file: PathBuf,
    pub attendance_sheets: usize,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SlotSummary {
    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Day")]
    pub day: String,

    #[tabled(rename = "Session")]
    pub session: String,

    #[tabled(rename = "Courses")]
    pub courses: usize,

    #[tabled(rename = "Rooms")]
    pub rooms: usize,

    #[tabled(rename = "Seated")]
    pub seated: usize,

    #[tabled(rename = "Unseated")]
    pub unseated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnseatedRow {
    pub slot: String,
    pub course: String,
    pub rolls: Vec<String>,
}

impl AllocateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let inputs = self.resolve(&ctx)?;
        let report = run_allocation(&inputs)?;
        print_report(&report, ctx.format);
        Ok(())
    }

    fn resolve(self, ctx: &CommandContext) -> Result<RunInputs> {
        let config = &ctx.config;

        let roster = ctx.input(self.roster, config.roster_path())?;
        let rooms = ctx.input(self.rooms, config.rooms_path())?;
        let timetable = ctx.input(self.timetable, config.timetable_path())?;
        let names = match self.names {
            Some(path) => Some(ctx.input(Some(path), PathBuf::new())?),
            None => Some(config.names_path()).filter(|p| p.exists()),
        };

        let stdin = io::stdin();
        let stdout = io::stdout();

        let buffer = match (self.buffer, config.buffer) {
            (Some(value), _) => Buffer::new(value)?,
            (None, Some(saved)) => saved,
            (None, None) => prompt::ask_buffer(&mut stdin.lock(), &mut stdout.lock())?,
        };

        let density = match (self.density, config.density) {
            (Some(value), _) => value.parse()?,
            (None, Some(saved)) => saved,
            (None, None) => prompt::ask_density(&mut stdin.lock(), &mut stdout.lock())?,
        };

        Ok(RunInputs {
            roster,
            rooms,
            timetable,
            names,
            buffer,
            density,
            strict: self.strict || config.strict,
            out_dir: self.out_dir.unwrap_or_else(|| config.out_dir()),
        })
    }
}

/// Runs allocation end to end. Nothing is written unless allocation
/// succeeds.
pub fn run_allocation(inputs: &RunInputs) -> Result<RunReport> {
    let roster = RosterIndex::build(
        ingest::read_roster(&inputs.roster)
            .with_context(|| format!("Failed to read roster from {:?}", inputs.roster))?,
    );
    let rooms = ingest::read_rooms(&inputs.rooms)
        .with_context(|| format!("Failed to read rooms from {:?}", inputs.rooms))?;
    let timetable_rows = ingest::read_timetable(&inputs.timetable)
        .with_context(|| format!("Failed to read timetable from {:?}", inputs.timetable))?;
    let names = match &inputs.names {
        Some(path) => ingest::read_names(path)
            .with_context(|| format!("Failed to read names from {:?}", path))?,
        None => {
            warn!("No names workbook; attendance names will be written as unknown");
            NameBook::default()
        }
    };

    let catalog = RoomCatalog::build(rooms, inputs.buffer)?;
    let timetable = Timetable::normalize(timetable_rows, &roster)?;
    let plan = Allocator::new(catalog, inputs.density).run(&timetable, &roster)?;

    if inputs.strict {
        plan.ensure_complete()?;
    }

    fs::create_dir_all(&inputs.out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", inputs.out_dir))?;

    let allocation_file = inputs.out_dir.join(ALLOCATION_FILE);
    write_allocation(&allocation_file, &plan.records)
        .with_context(|| format!("Failed to write {:?}", allocation_file))?;

    let sheets = AttendanceSheet::project(&plan.records);
    let attendance_file = inputs.out_dir.join(ATTENDANCE_FILE);
    write_attendance(&attendance_file, &sheets, &names)
        .with_context(|| format!("Failed to write {:?}", attendance_file))?;

    info!(
        density = %inputs.density,
        buffer = %inputs.buffer,
        seated = plan.stats.students_seated,
        unseated = plan.stats.students_unseated,
        sheets = sheets.len(),
        "Wrote allocation outputs"
    );

    Ok(RunReport {
        density: inputs.density,
        buffer: inputs.buffer,
        stats: plan.stats,
        slots: summarize(&timetable, &plan),
        unseated: plan
            .unseated
            .iter()
            .map(|u| UnseatedRow {
                slot: u.slot.to_string(),
                course: u.course.to_string(),
                rolls: u.rolls.iter().map(ToString::to_string).collect(),
            })
            .collect(),
        allocation_file,
        attendance_file,
        attendance_sheets: sheets.len(),
    })
}

fn summarize(timetable: &Timetable, plan: &AllocationPlan) -> Vec<SlotSummary> {
    timetable
        .exam_slots()
        .map(|slot| {
            let records: Vec<_> = plan.records_for(&slot.key).collect();
            let mut rooms: Vec<_> = records.iter().map(|r| &r.room).collect();
            rooms.sort();
            rooms.dedup();

            SlotSummary {
                date: slot.key.date.format("%Y-%m-%d").to_string(),
                day: slot.key.weekday_name(),
                session: slot.key.session.to_string(),
                courses: slot.courses.len(),
                rooms: rooms.len(),
                seated: records.iter().map(|r| r.seated).sum(),
                unseated: unseated_in(plan, &slot.key),
            }
        })
        .collect()
}

fn unseated_in(plan: &AllocationPlan, key: &SlotKey) -> usize {
    plan.unseated
        .iter()
        .filter(|u| &u.slot == key)
        .map(|u| u.rolls.len())
        .sum()
}

fn print_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_single(report),
        OutputFormat::Table => {
            print_output(&report.slots, format);
            for row in &report.unseated {
                print_warning(&format!(
                    "{} student(s) of {} unseated in {}: {}",
                    row.rolls.len(),
                    row.course,
                    row.slot,
                    row.rolls.join(", ")
                ));
            }
            print_success(&format!(
                "Seated {} student(s) ({} density, buffer {}). Wrote {} and {} ({} sheets)",
                report.stats.students_seated,
                report.density,
                report.buffer,
                report.allocation_file.display(),
                report.attendance_file.display(),
                report.attendance_sheets
            ));
        }
    }
}
