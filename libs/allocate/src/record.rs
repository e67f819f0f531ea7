//! Allocation output.

use chrono::NaiveDate;
use seatplan_codes::{CourseCode, RollNo, RoomNo};
use serde::Serialize;

use crate::engine::Density;
use crate::error::{AllocError, AllocResult};
use crate::timetable::{Session, SlotKey};

/// Separator used when a roll list is rendered as one cell.
pub const ROLL_LIST_SEPARATOR: &str = "; ";

/// Students of one course seated in one room (or room half) in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRecord {
    pub date: NaiveDate,
    pub day: String,
    pub session: Session,
    pub course: CourseCode,
    pub room: RoomNo,
    pub seated: usize,
    pub rolls: Vec<RollNo>,
}

impl AllocationRecord {
    pub fn new(key: &SlotKey, course: CourseCode, room: RoomNo, rolls: Vec<RollNo>) -> Self {
        Self {
            date: key.date,
            day: key.weekday_name(),
            session: key.session,
            course,
            room,
            seated: rolls.len(),
            rolls,
        }
    }

    pub fn slot(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            session: self.session,
        }
    }

    /// Roll numbers joined with `; `.
    pub fn roll_list(&self) -> String {
        self.rolls
            .iter()
            .map(RollNo::as_str)
            .collect::<Vec<_>>()
            .join(ROLL_LIST_SEPARATOR)
    }
}

/// Students of a course left without a seat in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unseated {
    pub slot: SlotKey,
    pub course: CourseCode,
    pub rolls: Vec<RollNo>,
}

/// Counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocationStats {
    pub slots_processed: usize,
    pub slots_empty: usize,
    pub courses_scheduled: usize,
    pub students_seated: usize,
    pub students_unseated: usize,
    pub records: usize,
}

/// Result of an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    pub density: Density,
    pub records: Vec<AllocationRecord>,
    pub unseated: Vec<Unseated>,
    pub stats: AllocationStats,
}

impl AllocationPlan {
    /// Records of one slot, in allocation order.
    pub fn records_for<'a>(
        &'a self,
        slot: &'a SlotKey,
    ) -> impl Iterator<Item = &'a AllocationRecord> + 'a {
        self.records.iter().filter(move |r| &r.slot() == slot)
    }

    pub fn is_complete(&self) -> bool {
        self.unseated.is_empty()
    }

    /// Fails with `UnderCapacity` if any student was left without a seat.
    pub fn ensure_complete(&self) -> AllocResult<()> {
        match self.unseated.first() {
            None => Ok(()),
            Some(first) => Err(AllocError::UnderCapacity {
                unseated: self.stats.students_unseated,
                course: first.course.clone(),
                slot: first.slot.to_string(),
            }),
        }
    }
}
