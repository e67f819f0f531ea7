//! Allocation engine.
//!
//! The engine walks the timetable slot by slot. For every slot it:
//! - Takes a fresh copy of the rooms in strategy order (capacity reset)
//! - Seats each course from a fresh copy of its roster queue
//! - Appends one record per room (or room half) that received students
//! - Reports students that found no seat
//!
//! Strategies only decide which room a student goes to; the engine owns
//! slot iteration, bookkeeping and logging.

mod dense;
mod sparse;

use std::fmt;
use std::str::FromStr;

use seatplan_codes::{CourseCode, RollNo, RoomNo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{AllocError, AllocResult};
use crate::record::{AllocationPlan, AllocationRecord, AllocationStats, Unseated};
use crate::rooms::{Room, RoomCatalog};
use crate::roster::{RosterIndex, RosterQueue};
use crate::timetable::{SlotKey, Timetable, TimetableSlot};

pub use dense::DenseStrategy;
pub use sparse::SparseStrategy;

/// Packing strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// Fill each room before moving to the next.
    #[default]
    Dense,
    /// Split each room in two halves and spread courses across them.
    Sparse,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Dense => "dense",
            Density::Sparse => "sparse",
        }
    }

    pub fn strategy(self) -> Box<dyn SeatingStrategy> {
        match self {
            Density::Dense => Box::new(DenseStrategy),
            Density::Sparse => Box::new(SparseStrategy),
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = AllocError;

    /// Accepts the menu numbers `1`/`2` as well as the names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "dense" => Ok(Density::Dense),
            "2" | "sparse" => Ok(Density::Sparse),
            other => Err(AllocError::UnknownDensity(other.to_string())),
        }
    }
}

/// A way of placing students into rooms within one slot.
pub trait SeatingStrategy: Send + Sync {
    fn density(&self) -> Density;

    /// Rooms in the order this strategy walks them, at full capacity.
    fn order_rooms(&self, catalog: &RoomCatalog) -> Vec<Room>;

    /// Seats every course of a slot. `rooms` is this slot's capacity
    /// snapshot, in `order_rooms` order.
    fn seat_slot(
        &self,
        rooms: &mut [Room],
        slot: &TimetableSlot,
        roster: &RosterIndex,
        ledger: &mut SlotLedger,
    );
}

/// Collects the output of one slot.
#[derive(Debug)]
pub struct SlotLedger {
    key: SlotKey,
    records: Vec<AllocationRecord>,
    unseated: Vec<Unseated>,
}

impl SlotLedger {
    fn new(key: SlotKey) -> Self {
        Self {
            key,
            records: Vec::new(),
            unseated: Vec::new(),
        }
    }

    /// Records students seated in a room. Empty batches are ignored.
    pub fn seat(&mut self, course: &CourseCode, room: &RoomNo, rolls: Vec<RollNo>) {
        if rolls.is_empty() {
            return;
        }
        self.records.push(AllocationRecord::new(
            &self.key,
            course.clone(),
            room.clone(),
            rolls,
        ));
    }

    /// Records whatever is left in a course's queue as unseated.
    pub fn leave_unseated(&mut self, course: &CourseCode, queue: RosterQueue) {
        if queue.is_empty() {
            return;
        }
        let rolls = queue.into_remaining();
        warn!(
            slot = %self.key,
            course = %course,
            unseated = rolls.len(),
            "Ran out of room capacity; students left unseated"
        );
        self.unseated.push(Unseated {
            slot: self.key,
            course: course.clone(),
            rolls,
        });
    }
}

/// Runs a strategy over a whole timetable.
pub struct Allocator {
    catalog: RoomCatalog,
    strategy: Box<dyn SeatingStrategy>,
}

impl Allocator {
    pub fn new(catalog: RoomCatalog, density: Density) -> Self {
        Self::with_strategy(catalog, density.strategy())
    }

    pub fn with_strategy(catalog: RoomCatalog, strategy: Box<dyn SeatingStrategy>) -> Self {
        Self { catalog, strategy }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn density(&self) -> Density {
        self.strategy.density()
    }

    /// Allocates every slot of the timetable.
    ///
    /// The roster index is only read; running twice on the same inputs yields
    /// the same plan.
    #[instrument(skip_all, fields(density = %self.density()))]
    pub fn run(&self, timetable: &Timetable, roster: &RosterIndex) -> AllocResult<AllocationPlan> {
        if self.catalog.is_empty() {
            return Err(AllocError::RoomUnavailable);
        }

        let ordered = self.strategy.order_rooms(&self.catalog);
        let slot_capacity = self.catalog.total_capacity();
        let mut stats = AllocationStats::default();
        let mut records = Vec::new();
        let mut unseated = Vec::new();

        for slot in timetable.slots() {
            if slot.is_empty() {
                stats.slots_empty += 1;
                continue;
            }

            let demand = slot.demand();
            if demand as u64 > slot_capacity {
                warn!(
                    slot = %slot.key,
                    demand,
                    capacity = slot_capacity,
                    "Slot demand exceeds total room capacity"
                );
            }

            let mut rooms = ordered.clone();
            let mut ledger = SlotLedger::new(slot.key);
            self.strategy.seat_slot(&mut rooms, slot, roster, &mut ledger);

            let seated: usize = ledger.records.iter().map(|r| r.seated).sum();
            debug!(
                slot = %slot.key,
                courses = slot.courses.len(),
                seated,
                records = ledger.records.len(),
                "Slot allocated"
            );

            stats.slots_processed += 1;
            stats.courses_scheduled += slot.courses.len();
            stats.students_seated += seated;
            stats.students_unseated += ledger
                .unseated
                .iter()
                .map(|u| u.rolls.len())
                .sum::<usize>();
            records.extend(ledger.records);
            unseated.extend(ledger.unseated);
        }

        stats.records = records.len();

        info!(
            slots_processed = stats.slots_processed,
            slots_empty = stats.slots_empty,
            students_seated = stats.students_seated,
            students_unseated = stats.students_unseated,
            records = stats.records,
            "Allocation complete"
        );

        Ok(AllocationPlan {
            density: self.density(),
            records,
            unseated,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::{Buffer, RawRoom};
    use crate::roster::Enrollment;
    use crate::timetable::RawTimetableRow;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    pub(super) fn catalog(rooms: &[(&str, u32)], buffer: i64) -> RoomCatalog {
        RoomCatalog::build(
            rooms
                .iter()
                .map(|(no, cap)| RawRoom::new(RoomNo::parse(no).unwrap(), *cap)),
            Buffer::new(buffer).unwrap(),
        )
        .unwrap()
    }

    /// Rolls are given space separated.
    pub(super) fn roster(entries: &[(&str, &str)]) -> RosterIndex {
        RosterIndex::build(entries.iter().flat_map(|(course, rolls)| {
            rolls.split_whitespace().map(move |roll| {
                Enrollment::new(CourseCode::parse(course).unwrap(), RollNo::parse(roll).unwrap())
            })
        }))
    }

    pub(super) fn timetable(slots: &[(&str, &str, &str)], index: &RosterIndex) -> Timetable {
        Timetable::normalize(
            slots.iter().map(|(date, morning, evening)| RawTimetableRow {
                date: date.to_string(),
                morning: morning.to_string(),
                evening: evening.to_string(),
            }),
            index,
        )
        .unwrap()
    }

    pub(super) fn seating(plan: &AllocationPlan) -> Vec<(String, String, Vec<String>)> {
        plan.records
            .iter()
            .map(|r| {
                (
                    r.course.to_string(),
                    r.room.to_string(),
                    r.rolls.iter().map(|x| x.to_string()).collect(),
                )
            })
            .collect()
    }

    pub(super) fn placed(course: &str, room: &str, rolls: &str) -> (String, String, Vec<String>) {
        (
            course.to_string(),
            room.to_string(),
            rolls.split_whitespace().map(str::to_string).collect(),
        )
    }

    #[test]
    fn test_density_from_str() {
        assert_eq!("1".parse::<Density>().unwrap(), Density::Dense);
        assert_eq!(" Sparse ".parse::<Density>().unwrap(), Density::Sparse);
        assert_eq!("2".parse::<Density>().unwrap(), Density::Sparse);
        let err = "3".parse::<Density>().unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_empty_catalog_is_room_unavailable() {
        let index = roster(&[("CS101", "R1")]);
        let table = timetable(&[("2024-05-04", "CS101", "NO EXAM")], &index);
        let allocator = Allocator::new(catalog(&[], 0), Density::Dense);
        assert_eq!(
            allocator.run(&table, &index).unwrap_err(),
            AllocError::RoomUnavailable
        );
    }

    #[test]
    fn test_capacity_resets_between_slots() {
        let index = roster(&[("A", "R1 R2"), ("B", "S1 S2")]);
        let table = timetable(&[("2024-05-04", "A", "B")], &index);

        for density in [Density::Dense, Density::Sparse] {
            let plan = Allocator::new(catalog(&[("101", 2)], 0), density)
                .run(&table, &index)
                .unwrap();
            assert!(plan.is_complete(), "{density}");
            assert_eq!(plan.stats.students_seated, 4);
            assert_eq!(plan.stats.slots_processed, 2);
        }
    }

    #[test]
    fn test_course_in_two_slots_seats_twice() {
        let index = roster(&[("A", "R1 R2")]);
        let table = timetable(&[("2024-05-04", "A", "A")], &index);
        let plan = Allocator::new(catalog(&[("101", 5)], 0), Density::Dense)
            .run(&table, &index)
            .unwrap();
        assert_eq!(plan.records.len(), 2);
        assert!(plan.records.iter().all(|r| r.seated == 2));
    }

    #[test]
    fn test_unseated_reported() {
        let index = roster(&[("A", "R1 R2 R3")]);
        let table = timetable(&[("2024-05-04", "A", "NO EXAM")], &index);

        for density in [Density::Dense, Density::Sparse] {
            let plan = Allocator::new(catalog(&[("101", 2)], 0), density)
                .run(&table, &index)
                .unwrap();
            assert_eq!(plan.stats.students_seated, 2);
            assert_eq!(plan.stats.students_unseated, 1);
            assert_eq!(plan.stats.slots_empty, 1);
            assert_eq!(plan.unseated[0].rolls, vec![RollNo::parse("R3").unwrap()]);
            assert!(matches!(
                plan.ensure_complete(),
                Err(AllocError::UnderCapacity { unseated: 1, .. })
            ));
        }
    }

    #[test]
    fn test_unknown_course_seats_nobody() {
        let index = roster(&[("A", "R1")]);
        let table = timetable(&[("2024-05-04", "GHOST; A", "NO EXAM")], &index);
        let plan = Allocator::new(catalog(&[("101", 5)], 0), Density::Dense)
            .run(&table, &index)
            .unwrap();
        assert_eq!(seating(&plan), vec![placed("A", "101", "R1")]);
        assert!(plan.is_complete());
    }

    #[test]
    fn test_run_is_idempotent() {
        let index = roster(&[("A", "R1 R2 R3"), ("B", "S1")]);
        let table = timetable(&[("2024-05-04", "A; B", "B")], &index);
        for density in [Density::Dense, Density::Sparse] {
            let allocator = Allocator::new(catalog(&[("101", 2), ("102", 3)], 0), density);
            let first = allocator.run(&table, &index).unwrap();
            let second = allocator.run(&table, &index).unwrap();
            assert_eq!(first, second);
        }
    }

    fn arb_rooms() -> impl Strategy<Value = Vec<(String, u32)>> {
        proptest::collection::vec((1u8..=9, 0u32..12), 1..8).prop_map(|rooms| {
            rooms
                .into_iter()
                .enumerate()
                .map(|(i, (floor, cap))| (format!("{floor}{i:02}"), cap))
                .collect()
        })
    }

    fn arb_courses() -> impl Strategy<Value = Vec<usize>> {
        proptest::collection::vec(0usize..15, 1..5)
    }

    fn build_case(
        rooms: &[(String, u32)],
        sizes: &[usize],
    ) -> (RoomCatalog, RosterIndex, Timetable) {
        let catalog = RoomCatalog::build(
            rooms
                .iter()
                .map(|(no, cap)| RawRoom::new(RoomNo::parse(no).unwrap(), *cap)),
            Buffer::default(),
        )
        .unwrap();
        let index = RosterIndex::build(sizes.iter().enumerate().flat_map(|(c, size)| {
            (0..*size).map(move |s| {
                Enrollment::new(
                    CourseCode::parse(&format!("C{c}")).unwrap(),
                    RollNo::parse(&format!("C{c}-{s:03}")).unwrap(),
                )
            })
        }));
        let list = (0..sizes.len())
            .map(|c| format!("C{c}"))
            .collect::<Vec<_>>()
            .join("; ");
        let table = Timetable::normalize(
            vec![RawTimetableRow {
                date: "2024-05-04".to_string(),
                morning: list,
                evening: "NO EXAM".to_string(),
            }],
            &index,
        )
        .unwrap();
        (catalog, index, table)
    }

    proptest! {
        #[test]
        fn every_student_seated_exactly_once_when_capacity_suffices(
            rooms in arb_rooms(),
            sizes in arb_courses(),
            sparse in any::<bool>(),
        ) {
            let (catalog, index, table) = build_case(&rooms, &sizes);
            let capacity = catalog.total_capacity() as usize;
            let density = if sparse { Density::Sparse } else { Density::Dense };
            let plan = Allocator::new(catalog, density).run(&table, &index).unwrap();

            let mut seated: BTreeMap<CourseCode, Vec<RollNo>> = BTreeMap::new();
            for record in &plan.records {
                prop_assert_eq!(record.seated, record.rolls.len());
                seated.entry(record.course.clone()).or_default().extend(record.rolls.iter().cloned());
            }
            for left in &plan.unseated {
                seated.entry(left.course.clone()).or_default().extend(left.rolls.iter().cloned());
            }
            for (course, roster) in index.courses() {
                let mut got = seated.remove(course).unwrap_or_default();
                got.sort();
                prop_assert_eq!(got.as_slice(), roster);
            }

            let demand: usize = sizes.iter().sum();
            if demand <= capacity {
                prop_assert!(plan.is_complete());
            } else {
                prop_assert_eq!(plan.stats.students_unseated, demand - capacity);
            }
        }

        #[test]
        fn room_capacity_never_exceeded(
            rooms in arb_rooms(),
            sizes in arb_courses(),
            sparse in any::<bool>(),
        ) {
            let (catalog, index, table) = build_case(&rooms, &sizes);
            let capacities: BTreeMap<RoomNo, u32> = catalog
                .rooms()
                .iter()
                .map(|r| (r.room_no.clone(), r.remaining))
                .collect();
            let density = if sparse { Density::Sparse } else { Density::Dense };
            let plan = Allocator::new(catalog, density).run(&table, &index).unwrap();

            let mut used: BTreeMap<RoomNo, u32> = BTreeMap::new();
            for record in &plan.records {
                *used.entry(record.room.clone()).or_default() += record.seated as u32;
            }
            for (room, count) in used {
                prop_assert!(count <= capacities[&room]);
            }
        }
    }
}
