//! Seat allocation for exam timetables.
//!
//! This library turns three normalized inputs into a flat list of
//! allocation records. Key concepts:
//!
//! - **Room catalog**: rooms with a derived floor and buffer-adjusted capacity.
//! - **Roster index**: sorted roll numbers per course.
//! - **Timetable**: per (date, session) slot, courses largest-first.
//! - **Strategy**: dense (fill a room, then move on) or sparse (split every
//!   room into two halves and spread a course across them).
//!
//! # Invariants
//!
//! - Builders are deterministic given the same inputs
//! - Room capacity and cursors reset at the start of every slot
//! - The roster index is never mutated by allocation; every slot seats from
//!   fresh copies of its courses' queues
//! - Remaining capacity never underflows

pub mod engine;
pub mod error;
pub mod record;
pub mod rooms;
pub mod roster;
pub mod timetable;

pub use engine::{Allocator, Density, DenseStrategy, SeatingStrategy, SlotLedger, SparseStrategy};
pub use error::{AllocError, AllocResult};
pub use record::{AllocationPlan, AllocationRecord, AllocationStats, Unseated};
pub use rooms::{Buffer, RawRoom, Room, RoomCatalog, RoomKind};
pub use roster::{Enrollment, RosterIndex, RosterQueue};
pub use timetable::{RawTimetableRow, ScheduledCourse, Session, SlotKey, Timetable, TimetableSlot};
