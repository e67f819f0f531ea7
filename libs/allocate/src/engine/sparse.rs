//! Sparse packing: every room is split into two halves and courses are
//! spread across the halves.
//!
//! Half one of a room holds `ceil(capacity / 2)` seats, half two the rest.
//! Cursor `i` walks the first halves and cursor `j` the second halves, both
//! starting at the first room (lowest floor, largest room). A course starts
//! on whichever cursor is further behind, `i` on a tie, and keeps filling
//! that cursor's halves room after room. Only when the cursor runs past the
//! last room does the other cursor take over.
//!
//! In practice the first course of a slot takes the first halves of the
//! rooms it needs and the next course takes the second halves of the same
//! rooms, so students of one course do not sit next to each other.

use seatplan_codes::RollNo;

use crate::rooms::{Room, RoomCatalog};
use crate::roster::{RosterIndex, RosterQueue};
use crate::timetable::TimetableSlot;

use super::{Density, SeatingStrategy, SlotLedger};

/// Spreads courses over room halves, lowest floors first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    First = 0,
    Second = 1,
}

/// Per-slot half capacities and the two cursors.
#[derive(Debug)]
struct SplitRooms {
    halves: Vec<[u32; 2]>,
    cursors: [usize; 2],
}

impl SplitRooms {
    fn new(rooms: &[Room]) -> Self {
        let halves = rooms
            .iter()
            .map(|room| {
                let first = room.remaining.div_ceil(2);
                [first, room.remaining - first]
            })
            .collect();
        Self {
            halves,
            cursors: [0, 0],
        }
    }

    fn cursor(&self, half: Half) -> usize {
        self.cursors[half as usize]
    }

    fn is_live(&self, half: Half) -> bool {
        self.cursor(half) < self.halves.len()
    }

    /// The cursor further behind among those still pointing at a room.
    /// `i` wins ties.
    fn active(&self) -> Option<Half> {
        match (self.is_live(Half::First), self.is_live(Half::Second)) {
            (true, true) if self.cursor(Half::First) <= self.cursor(Half::Second) => {
                Some(Half::First)
            }
            (true, true) => Some(Half::Second),
            (true, false) => Some(Half::First),
            (false, true) => Some(Half::Second),
            (false, false) => None,
        }
    }

    fn capacity(&self, half: Half, room: usize) -> u32 {
        self.halves[room][half as usize]
    }

    fn consume(&mut self, half: Half, room: usize, seats: u32) {
        self.halves[room][half as usize] -= seats;
    }

    fn advance(&mut self, half: Half) {
        self.cursors[half as usize] += 1;
    }

    /// Seats a course queue half by half until it empties or both cursors
    /// run past the last room. Each batch is reported with its half and
    /// room index.
    fn place(
        &mut self,
        queue: &mut RosterQueue,
        mut seat: impl FnMut(Half, usize, Vec<RollNo>),
    ) {
        let mut active = self.active();

        while !queue.is_empty() {
            let Some(half) = active else {
                break;
            };

            if !self.is_live(half) {
                active = self.active();
                continue;
            }

            let index = self.cursor(half);
            let available = self.capacity(half, index);
            if available == 0 {
                self.advance(half);
                continue;
            }

            let seated = queue.take_up_to(available as usize);
            self.consume(half, index, seated.len() as u32);
            seat(half, index, seated);

            if self.capacity(half, index) == 0 {
                self.advance(half);
            }
        }
    }
}

impl SeatingStrategy for SparseStrategy {
    fn density(&self) -> Density {
        Density::Sparse
    }

    fn order_rooms(&self, catalog: &RoomCatalog) -> Vec<Room> {
        catalog.sparse_order()
    }

    fn seat_slot(
        &self,
        rooms: &mut [Room],
        slot: &TimetableSlot,
        roster: &RosterIndex,
        ledger: &mut SlotLedger,
    ) {
        let mut split = SplitRooms::new(rooms);

        for course in &slot.courses {
            let mut queue = roster.queue(&course.code);
            split.place(&mut queue, |_, index, seated| {
                rooms[index].remaining -= seated.len() as u32;
                ledger.seat(&course.code, &rooms[index].room_no, seated);
            });
            ledger.leave_unseated(&course.code, queue);
        }
    }
}
