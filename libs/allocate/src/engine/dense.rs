//! Dense packing: fill a room completely, then move to the next one.

use crate::rooms::{Room, RoomCatalog};
use crate::roster::RosterIndex;
use crate::timetable::TimetableSlot;

use super::{Density, SeatingStrategy, SlotLedger};

/// Walks rooms in catalog order (highest floor, largest room first, then
/// lecture theatres) and fills each before touching the next.
///
/// Room capacity left over by one course is used by the next course of the
/// same slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseStrategy;

impl SeatingStrategy for DenseStrategy {
    fn density(&self) -> Density {
        Density::Dense
    }

    fn order_rooms(&self, catalog: &RoomCatalog) -> Vec<Room> {
        catalog.rooms().to_vec()
    }

    fn seat_slot(
        &self,
        rooms: &mut [Room],
        slot: &TimetableSlot,
        roster: &RosterIndex,
        ledger: &mut SlotLedger,
    ) {
        for course in &slot.courses {
            let mut queue = roster.queue(&course.code);

            for room in rooms.iter_mut() {
                if queue.is_empty() {
                    break;
                }
                if room.remaining == 0 {
                    continue;
                }

                let seated = queue.take_up_to(room.remaining as usize);
                room.remaining -= seated.len() as u32;
                ledger.seat(&course.code, &room.room_no, seated);
            }

            ledger.leave_unseated(&course.code, queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{catalog, placed, roster, seating, timetable};
    use super::super::{Allocator, Density};

    #[test]
    fn test_fills_rooms_in_order() {
        let index = roster(&[("CS101", "R1 R2 R3")]);
        let table = timetable(&[("2024-05-04", "CS101", "NO EXAM")], &index);
        let plan = Allocator::new(catalog(&[("101", 2), ("102", 2)], 0), Density::Dense)
            .run(&table, &index)
            .unwrap();

        assert_eq!(
            seating(&plan),
            vec![
                placed("CS101", "101", "R1 R2"),
                placed("CS101", "102", "R3"),
            ]
        );
        assert_eq!(plan.records[0].seated, 2);
        assert_eq!(plan.records[1].seated, 1);
    }

    #[test]
    fn test_next_course_continues_in_partial_room() {
        // B (3 students) goes first, A (2 students) takes what is left
        let index = roster(&[("A", "a1 a2"), ("B", "b1 b2 b3")]);
        let table = timetable(&[("2024-05-04", "A; B", "NO EXAM")], &index);
        let plan = Allocator::new(catalog(&[("201", 4), ("101", 4)], 0), Density::Dense)
            .run(&table, &index)
            .unwrap();

        assert_eq!(
            seating(&plan),
            vec![
                placed("B", "201", "b1 b2 b3"),
                placed("A", "201", "a1"),
                placed("A", "101", "a2"),
            ]
        );
    }

    #[test]
    fn test_zero_capacity_room_skipped() {
        let index = roster(&[("A", "a1 a2")]);
        let table = timetable(&[("2024-05-04", "A", "NO EXAM")], &index);
        // 301 has capacity equal to the buffer
        let plan = Allocator::new(catalog(&[("301", 2), ("101", 4)], 2), Density::Dense)
            .run(&table, &index)
            .unwrap();

        assert_eq!(
            seating(&plan),
            vec![placed("A", "101", "a1 a2")]
        );
    }

    #[test]
    fn test_earlier_rooms_full_before_later_rooms_used() {
        let index = roster(&[("A", "1 2 3 4 5 6 7")]);
        let table = timetable(&[("2024-05-04", "A", "NO EXAM")], &index);
        let allocator = Allocator::new(
            catalog(&[("101", 3), ("201", 2), ("LT1", 9), ("102", 1)], 0),
            Density::Dense,
        );
        let plan = allocator.run(&table, &index).unwrap();

        let order: Vec<_> = allocator
            .catalog()
            .rooms()
            .iter()
            .map(|r| (r.room_no.to_string(), r.remaining as usize))
            .collect();
        let used: Vec<_> = plan
            .records
            .iter()
            .map(|r| (r.room.to_string(), r.seated))
            .collect();

        // Every room but the last one used is filled to capacity
        assert_eq!(used.len(), 4);
        for (i, (room, seated)) in used.iter().enumerate() {
            assert_eq!(room, &order[i].0);
            if i + 1 < used.len() {
                assert_eq!(*seated, order[i].1);
            }
        }
        assert_eq!(used[3], ("LT1".to_string(), 1));
    }
}
