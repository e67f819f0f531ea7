//! Room catalog construction and ordering.
//!
//! Rooms are split into numbered floor rooms and lecture theatres. The dense
//! strategy walks higher floors with bigger rooms first, then theatres from
//! the lowest theatre floor. The sparse strategy walks the lowest floors
//! first.

use std::collections::BTreeSet;
use std::fmt;

use seatplan_codes::RoomNo;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AllocError, AllocResult};

/// Largest accepted buffer.
pub const MAX_BUFFER: u32 = 5;

/// Floor key given to lecture theatres when ordering lowest-floor first.
/// Theatres rank with sixth-floor rooms, ahead of floors seven to nine.
pub const LECTURE_THEATRE_FLOOR: u8 = 6;

/// Seats held back from every room's stated capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Buffer(u32);

impl Buffer {
    /// Validates a buffer value, which must lie in `0..=MAX_BUFFER`.
    pub fn new(value: i64) -> AllocResult<Self> {
        if !(0..=MAX_BUFFER as i64).contains(&value) {
            return Err(AllocError::InvalidBuffer {
                buffer: value,
                max: MAX_BUFFER,
            });
        }
        Ok(Self(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Buffer::new(value).map_err(serde::de::Error::custom)
    }
}

/// A room as read from the room table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRoom {
    pub room_no: RoomNo,
    pub capacity: u32,
}

impl RawRoom {
    pub fn new(room_no: RoomNo, capacity: u32) -> Self {
        Self { room_no, capacity }
    }
}

/// Room category derived from the room number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomKind {
    /// Numbered room; the floor is the leading digit.
    Floor { floor: u8 },
    /// `LT` room; the theatre floor is the digit after the prefix, if any.
    LectureTheatre { theatre_floor: Option<u8> },
}

impl RoomKind {
    fn classify(room_no: &RoomNo) -> Option<Self> {
        if let Some(floor) = room_no.leading_digit() {
            return Some(RoomKind::Floor { floor });
        }
        if room_no.is_lecture_theatre() {
            return Some(RoomKind::LectureTheatre {
                theatre_floor: room_no.theatre_digit(),
            });
        }
        None
    }
}

/// A room with its buffer-adjusted capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub room_no: RoomNo,
    pub kind: RoomKind,
    /// Stated exam capacity.
    pub capacity: u32,
    /// Seats left to hand out in the current slot.
    pub remaining: u32,
}

impl Room {
    /// Floor used when ordering lowest-floor first.
    pub fn floor_key(&self) -> u8 {
        match self.kind {
            RoomKind::Floor { floor } => floor,
            RoomKind::LectureTheatre { .. } => LECTURE_THEATRE_FLOOR,
        }
    }

    pub fn is_lecture_theatre(&self) -> bool {
        matches!(self.kind, RoomKind::LectureTheatre { .. })
    }
}

/// Ordered set of rooms with buffer-adjusted capacities.
///
/// The stored order is the dense order. Remaining capacities here are the
/// per-slot starting values; allocation works on copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
    buffer: Buffer,
}

impl RoomCatalog {
    /// Builds the catalog from raw rooms.
    ///
    /// Rooms whose number is neither numbered nor `LT`-prefixed are skipped.
    pub fn build(raw: impl IntoIterator<Item = RawRoom>, buffer: Buffer) -> AllocResult<Self> {
        let mut seen = BTreeSet::new();
        let mut floor_rooms = Vec::new();
        let mut theatres = Vec::new();

        for RawRoom { room_no, capacity } in raw {
            if !seen.insert(room_no.clone()) {
                return Err(AllocError::DuplicateRoom(room_no));
            }

            let Some(kind) = RoomKind::classify(&room_no) else {
                warn!(room = %room_no, "Skipping room that is neither numbered nor a lecture theatre");
                continue;
            };

            let remaining =
                capacity
                    .checked_sub(buffer.get())
                    .ok_or_else(|| AllocError::BufferExceedsCapacity {
                        room: room_no.clone(),
                        capacity,
                        buffer: buffer.get(),
                    })?;

            let room = Room {
                room_no,
                kind,
                capacity,
                remaining,
            };
            if room.is_lecture_theatre() {
                theatres.push(room);
            } else {
                floor_rooms.push(room);
            }
        }

        // Higher floors first, bigger rooms first within a floor.
        floor_rooms.sort_by(|a, b| {
            b.floor_key()
                .cmp(&a.floor_key())
                .then_with(|| b.capacity.cmp(&a.capacity))
        });

        theatres.sort_by(|a, b| {
            theatre_floor(a)
                .cmp(&theatre_floor(b))
                .then_with(|| a.room_no.cmp(&b.room_no))
        });

        let mut rooms = floor_rooms;
        rooms.extend(theatres);

        debug!(
            room_count = rooms.len(),
            buffer = buffer.get(),
            "Built room catalog"
        );

        Ok(Self { rooms, buffer })
    }

    /// Rooms in dense order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Rooms re-sorted lowest floor first, most remaining seats first.
    pub fn sparse_order(&self) -> Vec<Room> {
        let mut rooms = self.rooms.clone();
        rooms.sort_by(|a, b| {
            a.floor_key()
                .cmp(&b.floor_key())
                .then_with(|| b.remaining.cmp(&a.remaining))
        });
        rooms
    }

    pub fn buffer(&self) -> Buffer {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Seats available in one slot across all rooms.
    pub fn total_capacity(&self) -> u64 {
        self.rooms.iter().map(|r| u64::from(r.remaining)).sum()
    }
}

fn theatre_floor(room: &Room) -> u8 {
    match room.kind {
        RoomKind::LectureTheatre { theatre_floor } => theatre_floor.unwrap_or(u8::MAX),
        RoomKind::Floor { floor } => floor,
    }
}
