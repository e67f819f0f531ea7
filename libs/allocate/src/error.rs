//! Allocation errors.

use seatplan_codes::{CodeError, CourseCode, RoomNo};
use thiserror::Error;

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;

/// Errors that abort an allocation run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("invalid configuration: buffer {buffer} is outside 0..={max}")]
    InvalidBuffer { buffer: i64, max: u32 },

    #[error("invalid configuration: buffer {buffer} exceeds capacity {capacity} of room {room}")]
    BufferExceedsCapacity {
        room: RoomNo,
        capacity: u32,
        buffer: u32,
    },

    #[error("invalid configuration: room {0} is listed more than once")]
    DuplicateRoom(RoomNo),

    #[error("invalid configuration: unknown density '{0}' (expected 1/dense or 2/sparse)")]
    UnknownDensity(String),

    #[error("malformed date '{0}'")]
    MalformedDate(String),

    #[error("invalid identifier: {0}")]
    InvalidCode(#[from] CodeError),

    #[error("no rooms available")]
    RoomUnavailable,

    #[error("{unseated} student(s) could not be seated (first: {course} in {slot})")]
    UnderCapacity {
        unseated: usize,
        course: CourseCode,
        slot: String,
    },
}

impl AllocError {
    /// Returns true for errors caused by the buffer, room list or density
    /// choice rather than by the timetable or roster data.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            AllocError::InvalidBuffer { .. }
                | AllocError::BufferExceedsCapacity { .. }
                | AllocError::DuplicateRoom(_)
                | AllocError::UnknownDensity(_)
        )
    }
}
