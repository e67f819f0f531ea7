//! Typed identifier definitions.

use crate::define_code;

define_code!(
    /// Room number as printed on the door, e.g. `101` or `LT102`.
    RoomNo,
    "room number"
);

define_code!(
    /// Course code, e.g. `CS101`.
    CourseCode,
    "course code"
);

define_code!(
    /// Student roll identifier. Opaque; compared as text.
    RollNo,
    "roll number"
);

/// Reserved prefix for lecture-theatre room numbers.
pub const LECTURE_THEATRE_PREFIX: &str = "LT";

impl RoomNo {
    /// Returns true for lecture-theatre rooms (`LT` prefix).
    pub fn is_lecture_theatre(&self) -> bool {
        self.0.starts_with(LECTURE_THEATRE_PREFIX)
    }

    /// Leading digit of a numbered room, which is its floor.
    pub fn leading_digit(&self) -> Option<u8> {
        first_digit(&self.0)
    }

    /// Floor digit following the `LT` prefix, if present.
    pub fn theatre_digit(&self) -> Option<u8> {
        self.0
            .strip_prefix(LECTURE_THEATRE_PREFIX)
            .and_then(first_digit)
    }
}

fn first_digit(s: &str) -> Option<u8> {
    s.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}
