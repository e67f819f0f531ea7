//! Course roster index.

use std::collections::{BTreeMap, VecDeque};

use seatplan_codes::{CourseCode, RollNo};
use serde::{Deserialize, Serialize};

/// One (course, roll) enrollment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub course: CourseCode,
    pub roll: RollNo,
}

impl Enrollment {
    pub fn new(course: CourseCode, roll: RollNo) -> Self {
        Self { course, roll }
    }
}

/// Roll numbers grouped by course, each group sorted ascending.
///
/// Duplicate enrollment rows are kept; the caller is responsible for
/// providing unique rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterIndex {
    courses: BTreeMap<CourseCode, Vec<RollNo>>,
}

impl RosterIndex {
    pub fn build(rows: impl IntoIterator<Item = Enrollment>) -> Self {
        let mut courses: BTreeMap<CourseCode, Vec<RollNo>> = BTreeMap::new();
        for Enrollment { course, roll } in rows {
            courses.entry(course).or_default().push(roll);
        }
        for rolls in courses.values_mut() {
            rolls.sort();
        }
        Self { courses }
    }

    /// Sorted roster of a course, or `None` for an unknown course.
    pub fn roster(&self, course: &CourseCode) -> Option<&[RollNo]> {
        self.courses.get(course).map(Vec::as_slice)
    }

    /// Roster size, or `None` for an unknown course.
    pub fn size_of(&self, course: &CourseCode) -> Option<usize> {
        self.courses.get(course).map(Vec::len)
    }

    pub fn courses(&self) -> impl Iterator<Item = (&CourseCode, &[RollNo])> {
        self.courses.iter().map(|(c, r)| (c, r.as_slice()))
    }

    /// Number of enrollment rows indexed.
    pub fn enrollment_count(&self) -> usize {
        self.courses.values().map(Vec::len).sum()
    }

    /// Fresh seating queue for a course. Unknown courses yield an empty queue.
    pub fn queue(&self, course: &CourseCode) -> RosterQueue {
        RosterQueue {
            pending: self
                .courses
                .get(course)
                .map(|rolls| rolls.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

/// Students of one course still waiting for a seat, front first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterQueue {
    pending: VecDeque<RollNo>,
}

impl RosterQueue {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Removes up to `n` students from the front.
    pub fn take_up_to(&mut self, n: usize) -> Vec<RollNo> {
        let n = n.min(self.pending.len());
        self.pending.drain(..n).collect()
    }

    /// Students never seated.
    pub fn into_remaining(self) -> Vec<RollNo> {
        self.pending.into()
    }
}
