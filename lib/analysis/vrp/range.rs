//! The abstract value stored per SSA value.

use crate::analysis::vrp::int::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The possible lengths of a string value. Lengths are never negative.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct StringRange {
    length: Interval,
}

impl StringRange {
    pub fn new(length: Interval) -> StringRange {
        StringRange { length }
    }

    /// A `StringRange` with no information.
    pub fn unknown() -> StringRange {
        StringRange {
            length: Interval::unknown(),
        }
    }

    /// The interval of possible lengths.
    pub fn length(&self) -> &Interval {
        &self.length
    }

    pub fn is_known(&self) -> bool {
        self.length.is_known()
    }

    pub fn union(&self, other: &StringRange) -> StringRange {
        StringRange {
            length: self.length.union(&other.length),
        }
    }
}

impl fmt::Display for StringRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "len {}", self.length)
    }
}

/// An abstract value: an integer interval, or a string length range.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Range {
    Interval(Interval),
    String(StringRange),
}

impl Range {
    pub fn is_known(&self) -> bool {
        match *self {
            Range::Interval(ref interval) => interval.is_known(),
            Range::String(ref string_range) => string_range.is_known(),
        }
    }

    /// The interval, if this is an integer range.
    pub fn interval(&self) -> Option<&Interval> {
        match *self {
            Range::Interval(ref interval) => Some(interval),
            Range::String(_) => None,
        }
    }

    /// The union of two ranges. An unknown range is the identity regardless
    /// of kind; ranges of different kinds never meet for well-typed SSA, and
    /// the known side wins if they do.
    pub fn union(&self, other: &Range) -> Range {
        match (self, other) {
            (Range::Interval(a), Range::Interval(b)) => Range::Interval(a.union(b)),
            (Range::String(a), Range::String(b)) => Range::String(a.union(b)),
            _ => {
                if self.is_known() {
                    self.clone()
                } else {
                    other.clone()
                }
            }
        }
    }
}

impl From<Interval> for Range {
    fn from(interval: Interval) -> Range {
        Range::Interval(interval)
    }
}

impl From<StringRange> for Range {
    fn from(string_range: StringRange) -> Range {
        Range::String(string_range)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Range::Interval(ref interval) => interval.fmt(f),
            Range::String(ref string_range) => string_range.fmt(f),
        }
    }
}
