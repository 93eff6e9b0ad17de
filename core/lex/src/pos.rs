use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Source region covered by a node: byte offsets plus the start/end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub offset_start: usize,
    pub offset_end: usize,
    pub start: Pos,
    pub end: Pos,
}

impl Region {
    #[must_use]
    pub fn new(offset_start: usize, offset_end: usize, start: Pos, end: Pos) -> Self {
        Self {
            offset_start,
            offset_end,
            start,
            end,
        }
    }

    /// Smallest region covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Region) -> Region {
        let (offset_start, start) = if other.offset_start < self.offset_start {
            (other.offset_start, other.start)
        } else {
            (self.offset_start, self.start)
        };
        let (offset_end, end) = if other.offset_end > self.offset_end {
            (other.offset_end, other.end)
        } else {
            (self.offset_end, self.end)
        };
        Region {
            offset_start,
            offset_end,
            start,
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset_start && offset < self.offset_end
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
