//! Menu index: static kiosk layout plus menu-card locations.
//!
//! * [`MenuIndex`]: loaded once from two JSON documents; exact and fuzzy
//!   name → location resolution.
//! * [`ResolvedTarget`]: result of a single lookup.
//! * [`Point`]: absolute screen coordinate.
//! * [`similarity`]: the string similarity used by fuzzy resolution.

pub mod index;
pub mod similarity;

pub use index::{IndexError, MenuEntry, MenuIndex, NavButtons, ResolvedTarget, DEFAULT_CUTOFF};

use serde::{Deserialize, Serialize};

/// Absolute screen coordinate in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` when both axes are within `tolerance` pixels of `other`.
    pub fn within(&self, other: Point, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
