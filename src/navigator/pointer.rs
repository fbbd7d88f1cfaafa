//! Pointer backends.
//!
//! [`Pointer`] is the seam between the navigator and the OS.  The production
//! backend, [`EnigoPointer`], drives the real mouse through `enigo`; tests use
//! a recording double instead.

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

use super::PointerError;
use crate::menu::Point;

// ---------------------------------------------------------------------------
// Pointer trait
// ---------------------------------------------------------------------------

/// Minimal synthetic-mouse interface used by [`super::Navigator`].
///
/// Implementations must be `Send` so the navigator can run on tokio's
/// blocking pool.
pub trait Pointer: Send {
    /// Move the cursor to an absolute screen coordinate.
    fn move_to(&mut self, point: Point) -> Result<(), PointerError>;

    /// Current cursor position.
    fn position(&mut self) -> Result<Point, PointerError>;

    /// Press the primary button.
    fn press(&mut self) -> Result<(), PointerError>;

    /// Release the primary button.
    fn release(&mut self) -> Result<(), PointerError>;
}

// ---------------------------------------------------------------------------
// EnigoPointer
// ---------------------------------------------------------------------------

/// Real mouse driven by `enigo`.
///
/// A new [`Enigo`] handle is opened for every call because `Enigo` is not
/// `Send` and the handle is cheap to construct.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnigoPointer;

impl EnigoPointer {
    pub fn new() -> Self {
        Self
    }

    fn connect() -> Result<Enigo, PointerError> {
        Enigo::new(&Settings::default()).map_err(|e| PointerError::Backend(e.to_string()))
    }
}

impl Pointer for EnigoPointer {
    fn move_to(&mut self, point: Point) -> Result<(), PointerError> {
        Self::connect()?
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| PointerError::Move(e.to_string()))
    }

    fn position(&mut self) -> Result<Point, PointerError> {
        Self::connect()?
            .location()
            .map(Point::from)
            .map_err(|e| PointerError::Position(e.to_string()))
    }

    fn press(&mut self) -> Result<(), PointerError> {
        Self::connect()?
            .button(Button::Left, Direction::Press)
            .map_err(|e| PointerError::Button(e.to_string()))
    }

    fn release(&mut self) -> Result<(), PointerError> {
        Self::connect()?
            .button(Button::Left, Direction::Release)
            .map_err(|e| PointerError::Button(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// RecordingPointer (tests)
// ---------------------------------------------------------------------------
