//! Order execution: normalize order lines, add them to the cart, pay.
//!
//! * [`OrderItem`]: a single normalized line (`name`, `count ≥ 1`).
//! * [`OrderMacro`]: drives the [`crate::navigator::Navigator`] through a
//!   batch and presses the pay button once at the end.
//! * [`ItemResult`] / [`BatchResult`]: per-line and per-batch accounting.

pub mod executor;
pub mod item;

pub use executor::OrderMacro;
pub use item::{BatchResult, ItemResult, OrderItem};
