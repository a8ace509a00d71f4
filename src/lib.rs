//! Terminal snake on a wrap-around grid.
//!
//! The engine (`ring`, `snake`, `food`, `wrap`) is plain data and never talks
//! to the terminal. `game` drives it once per tick against a [`term::Screen`],
//! while `input` runs a background listener that publishes the latest key.

pub mod food;
pub mod game;
pub mod input;
pub mod ring;
pub mod snake;
pub mod term;
pub mod wrap;

pub type TermInt = u16;

/// Grid position as `(row, col)`.
pub type Coords = (TermInt, TermInt);
