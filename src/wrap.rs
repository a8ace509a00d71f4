//! Increment and decrement that wrap modulo a bound.
//!
//! Used both for moving across the toroidal grid and for advancing ring
//! buffer cursors. `x` is expected to be in `0..bound`.

use std::ops::{Add, Sub};

pub fn incr<T>(x: T, bound: T) -> T
where
    T: Copy + PartialEq + Add<Output = T> + From<u8>,
{
    let next = x + T::from(1);
    if next == bound {
        T::from(0)
    } else {
        next
    }
}

pub fn decr<T>(x: T, bound: T) -> T
where
    T: Copy + PartialEq + Sub<Output = T> + From<u8>,
{
    if x == T::from(0) {
        bound - T::from(1)
    } else {
        x - T::from(1)
    }
}
