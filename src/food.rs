use rand::Rng;

use crate::{Coords, TermInt};

/// A single piece of food. Relocation picks any cell of the grid, including
/// cells currently covered by the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pos: Coords,
    growth: u32,
    rows: TermInt,
    cols: TermInt,
}

impl Food {
    pub fn new<R: Rng + ?Sized>(rows: TermInt, cols: TermInt, growth: u32, rng: &mut R) -> Self {
        let mut food = Food::at((0, 0), rows, cols, growth);
        food.relocate(rng);
        food
    }

    pub fn at(pos: Coords, rows: TermInt, cols: TermInt, growth: u32) -> Self {
        Food { pos, growth, rows, cols }
    }

    pub fn pos(&self) -> Coords {
        self.pos
    }

    pub fn growth(&self) -> u32 {
        self.growth
    }

    pub fn relocate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pos = (rng.gen_range(0..self.rows), rng.gen_range(0..self.cols));
    }
}
