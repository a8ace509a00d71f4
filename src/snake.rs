use crate::food::Food;
use crate::ring::{self, RingBuffer, RingError};
use crate::{wrap, Coords, TermInt};
use Direction::*;

/// Heading of the snake, in clockwise order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

const DIRECTIONS: [Direction; 4] = [Right, Down, Left, Up];

impl Direction {
    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(i: u8) -> Self {
        DIRECTIONS[i as usize]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Cells touched by one move, for incremental redrawing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Step {
    pub new_head: Coords,
    pub old_head: Coords,
    /// `None` while the snake is growing.
    pub old_tail: Option<Coords>,
}

/// Body segments are stored tail first; the head is the back of the ring.
pub struct Snake {
    body: RingBuffer<Coords>,
    direction: Direction,
    rows: TermInt,
    cols: TermInt,
    to_grow: u32,
    eat_count: u32,
}

impl Snake {
    /// A straight run of `length` cells heading right, tail at `anchor`.
    pub fn new(anchor: Coords, length: usize, rows: TermInt, cols: TermInt) -> Result<Self, RingError> {
        let mut snake = Snake::empty(rows, cols);
        let (row, mut col) = anchor;
        for _ in 0..length {
            snake.body.push_back((row, col))?;
            col = wrap::incr(col, cols);
        }
        Ok(snake)
    }

    /// A snake with an arbitrary body, tail first.
    pub fn from_body(body: &[Coords], direction: Direction, rows: TermInt, cols: TermInt) -> Result<Self, RingError> {
        let mut snake = Snake::empty(rows, cols);
        snake.direction = direction;
        for &segment in body {
            snake.body.push_back(segment)?;
        }
        Ok(snake)
    }

    // One slot past the grid area: a growing snake that fills the grid puts
    // its head on the tail cell once before the next collision check.
    fn empty(rows: TermInt, cols: TermInt) -> Self {
        Snake {
            body: RingBuffer::with_capacity(rows as usize * cols as usize + 1),
            direction: Right,
            rows,
            cols,
            to_grow: 0,
            eat_count: 0,
        }
    }

    pub fn body(&self) -> ring::Iter<'_, Coords> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Result<Coords, RingError> {
        self.body.peek_back()
    }

    pub fn tail(&self) -> Result<Coords, RingError> {
        self.body.peek_front()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_growth(&self) -> u32 {
        self.to_grow
    }

    pub fn eat_count(&self) -> u32 {
        self.eat_count
    }

    pub fn move_step(&mut self) -> Result<Step, RingError> {
        let old_head = self.head()?;
        let new_head = self.next_head(old_head);

        let old_tail = if self.to_grow == 0 {
            Some(self.body.pop_front()?)
        } else {
            self.to_grow -= 1;
            None
        };

        self.body.push_back(new_head)?;
        Ok(Step { new_head, old_head, old_tail })
    }

    /// Rotates by 90 degrees. Turning twice the same way reverses the snake
    /// onto its own neck, which is a collision on the next move.
    pub fn turn(&mut self, turn: Turn) {
        let i = self.direction.index();
        let n = DIRECTIONS.len() as u8;
        self.direction = Direction::from_index(match turn {
            Turn::Right => wrap::incr(i, n),
            Turn::Left => wrap::decr(i, n),
        });
    }

    pub fn eats_food(&mut self, food: &Food) -> Result<bool, RingError> {
        if self.head()? != food.pos() {
            return Ok(false);
        }
        self.to_grow += food.growth();
        self.eat_count += 1;
        Ok(true)
    }

    pub fn touches(&self, pos: Coords) -> bool {
        !self.body.all(|&segment| segment != pos)
    }

    /// False when the head overlaps any other segment. The head is popped
    /// for the scan and pushed back before returning.
    pub fn is_alive(&mut self) -> Result<bool, RingError> {
        let head = self.body.pop_back()?;
        let no_hit = self.body.all(|&segment| segment != head);
        self.body.push_back(head)?;
        Ok(no_hit)
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }

    fn next_head(&self, (row, col): Coords) -> Coords {
        match self.direction {
            Right => (row, wrap::incr(col, self.cols)),
            Down => (wrap::incr(row, self.rows), col),
            Left => (row, wrap::decr(col, self.cols)),
            Up => (wrap::decr(row, self.rows), col),
        }
    }
}
