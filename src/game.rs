use std::{thread::sleep, time::Duration};

use crate::food::Food;
use crate::input::{InputListener, Key, KeySource};
use crate::snake::{Snake, Step, Turn};
use crate::term::{Screen, Surface};
use crate::{Coords, TermInt};

use anyhow::{bail, Result};
use log::{debug, info};
use rand::Rng;

const TITLE: &str = "..:: ~~ Snek ~~ ::..";
const DEATH_MESSAGE: &str = "You died.";

const SNAKE_BODY_CHAR: char = '*';
const FOOD_CHAR: char = '@';
const BLANK_CHAR: char = ' ';

// Header rows above the frame, and the frame's own border.
const HEADER_LINES: TermInt = 2;
const BORDER: TermInt = 1;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub slow_tick: Duration,
    /// Used for a tick in which the accelerate key was seen.
    pub fast_tick: Duration,
    pub snake_length: usize,
    /// Tail cell of the starting snake, `(row, col)` on the canvas.
    pub snake_anchor: Coords,
    pub food_growth: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            slow_tick: Duration::from_micros(62_500),
            fast_tick: Duration::from_micros(31_250),
            snake_length: 5,
            snake_anchor: (0, 1),
            food_growth: 5,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameState {
    Setup,
    Running,
    Dying,
    Quitting,
    TornDown,
}

pub struct Game<S: Screen, R: Rng> {
    config: GameConfig,
    screen: S,
    rng: R,
    header: S::Surface,
    border: S::Surface,
    canvas: S::Surface,
    snake: Snake,
    food: Food,
    tick_interval: Duration,
    state: GameState,
}

impl<S: Screen, R: Rng> Game<S, R> {
    /// Lays out the header, the frame and the canvas, and draws the starting
    /// snake, food and score.
    pub fn new(mut screen: S, mut rng: R, config: GameConfig) -> Result<Self> {
        let (lines, cols) = screen.size();
        let frame_lines = lines.saturating_sub(HEADER_LINES);
        let rows = frame_lines.saturating_sub(2 * BORDER);
        let width = cols.saturating_sub(2 * BORDER);

        if rows == 0 || (width as usize) < config.snake_length || config.snake_length == 0 {
            bail!("a {}x{} terminal is too small to play", cols, lines);
        }
        let (anchor_row, anchor_col) = config.snake_anchor;
        if anchor_row >= rows || anchor_col >= width {
            bail!("snake anchor {:?} is outside the {}x{} canvas", config.snake_anchor, width, rows);
        }

        let mut border = screen.create_surface(frame_lines, cols, HEADER_LINES, 0)?;
        border.draw_border()?;
        border.refresh()?;

        let canvas = screen.create_surface(rows, width, HEADER_LINES + BORDER, BORDER)?;
        let header = screen.create_surface(HEADER_LINES, cols, 0, 0)?;

        let snake = Snake::new(config.snake_anchor, config.snake_length, rows, width)?;
        let food = Food::new(rows, width, config.food_growth, &mut rng);

        let mut game = Game {
            tick_interval: config.slow_tick,
            config,
            screen,
            rng,
            header,
            border,
            canvas,
            snake,
            food,
            state: GameState::Setup,
        };

        game.print_food()?;
        game.print_snake()?;
        game.print_title()?;
        game.show_score()?;

        info!("game set up on a {}x{} canvas", width, rows);
        Ok(game)
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Plays until death or quit, then tears down. Surfaces are closed and
    /// the listener joined on every exit path, errors included.
    pub fn run<K: KeySource>(&mut self, keys: K) -> Result<()> {
        let mut listener = InputListener::new();
        let result = match listener.start_listening(keys) {
            Ok(()) => {
                listener.clear_key();
                self.state = GameState::Running;
                info!("game started");
                self.play(&mut listener)
            }
            Err(e) => Err(e.into()),
        };

        listener.stop_listening();
        let closed = self.teardown();
        result.and(closed)
    }

    fn play(&mut self, listener: &mut InputListener) -> Result<()> {
        loop {
            self.canvas.refresh()?;
            sleep(self.tick_interval);

            match self.tick(listener.take_key())? {
                GameState::Running => {}
                GameState::Dying => {
                    listener.stop_listening();
                    self.screen.show_message(DEATH_MESSAGE)?;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    /// One step of the game given the key seen since the last tick. Returns
    /// the state the game is in afterwards.
    pub fn tick(&mut self, key: Option<Key>) -> Result<GameState> {
        if !self.snake.is_alive()? {
            info!("snake died with score {}", self.snake.eat_count());
            self.state = GameState::Dying;
            return Ok(self.state);
        }

        if key.map_or(false, Key::is_quit) {
            info!("quit with score {}", self.snake.eat_count());
            self.state = GameState::Quitting;
            return Ok(self.state);
        }

        self.tick_interval = if key == Some(Key::Up) {
            self.config.fast_tick
        } else {
            self.config.slow_tick
        };

        match key {
            Some(Key::Left) => self.snake.turn(Turn::Left),
            Some(Key::Right) => self.snake.turn(Turn::Right),
            _ => {}
        }

        if self.snake.eats_food(&self.food)? {
            self.food.relocate(&mut self.rng);
            debug!("ate food, {} growth pending, food now at {:?}", self.snake.pending_growth(), self.food.pos());
            self.show_score()?;
        }

        self.print_food()?;
        let step = self.snake.move_step()?;
        self.print_snake_update(&step)?;

        self.state = GameState::Running;
        Ok(self.state)
    }

    /// Blanks every surface. Only the first call does anything. Each surface
    /// is closed even if an earlier one fails; the first error is returned.
    pub fn teardown(&mut self) -> Result<()> {
        if self.state == GameState::TornDown {
            return Ok(());
        }
        self.state = GameState::TornDown;

        let canvas = self.canvas.close();
        let border = self.border.close();
        let header = self.header.close();
        info!("game torn down");
        canvas.and(border).and(header)?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_snake(&mut self) -> Result<()> {
        for &pos in self.snake.body() {
            self.canvas.print_at(pos, SNAKE_BODY_CHAR)?;
        }
        self.canvas.print_at(self.snake.head()?, self.snake.head_char())?;
        Ok(())
    }

    fn print_snake_update(&mut self, step: &Step) -> Result<()> {
        // Tail first, so a head moving into the old tail cell stays visible
        if let Some(old_tail) = step.old_tail {
            self.canvas.print_at(old_tail, BLANK_CHAR)?;
        }
        self.canvas.print_at(step.old_head, SNAKE_BODY_CHAR)?;
        self.canvas.print_at(step.new_head, self.snake.head_char())?;
        Ok(())
    }

    fn print_food(&mut self) -> Result<()> {
        self.canvas.print_at(self.food.pos(), FOOD_CHAR)?;
        Ok(())
    }

    fn print_title(&mut self) -> Result<()> {
        let col = (self.header.width() / 2).saturating_sub(TITLE.len() as TermInt / 2);
        self.header.set_cursor(0, col)?;
        self.header.draw_text(TITLE)?;
        Ok(())
    }

    fn show_score(&mut self) -> Result<()> {
        self.header.set_cursor(1, 0)?;
        self.header.draw_text(&format!("score: {}", self.snake.eat_count()))?;
        self.header.refresh()?;
        Ok(())
    }
}
