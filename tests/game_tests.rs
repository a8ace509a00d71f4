//! Game loop tests against an in-memory screen.

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use snek::game::{Game, GameConfig, GameState};
use snek::input::{Key, RawKeys};
use snek::snake::Direction;
use snek::term::{Screen, Surface};
use snek::TermInt;

type Cells = Rc<RefCell<Vec<Vec<char>>>>;

struct MemScreen {
    lines: TermInt,
    cols: TermInt,
    cells: Cells,
    closed: Rc<Cell<usize>>,
    messages: Vec<String>,
    created: usize,
    /// Creation index of a surface whose `close` fails.
    failing_close: Option<usize>,
}

impl MemScreen {
    fn new(lines: TermInt, cols: TermInt) -> Self {
        MemScreen {
            lines,
            cols,
            cells: Rc::new(RefCell::new(vec![vec![' '; cols as usize]; lines as usize])),
            closed: Rc::new(Cell::new(0)),
            messages: vec![],
            created: 0,
            failing_close: None,
        }
    }

    fn at(&self, row: TermInt, col: TermInt) -> char {
        self.cells.borrow()[row as usize][col as usize]
    }

    fn line(&self, row: TermInt) -> String {
        self.cells.borrow()[row as usize].iter().collect()
    }
}

struct MemSurface {
    cells: Cells,
    closed: Rc<Cell<usize>>,
    top: TermInt,
    left: TermInt,
    height: TermInt,
    width: TermInt,
    cursor: (TermInt, TermInt),
    fail_close: bool,
}

impl Surface for MemSurface {
    fn height(&self) -> TermInt {
        self.height
    }

    fn width(&self) -> TermInt {
        self.width
    }

    fn set_cursor(&mut self, row: TermInt, col: TermInt) -> io::Result<()> {
        self.cursor = (row, col);
        Ok(())
    }

    fn draw_glyph(&mut self, ch: char) -> io::Result<()> {
        let (row, col) = self.cursor;
        if row < self.height && col < self.width {
            self.cells.borrow_mut()[(self.top + row) as usize][(self.left + col) as usize] = ch;
        }
        self.cursor = (row, col + 1);
        Ok(())
    }

    fn draw_text(&mut self, text: &str) -> io::Result<()> {
        text.chars().try_for_each(|ch| self.draw_glyph(ch))
    }

    fn draw_border(&mut self) -> io::Result<()> {
        for col in 0..self.width {
            self.print_at((0, col), '-')?;
            self.print_at((self.height - 1, col), '-')?;
        }
        for row in 0..self.height {
            self.print_at((row, 0), '|')?;
            self.print_at((row, self.width - 1), '|')?;
        }
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
        }
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

impl Screen for MemScreen {
    type Surface = MemSurface;

    fn size(&self) -> (TermInt, TermInt) {
        (self.lines, self.cols)
    }

    fn create_surface(&mut self, height: TermInt, width: TermInt, top: TermInt, left: TermInt) -> io::Result<MemSurface> {
        assert!(top + height <= self.lines && left + width <= self.cols);
        let index = self.created;
        self.created += 1;
        Ok(MemSurface {
            cells: Rc::clone(&self.cells),
            closed: Rc::clone(&self.closed),
            top,
            left,
            height,
            width,
            cursor: (0, 0),
            fail_close: self.failing_close == Some(index),
        })
    }

    fn show_message(&mut self, msg: &str) -> io::Result<()> {
        self.messages.push(msg.to_string());
        Ok(())
    }
}

fn fast_config() -> GameConfig {
    GameConfig {
        slow_tick: Duration::from_millis(1),
        fast_tick: Duration::from_micros(500),
        ..GameConfig::default()
    }
}

fn new_game(lines: TermInt, cols: TermInt, config: GameConfig) -> Game<MemScreen, StdRng> {
    Game::new(MemScreen::new(lines, cols), StdRng::seed_from_u64(3), config).unwrap()
}

// The canvas starts at row 3, col 1 of the screen.
fn canvas_at(game: &Game<MemScreen, StdRng>, (row, col): (TermInt, TermInt)) -> char {
    game.screen().at(row + 3, col + 1)
}

fn silent_keys() -> (Sender<u8>, RawKeys<Receiver<u8>>) {
    let (tx, rx) = mpsc::channel();
    (tx, RawKeys::new(rx))
}

#[test]
fn test_setup_draws_the_board() {
    let game = new_game(24, 80, GameConfig::default());

    assert_eq!(game.state(), GameState::Setup);
    assert_eq!(game.snake().len(), 5);
    for col in 1..5 {
        assert_eq!(canvas_at(&game, (0, col)), '*');
    }
    assert_eq!(canvas_at(&game, (0, 5)), '>');

    assert!(game.screen().line(0).contains("Snek"));
    assert!(game.screen().line(1).starts_with("score: 0"));
    assert_eq!(game.screen().at(2, 0), '|');

    let food = game.food().pos();
    if !game.snake().touches(food) {
        assert_eq!(canvas_at(&game, food), '@');
    }
}

#[test]
fn test_too_small_terminal_fails_setup() {
    let result = Game::new(MemScreen::new(4, 80), StdRng::seed_from_u64(0), GameConfig::default());
    assert!(result.is_err());

    let result = Game::new(MemScreen::new(24, 6), StdRng::seed_from_u64(0), GameConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_tick_moves_and_redraws() {
    let mut game = new_game(24, 80, GameConfig::default());

    assert_eq!(game.tick(None).unwrap(), GameState::Running);
    assert_eq!(game.snake().head().unwrap(), (0, 6));
    assert_eq!(game.snake().len(), 5);
    assert_eq!(canvas_at(&game, (0, 1)), ' ');
    assert_eq!(canvas_at(&game, (0, 5)), '*');
    assert_eq!(canvas_at(&game, (0, 6)), '>');
}

#[test]
fn test_arrow_keys_turn_the_snake() {
    let mut game = new_game(24, 80, GameConfig::default());
    let rows: TermInt = 24 - 4;

    game.tick(Some(Key::Left)).unwrap();
    assert_eq!(game.snake().direction(), Direction::Up);
    assert_eq!(game.snake().head().unwrap(), (rows - 1, 5));
    assert_eq!(canvas_at(&game, (rows - 1, 5)), '^');

    game.tick(Some(Key::Right)).unwrap();
    assert_eq!(game.snake().direction(), Direction::Right);

    game.tick(Some(Key::Char('x'))).unwrap();
    assert_eq!(game.snake().direction(), Direction::Right);
}

#[test]
fn test_up_arrow_speeds_up_one_tick() {
    let config = GameConfig::default();
    let mut game = new_game(24, 80, config.clone());

    assert_eq!(game.tick_interval(), config.slow_tick);
    game.tick(Some(Key::Up)).unwrap();
    assert_eq!(game.tick_interval(), config.fast_tick);
    assert_eq!(game.snake().direction(), Direction::Right);
    game.tick(None).unwrap();
    assert_eq!(game.tick_interval(), config.slow_tick);
}

#[test]
fn test_quit_keys_stop_before_moving() {
    for key in [Key::Char('q'), Key::Ctrl('c')].iter() {
        let mut game = new_game(24, 80, GameConfig::default());
        assert_eq!(game.tick(Some(*key)).unwrap(), GameState::Quitting);
        assert_eq!(game.snake().head().unwrap(), (0, 5));
    }
}

#[test]
fn test_reversal_over_three_ticks_kills() {
    let mut game = new_game(24, 80, GameConfig::default());

    for _ in 0..3 {
        assert_eq!(game.tick(Some(Key::Right)).unwrap(), GameState::Running);
    }
    assert_eq!(game.tick(None).unwrap(), GameState::Dying);
    assert_eq!(game.state(), GameState::Dying);
}

#[test]
fn test_eating_updates_score_and_growth() {
    // A single-row canvas: the head sweeps every cell within one lap
    let mut game = new_game(5, 12, GameConfig::default());

    let mut ticks = 0;
    while game.snake().eat_count() == 0 {
        assert_eq!(game.tick(None).unwrap(), GameState::Running);
        ticks += 1;
        assert!(ticks <= 10, "never reached the food");
    }

    assert_eq!(game.snake().pending_growth(), 4);
    assert_eq!(game.snake().len(), 6);
    assert!(game.screen().line(1).starts_with("score: 1"));
}

#[test]
fn test_teardown_closes_every_surface_once() {
    let mut game = new_game(24, 80, GameConfig::default());
    game.teardown().unwrap();
    game.teardown().unwrap();
    assert_eq!(game.state(), GameState::TornDown);
    assert_eq!(game.screen().closed.get(), 3);
}

#[test]
fn test_teardown_closes_the_rest_when_one_close_fails() {
    // Surfaces are created border, canvas, header
    for failing in 0..3 {
        let mut screen = MemScreen::new(24, 80);
        screen.failing_close = Some(failing);
        let mut game = Game::new(screen, StdRng::seed_from_u64(3), GameConfig::default()).unwrap();

        assert!(game.teardown().is_err());
        assert_eq!(game.screen().closed.get(), 2);
        assert_eq!(game.state(), GameState::TornDown);

        assert!(game.teardown().is_ok());
        assert_eq!(game.screen().closed.get(), 2);
    }
}

#[test]
fn test_run_until_quit() {
    let mut game = new_game(24, 80, fast_config());
    let (tx, keys) = silent_keys();

    // Keep pressing q until the listener is gone
    let presser = thread::spawn(move || loop {
        thread::sleep(Duration::from_millis(10));
        if tx.send(b'q').is_err() {
            break;
        }
    });

    game.run(keys).unwrap();
    presser.join().unwrap();

    assert_eq!(game.state(), GameState::TornDown);
    assert_eq!(game.screen().closed.get(), 3);
    assert!(game.screen().messages.is_empty());
}

#[test]
fn test_run_until_death_shows_message() {
    // One row of ten cells: the snake grows until its head lands on its tail
    let mut game = new_game(5, 12, fast_config());
    let (_tx, keys) = silent_keys();

    game.run(keys).unwrap();

    assert_eq!(game.state(), GameState::TornDown);
    assert_eq!(game.screen().messages, vec!["You died.".to_string()]);
    assert_eq!(game.snake().len(), 11);
    assert_eq!(game.screen().closed.get(), 3);
}
