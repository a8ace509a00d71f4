use anyhow::Result;

use snek::game::{Game, GameConfig};
use snek::input::TerminalKeys;
use snek::term::TermManager;

fn main() -> Result<()> {
    let mut term = TermManager::new()?;
    term.setup()?;

    // The terminal is restored when the game, which owns it, is dropped
    let mut game = Game::new(term, rand::thread_rng(), GameConfig::default())?;
    game.run(TerminalKeys::new())
}
