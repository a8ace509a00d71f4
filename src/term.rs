use crate::{Coords, TermInt};
use std::io::{self, stdout, Stdout, Write};

use crossterm::event::{read, Event, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};
use log::warn;

/// A rectangular region of the screen addressed relative to its own origin.
/// Drawing is buffered until [`Surface::refresh`].
pub trait Surface {
    fn height(&self) -> TermInt;
    fn width(&self) -> TermInt;
    fn set_cursor(&mut self, row: TermInt, col: TermInt) -> io::Result<()>;
    /// Draws at the cursor and advances it one column.
    fn draw_glyph(&mut self, ch: char) -> io::Result<()>;
    fn draw_text(&mut self, text: &str) -> io::Result<()>;
    fn draw_border(&mut self) -> io::Result<()>;
    fn refresh(&mut self) -> io::Result<()>;
    /// Blanks the region.
    fn close(&mut self) -> io::Result<()>;

    fn print_at(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        self.set_cursor(pos.0, pos.1)?;
        self.draw_glyph(ch)
    }
}

pub trait Screen {
    type Surface: Surface;

    /// `(lines, cols)`
    fn size(&self) -> (TermInt, TermInt);

    fn create_surface(&mut self, height: TermInt, width: TermInt, top: TermInt, left: TermInt)
        -> io::Result<Self::Surface>;

    /// Shows a boxed message in the middle of the screen and waits for a key.
    fn show_message(&mut self, msg: &str) -> io::Result<()>;
}

/// Owns the terminal mode. Raw mode and the alternate screen are entered by
/// [`TermManager::setup`] and left again on drop.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    active: bool,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(TermManager { width, height, stdout: stdout(), active: false })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(terminal::ClearType::All))
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    fn read_key_blocking(&self) -> io::Result<()> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }
}

impl Screen for TermManager {
    type Surface = TermSurface;

    fn size(&self) -> (TermInt, TermInt) {
        (self.height, self.width)
    }

    fn create_surface(&mut self, height: TermInt, width: TermInt, top: TermInt, left: TermInt) -> io::Result<TermSurface> {
        if u32::from(top) + u32::from(height) > u32::from(self.height)
            || u32::from(left) + u32::from(width) > u32::from(self.width)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}x{} surface at ({}, {}) does not fit the terminal", height, width, top, left),
            ));
        }
        Ok(TermSurface { stdout: stdout(), top, left, height, width, cursor: (0, 0) })
    }

    fn show_message(&mut self, msg: &str) -> io::Result<()> {
        let msg_height = self.height.min(5);
        let msg_width = self.width.min(msg.chars().count() as TermInt + 6);
        let top = self.height.saturating_sub(msg_height) / 2;
        let left = self.width.saturating_sub(msg_width) / 2;

        let mut win = self.create_surface(msg_height, msg_width, top, left)?;
        win.draw_border()?;
        win.set_cursor(2, 3)?;
        win.draw_text(msg)?;
        win.refresh()?;

        self.read_key_blocking()?;
        win.close()
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("failed to restore the terminal: {}", e);
        }
    }
}

pub struct TermSurface {
    stdout: Stdout,
    top: TermInt,
    left: TermInt,
    height: TermInt,
    width: TermInt,
    cursor: Coords,
}

impl Surface for TermSurface {
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
        // Clipped, like drawing past the edge of a curses window
        if row < self.height && col < self.width {
            queue!(self.stdout, cursor::MoveTo(self.left + col, self.top + row), style::Print(ch))?;
        }
        self.cursor = (row, col.saturating_add(1));
        Ok(())
    }

    fn draw_text(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            self.draw_glyph(ch)?;
        }
        Ok(())
    }

    fn draw_border(&mut self) -> io::Result<()> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Ok(());
        }

        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((0, x), ch)?;
            self.print_at((end_y, x), ch)?;
        }

        for y in 1..end_y {
            self.print_at((y, 0), '|')?;
            self.print_at((y, end_x), '|')?;
        }

        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        let blank = " ".repeat(self.width as usize);
        for y in 0..self.height {
            queue!(self.stdout, cursor::MoveTo(self.left, self.top + y), style::Print(&blank))?;
        }
        self.stdout.flush()
    }
}
