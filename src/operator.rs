//! Operator input: id lists on a line, commands as single keystrokes.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

/// Source of operator input. `None` means the input has ended.
pub trait Operator {
    /// Shows `prompt` and reads one line of whitespace-separated ids.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Shows `prompt` and reads one command key.
    fn read_key(&mut self, prompt: &str) -> io::Result<Option<char>>;
}

/// The controlling terminal, or a plain stdin pipe when there is none.
#[derive(Debug)]
pub struct Terminal {
    interactive: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }

    fn show(prompt: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(prompt.as_bytes())?;
        out.flush()
    }

    /// Reads the id line through the same event reader as the keys, so
    /// typeahead buffered by crossterm after a command key is not lost.
    fn raw_line() -> io::Result<Option<String>> {
        let _raw = RawMode::enable()?;
        let mut out = io::stdout();
        let mut line = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match line_edit(&key) {
                Edit::Insert(c) => {
                    line.push(c);
                    write!(out, "{c}")?;
                }
                Edit::Erase => {
                    if line.pop().is_some() {
                        out.write_all(b"\x08 \x08")?;
                    }
                }
                Edit::Submit => {
                    out.write_all(b"\r\n")?;
                    out.flush()?;
                    return Ok(Some(line));
                }
                Edit::End => {
                    out.write_all(b"\r\n")?;
                    out.flush()?;
                    return Ok(None);
                }
                Edit::Ignore => {}
            }
            out.flush()?;
        }
    }

    fn raw_key() -> io::Result<Option<char>> {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(None)
                }
                KeyCode::Char(c) => return Ok(Some(c)),
                KeyCode::Enter => return Ok(Some('\n')),
                KeyCode::Esc => return Ok(Some('\x1b')),
                _ => {}
            }
        }
    }
}

impl Operator for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Self::show(prompt)?;
        if self.interactive {
            return Self::raw_line();
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn read_key(&mut self, prompt: &str) -> io::Result<Option<char>> {
        Self::show(prompt)?;

        if !self.interactive {
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Ok(None);
            }
            return Ok(Some(line.trim().chars().next().unwrap_or('\n')));
        }

        let key = Self::raw_key()?;
        if let Some(c) = key.filter(|c| !c.is_control()) {
            print!("{c}");
        }
        println!();
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Insert(char),
    Erase,
    Submit,
    End,
    Ignore,
}

fn line_edit(key: &KeyEvent) -> Edit {
    if key.kind != KeyEventKind::Press {
        return Edit::Ignore;
    }
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => Edit::End,
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => Edit::Ignore,
        KeyCode::Char(c) => Edit::Insert(c),
        KeyCode::Tab => Edit::Insert(' '),
        KeyCode::Backspace => Edit::Erase,
        KeyCode::Enter => Edit::Submit,
        _ => Edit::Ignore,
    }
}

/// Keeps the terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("failed to restore terminal mode: {e}");
        }
    }
}
