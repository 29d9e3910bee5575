//! Terminal key to game input mapping.

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    MoveLeft,
    MoveRight,
    Fire,
    /// Confirm the next round from the end-of-round panel.
    NextRound,
    /// Close the game from the end-of-round panel.
    CloseGame,
    /// Leave the program at any time.
    Quit,
}

/// Map a key press to a game input; unrecognised keys yield `None`.
pub fn input_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Input> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::MoveRight),
        KeyCode::Char(' ') => Some(Input::Fire),
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') => Some(Input::NextRound),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Input::CloseGame),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}
