//! Keyboard mapping
//!
//! Only key-down transitions reach here; the front-end drops auto-repeat
//! events so a held key moves the player exactly once.

use crate::settings::KeyLayout;
use crate::sim::{Command, Direction};

/// Map a DOM `KeyboardEvent.key` value to a movement command
pub fn map_key(key: &str, layout: KeyLayout) -> Option<Command> {
    let key = key.to_lowercase();
    let dir = match key.as_str() {
        "arrowup" if layout.arrows() => Direction::Up,
        "arrowdown" if layout.arrows() => Direction::Down,
        "arrowleft" if layout.arrows() => Direction::Left,
        "arrowright" if layout.arrows() => Direction::Right,
        "w" if layout.wasd() => Direction::Up,
        "s" if layout.wasd() => Direction::Down,
        "a" if layout.wasd() => Direction::Left,
        "d" if layout.wasd() => Direction::Right,
        _ => return None,
    };
    Some(Command::Move(dir))
}
