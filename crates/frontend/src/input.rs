//! Host key mapping
//!
//! Arrows drive the D-pad, Enter/Escape are Start/Select, Z/X are A/B.
//! Quitting is the window close button, so Escape stays free for Select.

use dmg_gb::{Button, GbSystem};
use minifb::{Key, Window};

const KEY_MAP: [(Key, Button); 8] = [
    (Key::Right, Button::Right),
    (Key::Left, Button::Left),
    (Key::Up, Button::Up),
    (Key::Down, Button::Down),
    (Key::Z, Button::A),
    (Key::X, Button::B),
    (Key::Escape, Button::Select),
    (Key::Enter, Button::Start),
];

/// Push the current key states into the joypad. Edges are detected by the
/// joypad itself, so polling once per frame is enough.
pub fn apply(window: &Window, system: &mut GbSystem) {
    for (key, button) in KEY_MAP {
        system.button_event(button, window.is_key_down(key));
    }
}
