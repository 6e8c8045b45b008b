//! Game Boy joypad (P1 register, 0xFF00)
//!
//! The eight keys sit in a 2x4 matrix read through a single register. The
//! program selects a column by writing bit 4 (directions) or bit 5 (buttons)
//! low, then reads the four selected lines in the low nibble; lines are
//! active-low (0 = pressed). A key going down in the selected column latches
//! the joypad interrupt.

use dmg_core::logging::{LogCategory, LogLevel};

/// The eight physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Line index within the selected column (bit 0..3)
    fn line(self) -> usize {
        match self {
            Button::Right | Button::A => 0,
            Button::Left | Button::B => 1,
            Button::Up | Button::Select => 2,
            Button::Down | Button::Start => 3,
        }
    }

    fn is_direction(self) -> bool {
        matches!(self, Button::Right | Button::Left | Button::Up | Button::Down)
    }

    fn index(self) -> usize {
        match self {
            Button::Right => 0,
            Button::Left => 1,
            Button::Up => 2,
            Button::Down => 3,
            Button::A => 4,
            Button::B => 5,
            Button::Select => 6,
            Button::Start => 7,
        }
    }
}

/// Joypad state and column selects
pub struct Joypad {
    /// Key-down state, indexed by `Button::index`
    pressed: [bool; 8],
    /// Bit 4 of the last select write (0 = directions selected)
    select_directions: bool,
    /// Bit 5 of the last select write (0 = buttons selected)
    select_buttons: bool,
    /// Joypad interrupt latch
    interrupt_pending: bool,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            pressed: [false; 8],
            select_directions: false,
            select_buttons: false,
            interrupt_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write the column selects (bits 4 and 5, active-low)
    pub fn write_select(&mut self, val: u8) {
        self.select_directions = val & 0x10 == 0;
        self.select_buttons = val & 0x20 == 0;
    }

    /// Compose the register: select bits mirrored in the high nibble, the
    /// four selected lines in the low nibble (1 = released)
    pub fn read(&self) -> u8 {
        let mut lines = 0x0F;
        for (i, &down) in self.pressed.iter().enumerate() {
            if !down {
                continue;
            }
            let selected = if i < 4 {
                self.select_directions
            } else {
                self.select_buttons
            };
            if selected {
                lines &= !(1 << (i % 4));
            }
        }
        let mut val = 0xC0 | lines;
        if !self.select_directions {
            val |= 0x10;
        }
        if !self.select_buttons {
            val |= 0x20;
        }
        val
    }

    /// Apply a host key event. A fresh key-down in the currently selected
    /// column latches the joypad interrupt.
    pub fn set_button(&mut self, button: Button, down: bool) {
        let idx = button.index();
        let was_down = self.pressed[idx];
        self.pressed[idx] = down;

        if down && !was_down {
            let selected = if button.is_direction() {
                self.select_directions
            } else {
                self.select_buttons
            };
            if selected {
                self.interrupt_pending = true;
                dmg_core::log!(
                    LogCategory::Interrupts,
                    LogLevel::Debug,
                    "joypad interrupt: {:?} down on line {}",
                    button,
                    button.line()
                );
            }
        }
    }

    /// Collect and clear the interrupt latch
    pub fn take_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.interrupt_pending)
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}
