//! The hex keypad abstraction.
use crate::definitions::keyboard;
use crate::error::KeyError;

/// Whether a [`Keyboard::set_key`] call reports a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// The current pressed/released state of the 16-key hex keypad.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. Three
/// opcodes read it: one skips an instruction if a specific key is pressed,
/// one does the same if it isn't, and the third waits for any key press and
/// stores the lowest-numbered pressed key. There is no debouncing,
/// auto-repeat, or event queue: only the current snapshot is visible.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    /// Builds a keyboard with every key released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every key to released.
    pub fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    /// Sets the state of `code`. Fails if `code` is outside `0x0..=0xF`.
    pub fn set_key(&mut self, kind: KeyEventKind, code: u8) -> Result<(), KeyError> {
        let index = code as usize;
        if index >= keyboard::SIZE {
            return Err(KeyError::BadKeyCode(code));
        }
        let to = matches!(kind, KeyEventKind::Pressed);
        log::debug!("key {:#X} -> {}", code, to);
        self.keys[index] = to;
        Ok(())
    }

    /// Whether `code` is currently pressed. `code` is masked to 4 bits by
    /// the caller, per the opcodes that consult it (`EX9E`/`EXA1`/`FX0A`).
    pub fn is_pressed(&self, code: u8) -> bool {
        self.keys[(code as usize) & (keyboard::SIZE - 1)]
    }

    /// The lowest-numbered currently pressed key, if any.
    pub fn lowest_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&p| p).map(|i| i as u8)
    }
}
