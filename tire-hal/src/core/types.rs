//! Values exchanged with the device besides sensor samples.

use serde::{Deserialize, Serialize};

/// Number of keycode columns on the keypad.
pub const KEYCODE_COLUMNS: usize = 4;

/// A key press on the user's keypad.
///
/// Keycode columns are numbered from 0. Each column holds one decimal digit
/// of the destination code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "column", rename_all = "snake_case")]
pub enum InputEvent {
    /// Increment the digit of a keycode column
    KeycodeUp(u8),
    /// Decrement the digit of a keycode column
    KeycodeDown(u8),
    /// Route to the selected destination
    StartNavigation,
    /// Force a radio fix and announce it
    WhereAmI,
    /// Read back the selected destination
    CurrentSelection,
}

impl InputEvent {
    /// Keycode column touched by this event, if any.
    pub fn column(&self) -> Option<usize> {
        match *self {
            InputEvent::KeycodeUp(col) | InputEvent::KeycodeDown(col) => Some(col as usize),
            _ => None,
        }
    }
}
