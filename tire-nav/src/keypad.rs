//! Destination code entry on the four-column keypad.
//!
//! Each column holds one decimal digit; up/down wrap around 0–9. The code
//! is read left to right, e.g. columns `[0, 0, 4, 2]` give `"0042"`.

use tire_hal::KEYCODE_COLUMNS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    digits: [u8; KEYCODE_COLUMNS],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a column. Returns `false` for an unknown column.
    pub fn up(&mut self, column: usize) -> bool {
        self.adjust(column, 1)
    }

    /// Decrement a column. Returns `false` for an unknown column.
    pub fn down(&mut self, column: usize) -> bool {
        self.adjust(column, 9)
    }

    fn adjust(&mut self, column: usize, by: u8) -> bool {
        match self.digits.get_mut(column) {
            Some(digit) => {
                *digit = (*digit + by) % 10;
                true
            }
            None => false,
        }
    }

    /// Current code as a string of digits
    pub fn code(&self) -> String {
        self.digits
            .iter()
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(Keypad::new().code(), "0000");
    }

    #[test]
    fn test_up_down_wrap() {
        let mut keypad = Keypad::new();
        assert!(keypad.down(0));
        assert_eq!(keypad.code(), "9000");
        assert!(keypad.up(0));
        assert_eq!(keypad.code(), "0000");

        for _ in 0..12 {
            keypad.up(3);
        }
        keypad.up(2);
        keypad.up(2);
        keypad.up(2);
        keypad.up(2);
        assert_eq!(keypad.code(), "0042");
    }

    #[test]
    fn test_unknown_column() {
        let mut keypad = Keypad::new();
        assert!(!keypad.up(KEYCODE_COLUMNS));
        assert!(!keypad.down(7));
        assert_eq!(keypad.code(), "0000");
    }
}
