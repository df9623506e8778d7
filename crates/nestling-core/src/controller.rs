//! Standard controller.
//!
//! A strobe-latched shift register. While the strobe bit is high, reads
//! return the live state of the A button; when the strobe drops, the
//! current button state is captured and reads shift it out one bit at a
//! time in A, B, Select, Start, Up, Down, Left, Right order. After all
//! eight bits, official controllers return 1.

use bitflags::bitflags;

bitflags! {
    /// Controller button bits, in shift-out order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        /// A button.
        const A = 1 << 0;
        /// B button.
        const B = 1 << 1;
        /// Select button.
        const SELECT = 1 << 2;
        /// Start button.
        const START = 1 << 3;
        /// D-pad up.
        const UP = 1 << 4;
        /// D-pad down.
        const DOWN = 1 << 5;
        /// D-pad left.
        const LEFT = 1 << 6;
        /// D-pad right.
        const RIGHT = 1 << 7;
    }
}

/// Standard NES controller.
#[derive(Debug, Clone, Default)]
pub struct StandardController {
    strobe: bool,
    state: Buttons,
    shift: u8,
}

impl StandardController {
    /// Create a controller with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// $4016 write: bit 0 is the strobe. Dropping it captures the current
    /// button state into the shift register.
    pub fn write(&mut self, value: u8) {
        let strobe = value & 0x01 != 0;
        if self.strobe && !strobe {
            self.shift = self.state.bits();
        }
        self.strobe = strobe;
    }

    /// $4016 read: the live A button while strobed, otherwise the next
    /// shift-register bit. Ones shift in behind the report.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.state.bits() & 0x01
        } else {
            let bit = self.shift & 0x01;
            self.shift = (self.shift >> 1) | 0x80;
            bit
        }
    }

    /// Press a button.
    pub fn press(&mut self, button: Buttons) {
        self.state.insert(button);
    }

    /// Release a button.
    pub fn release(&mut self, button: Buttons) {
        self.state.remove(button);
    }

    /// Replace the whole button state.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.state = buttons;
    }

    /// Current button state.
    #[must_use]
    pub fn buttons(&self) -> Buttons {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strobe_reads_live_a_button() {
        let mut pad = StandardController::new();
        pad.write(1);
        assert_eq!(pad.read(), 0);
        pad.press(Buttons::A);
        assert_eq!(pad.read(), 1);
        pad.release(Buttons::A);
        assert_eq!(pad.read(), 0);
    }

    #[test]
    fn test_shift_out_order() {
        let mut pad = StandardController::new();
        pad.press(Buttons::A);
        pad.press(Buttons::SELECT);
        pad.press(Buttons::DOWN);
        pad.press(Buttons::RIGHT);

        pad.write(1);
        pad.write(0);

        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits, [1, 0, 1, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_exhausted_reads_return_one() {
        let mut pad = StandardController::new();
        pad.write(1);
        pad.write(0);
        for _ in 0..8 {
            let _ = pad.read();
        }
        assert_eq!(pad.read(), 1);
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn test_latch_snapshot_ignores_later_presses() {
        let mut pad = StandardController::new();
        pad.write(1);
        pad.write(0);
        // Pressed after the latch: not visible in this report
        pad.press(Buttons::A);
        assert_eq!(pad.read(), 0);
    }

    proptest::proptest! {
        #[test]
        fn shift_out_reports_any_state(bits in proptest::prelude::any::<u8>()) {
            let mut pad = StandardController::new();
            pad.set_buttons(Buttons::from_bits_truncate(bits));
            pad.write(1);
            pad.write(0);
            for position in 0..8 {
                proptest::prop_assert_eq!(pad.read(), (bits >> position) & 1);
            }
            proptest::prop_assert_eq!(pad.read(), 1);
        }
    }
}
