//! Triangle channel.
//!
//! Steps through a fixed 32-entry triangle sequence. The timer runs at the
//! full CPU rate, and a linear counter (clocked on quarter frames) gates
//! the sequencer alongside the length counter.

use crate::length_counter::LengthCounter;
use crate::timer::Timer;

/// The 32-step triangle waveform.
#[rustfmt::skip]
const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Triangle channel.
#[derive(Debug, Clone)]
pub struct Triangle {
    length: LengthCounter,
    timer: Timer,
    /// Control flag: halts the length counter and holds the linear reload.
    control: bool,
    linear_counter: u8,
    linear_reload_value: u8,
    linear_reload: bool,
    /// Sequence position (0-31).
    step: u8,
}

impl Triangle {
    /// Create a silent triangle channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: LengthCounter::new(),
            timer: Timer::new(),
            control: false,
            linear_counter: 0,
            linear_reload_value: 0,
            linear_reload: false,
            step: 0,
        }
    }

    /// $4008: control flag and linear counter reload value.
    pub fn write_linear(&mut self, value: u8) {
        self.control = value & 0x80 != 0;
        self.linear_reload_value = value & 0x7F;
        self.length.set_halt(self.control);
    }

    /// $400A: timer low.
    pub fn write_timer_lo(&mut self, value: u8) {
        self.timer.set_period_lo(value);
    }

    /// $400B: length load, timer high; sets the linear reload latch.
    pub fn write_timer_hi(&mut self, value: u8) {
        self.timer.set_period_hi(value);
        self.length.load(value >> 3);
        self.linear_reload = true;
    }

    /// $4015 channel enable bit.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.length.set_enabled(enabled);
    }

    /// Whether the length counter is non-zero.
    #[must_use]
    pub fn active(&self) -> bool {
        self.length.active()
    }

    /// CPU-cycle clock: the sequencer advances while both gates are open.
    pub fn clock_timer(&mut self) {
        if self.timer.clock() && self.length.active() && self.linear_counter > 0 {
            self.step = (self.step + 1) & 0x1F;
        }
    }

    /// Quarter-frame clock of the linear counter.
    pub fn clock_linear(&mut self) {
        if self.linear_reload {
            self.linear_counter = self.linear_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.linear_reload = false;
        }
    }

    /// Half-frame length clock.
    pub fn clock_length(&mut self) {
        self.length.clock();
    }

    /// Current output level (0-15). Periods below 2 are suppressed: they
    /// produce ultrasonic output that shows up as a DC pop.
    #[must_use]
    pub fn output(&self) -> u8 {
        if self.length.active() && self.linear_counter > 0 && self.timer.period() >= 2 {
            TRIANGLE_SEQUENCE[self.step as usize]
        } else {
            0
        }
    }

    /// Length counter value (for $4015 reads and debugging).
    #[must_use]
    pub fn length_value(&self) -> u8 {
        self.length.value()
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new()
    }
}
