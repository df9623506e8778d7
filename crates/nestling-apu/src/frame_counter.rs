//! Frame sequencer.
//!
//! A CPU-cycle counter that issues quarter-frame clocks (envelopes, linear
//! counter) and half-frame clocks (length counters, sweeps), plus the
//! frame IRQ in 4-step mode. The half-integer APU-cycle positions from the
//! hardware documentation appear here doubled, as whole CPU cycles:
//!
//! ```text
//! 4-step: quarter at 7457, 14913, 22371, 29829; half at 14913, 29829;
//!         IRQ at 29829; wraps at 29830
//! 5-step: quarter at 7457, 14913, 22371, 37281; half at 14913, 37281;
//!         no IRQ; wraps at 37282
//! ```
//!
//! Writing $4017 resets the counter; with bit 7 set it also issues an
//! immediate quarter + half clock.

/// Sequence length in CPU cycles, 4-step mode.
const FOUR_STEP_LENGTH: u32 = 29_830;
/// Sequence length in CPU cycles, 5-step mode.
const FIVE_STEP_LENGTH: u32 = 37_282;

/// Clocks produced by one frame-counter step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClocks {
    /// Clock envelopes and the triangle linear counter.
    pub quarter: bool,
    /// Clock length counters and sweep units.
    pub half: bool,
}

impl FrameClocks {
    const NONE: Self = Self {
        quarter: false,
        half: false,
    };
    const QUARTER: Self = Self {
        quarter: true,
        half: false,
    };
    const BOTH: Self = Self {
        quarter: true,
        half: true,
    };
}

/// The frame sequencer.
#[derive(Debug, Clone, Default)]
pub struct FrameCounter {
    /// CPU cycles into the current sequence. Always below the mode length.
    cycle: u32,
    /// 5-step mode selected ($4017 bit 7).
    five_step: bool,
    /// Frame IRQ inhibited ($4017 bit 6).
    irq_inhibit: bool,
    /// Frame IRQ latch.
    irq_flag: bool,
}

impl FrameCounter {
    /// Create a sequencer in 4-step mode at cycle 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// $4017 write. Resets the cycle counter; setting bit 6 clears the
    /// frame IRQ. Returns the immediate quarter + half clock produced when
    /// bit 7 selects 5-step mode.
    pub fn write(&mut self, value: u8) -> FrameClocks {
        self.five_step = value & 0x80 != 0;
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.cycle = 0;
        if self.five_step {
            FrameClocks::BOTH
        } else {
            FrameClocks::NONE
        }
    }

    /// Advance one CPU cycle, returning any quarter/half clocks due.
    pub fn clock(&mut self) -> FrameClocks {
        let clocks = if self.five_step {
            match self.cycle {
                7_457 | 22_371 => FrameClocks::QUARTER,
                14_913 | 37_281 => FrameClocks::BOTH,
                _ => FrameClocks::NONE,
            }
        } else {
            match self.cycle {
                7_457 | 22_371 => FrameClocks::QUARTER,
                14_913 => FrameClocks::BOTH,
                29_829 => {
                    if !self.irq_inhibit {
                        self.irq_flag = true;
                    }
                    FrameClocks::BOTH
                }
                _ => FrameClocks::NONE,
            }
        };

        let length = if self.five_step {
            FIVE_STEP_LENGTH
        } else {
            FOUR_STEP_LENGTH
        };
        self.cycle = (self.cycle + 1) % length;

        clocks
    }

    /// Frame IRQ latch state.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Clear the frame IRQ ($4015 read side effect).
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Cycles into the current sequence. The parity of this counter is
    /// what the DMA controller consults for get/put alignment.
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Whether the sequencer is in the "put" half of an APU cycle.
    #[must_use]
    pub fn is_put_cycle(&self) -> bool {
        self.cycle % 2 == 1
    }
}
