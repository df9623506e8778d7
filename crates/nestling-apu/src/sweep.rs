//! Sweep unit: periodically bends a pulse channel's period.
//!
//! The target period is the current period plus a shifted copy of itself,
//! negated when the negate flag is set. The two pulse channels negate
//! differently: pulse 1 by ones-complement (-change - 1), pulse 2 by
//! twos-complement (-change). Targets clamp at zero; a target above $7FF
//! or a current period below 8 mutes the channel.

/// Negation behavior, fixed per pulse channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegateMode {
    /// Pulse 1: subtract the change and one more.
    OnesComplement,
    /// Pulse 2: subtract the change.
    TwosComplement,
}

/// Sweep unit state.
#[derive(Debug, Clone)]
pub struct Sweep {
    enabled: bool,
    period: u8,
    negate: bool,
    shift: u8,
    reload: bool,
    divider: u8,
    mode: NegateMode,
}

impl Sweep {
    /// Create a sweep unit with the channel's negate mode.
    #[must_use]
    pub fn new(mode: NegateMode) -> Self {
        Self {
            enabled: false,
            period: 0,
            negate: false,
            shift: 0,
            reload: false,
            divider: 0,
            mode,
        }
    }

    /// Register write ($4001/$4005). Bits: `EPPP NSSS`.
    pub fn write(&mut self, value: u8) {
        self.enabled = value & 0x80 != 0;
        self.period = (value >> 4) & 0x07;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
        self.reload = true;
    }

    /// Compute the sweep target for a current period, clamped at zero.
    #[must_use]
    pub fn target_period(&self, current: u16) -> u16 {
        let change = i32::from(current >> self.shift);
        let delta = if self.negate {
            match self.mode {
                NegateMode::OnesComplement => -change - 1,
                NegateMode::TwosComplement => -change,
            }
        } else {
            change
        };
        (i32::from(current) + delta).max(0) as u16
    }

    /// Whether the sweep mutes the channel at this period.
    #[must_use]
    pub fn muted(&self, current: u16) -> bool {
        current < 8 || self.target_period(current) > 0x7FF
    }

    /// Half-frame clock. Returns the new period when an update fires.
    pub fn clock(&mut self, current: u16) -> Option<u16> {
        let update = if self.divider == 0 && self.enabled && self.shift > 0 && !self.muted(current)
        {
            Some(self.target_period(current))
        } else {
            None
        };

        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }

        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_add() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x01); // shift 1
        assert_eq!(sweep.target_period(400), 600);
    }

    #[test]
    fn test_negate_modes_differ_by_one() {
        let mut pulse1 = Sweep::new(NegateMode::OnesComplement);
        pulse1.write(0x09); // negate, shift 1
        assert_eq!(pulse1.target_period(400), 199);

        let mut pulse2 = Sweep::new(NegateMode::TwosComplement);
        pulse2.write(0x09);
        assert_eq!(pulse2.target_period(400), 200);
    }

    #[test]
    fn test_target_clamps_at_zero() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x08); // negate, shift 0: change = current
        assert_eq!(sweep.target_period(100), 0);
    }

    #[test]
    fn test_mute_conditions() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x01);
        assert!(sweep.muted(7)); // period too low
        assert!(!sweep.muted(8));
        assert!(sweep.muted(0x700)); // target 0xA80 > 0x7FF
    }

    #[test]
    fn test_clock_applies_update() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x81); // enabled, period 0, shift 1
        assert_eq!(sweep.clock(400), Some(600));
    }

    #[test]
    fn test_divider_delays_update() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x91); // enabled, divider period 1, shift 1
        // Divider starts at 0: first clock updates, then reloads to 1
        assert_eq!(sweep.clock(400), Some(600));
        assert_eq!(sweep.clock(600), None);
        assert!(sweep.clock(600).is_some());
    }

    #[test]
    fn test_no_update_when_muting() {
        let mut sweep = Sweep::new(NegateMode::OnesComplement);
        sweep.write(0x81);
        assert_eq!(sweep.clock(0x700), None);
    }
}
