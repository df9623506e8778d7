//! CPU status register (P register) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt Disable
//! │  │  │  │  └────────── Decimal (storable, but arithmetic stays binary)
//! │  │  │  └───────────── Break (1 when pushed from PHP/BRK, 0 from IRQ/NMI)
//! │  │  └──────────────── Unused (always 1)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry flag.
        const C = 1 << 0;

        /// Zero flag.
        const Z = 1 << 1;

        /// Interrupt disable flag. When set, IRQ is masked; NMI is not
        /// affected.
        const I = 1 << 2;

        /// Decimal mode flag. The NES CPU variant has no BCD unit, so the
        /// flag is storable but ADC/SBC remain binary.
        const D = 1 << 3;

        /// Break flag. Only observable in copies pushed to the stack: 1 for
        /// PHP/BRK, 0 for IRQ/NMI.
        const B = 1 << 4;

        /// Unused flag, always 1.
        const U = 1 << 5;

        /// Overflow flag.
        const V = 1 << 6;

        /// Negative flag.
        const N = 1 << 7;
    }
}

impl Status {
    /// Status after power-on: I and U set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Creates a status register in the power-on state.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Sets the Zero and Negative flags from a result value.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Converts the register to a byte for pushing to the stack. U is
    /// always set; B is set for PHP/BRK pushes only.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if brk {
            value |= Self::B.bits();
        }
        value
    }

    /// Creates a status register from a byte pulled off the stack. B is
    /// discarded and U forced on, matching the live register's invariants.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
