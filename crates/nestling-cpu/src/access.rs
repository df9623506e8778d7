//! Memory access classification.
//!
//! Every bus cycle carries an [`Access`] value describing what kind of cycle
//! it is. Peripherals mostly ignore it, but debuggers, traces and tests use
//! it to tell instruction fetches, dummy cycles and DMA traffic apart.

use bitflags::bitflags;

bitflags! {
    /// Kind of memory access performed during a bus cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        /// Data read.
        const READ = 1 << 0;

        /// Data write.
        const WRITE = 1 << 1;

        /// Opcode fetch.
        const EXECUTE = 1 << 2;

        /// Dummy cycle: the address/data are a side effect of the
        /// instruction's internal operation, not part of its semantics.
        const DUMMY = 1 << 3;

        /// Cycle performed on behalf of a DMA transfer while the CPU is
        /// halted.
        const DMA = 1 << 4;

        /// Dummy read (combination).
        const DUMMY_READ = Self::DUMMY.bits() | Self::READ.bits();

        /// Dummy write (combination).
        const DUMMY_WRITE = Self::DUMMY.bits() | Self::WRITE.bits();
    }
}

impl Access {
    /// Whether this access reads from the bus.
    #[inline]
    #[must_use]
    pub const fn is_read(self) -> bool {
        self.contains(Self::READ) || self.contains(Self::EXECUTE)
    }

    /// Whether this access writes to the bus.
    #[inline]
    #[must_use]
    pub const fn is_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    /// Whether this is a dummy cycle.
    #[inline]
    #[must_use]
    pub const fn is_dummy(self) -> bool {
        self.contains(Self::DUMMY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composites() {
        assert!(Access::DUMMY_READ.is_read());
        assert!(Access::DUMMY_READ.is_dummy());
        assert!(!Access::DUMMY_READ.is_write());

        assert!(Access::DUMMY_WRITE.is_write());
        assert!(Access::DUMMY_WRITE.is_dummy());
    }

    #[test]
    fn test_execute_is_read() {
        assert!(Access::EXECUTE.is_read());
        assert!(!Access::EXECUTE.is_dummy());
    }

    #[test]
    fn test_dma_flag_composes() {
        let access = Access::DMA | Access::DUMMY_READ;
        assert!(access.contains(Access::DMA));
        assert!(access.is_read());
        assert!(access.is_dummy());
    }
}
