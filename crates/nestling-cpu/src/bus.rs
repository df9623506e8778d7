//! Memory bus trait for CPU communication.
//!
//! The `Bus` trait is the CPU's entire view of the outside world. All memory
//! traffic, interrupt line sampling and DMA halting go through it, so the CPU
//! itself holds no references to other components.

use crate::access::Access;

/// Memory bus interface.
///
/// Implementors provide memory access to the CPU. `read` and `write` are
/// called once per CPU cycle; a full system implementation advances the
/// other components inside them and updates the interrupt lines the CPU
/// samples afterwards.
///
/// # Examples
///
/// ```
/// use nestling_cpu::{Access, Bus};
///
/// struct FlatBus {
///     memory: [u8; 0x10000],
/// }
///
/// impl Bus for FlatBus {
///     fn read(&mut self, addr: u16, _access: Access) -> u8 {
///         self.memory[addr as usize]
///     }
///
///     fn write(&mut self, addr: u16, value: u8, _access: Access) {
///         self.memory[addr as usize] = value;
///     }
/// }
/// ```
pub trait Bus {
    /// Read a byte from memory.
    ///
    /// Called exactly once per read cycle. May have side effects (hardware
    /// registers); `access` describes the kind of cycle.
    fn read(&mut self, addr: u16, access: Access) -> u8;

    /// Write a byte to memory.
    ///
    /// Called exactly once per write cycle. During the dummy write of a
    /// read-modify-write instruction, `access` contains [`Access::DUMMY`].
    fn write(&mut self, addr: u16, value: u8, access: Access);

    /// Read a byte without side effects, for disassembly and debugging.
    ///
    /// Default implementation returns 0.
    #[inline]
    fn peek(&self, addr: u16) -> u8 {
        let _ = addr;
        0
    }

    /// Current state of the NMI line.
    ///
    /// The CPU samples this after every bus cycle and latches the rising
    /// edge.
    #[inline]
    fn nmi_line(&self) -> bool {
        false
    }

    /// Current state of the IRQ line.
    ///
    /// The CPU samples this after every bus cycle; the level must still be
    /// high at the instruction boundary for the interrupt to be taken.
    #[inline]
    fn irq_line(&self) -> bool {
        false
    }

    /// Whether a peripheral has requested the CPU be halted for DMA.
    ///
    /// The CPU checks this immediately before every read cycle and, when
    /// set, calls [`Bus::service_halt`] with the address it was about to
    /// read.
    #[inline]
    fn halt_requested(&self) -> bool {
        false
    }

    /// Service a pending DMA halt.
    ///
    /// The implementation may perform any number of bus cycles (the halt
    /// cycle itself, alignment cycles, the transfer proper) and must return
    /// how many it performed; the CPU adds them to its cycle counter and
    /// then resumes with the read it was about to do. The pending request
    /// must be cleared before returning.
    #[inline]
    fn service_halt(&mut self, next_addr: u16) -> u64 {
        let _ = next_addr;
        0
    }
}
