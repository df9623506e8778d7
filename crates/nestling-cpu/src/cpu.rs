//! 6502 CPU core implementation.
//!
//! Instructions are executed as their exact sequence of bus cycles: the
//! cycle counter is only ever incremented inside [`Cpu::read_cycle`] and
//! [`Cpu::write_cycle`], so the documented timing (page-cross penalties,
//! forced dummy reads on indexed writes, the RMW dummy write) falls out of
//! the access pattern instead of being bookkept separately.

use crate::access::Access;
use crate::bus::Bus;
use crate::opcodes::{AddrMode, Mnemonic, OPCODE_TABLE};
use crate::status::Status;
use crate::{vectors, CpuError};

/// How an instruction uses its effective address. Determines whether the
/// indexed-addressing fix-up cycle is conditional (reads) or forced
/// (writes and read-modify-writes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpClass {
    Read,
    Write,
    Rmw,
}

/// NES 6502 CPU.
///
/// Cycle-accurate implementation of the MOS 6502 as used in the NES; timing
/// follows the NesDev wiki cycle-by-cycle listings.
#[derive(Debug)]
pub struct Cpu {
    /// Accumulator register.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer (offset into $0100-$01FF).
    pub sp: u8,
    /// Status flags.
    pub status: Status,
    /// Total cycles executed since power-on. Strictly non-decreasing.
    pub cycles: u64,

    /// Last sampled level of the NMI line.
    nmi_level: bool,
    /// Edge latch: a 0->1 transition of the NMI line was seen. Cleared only
    /// when the NMI sequence runs.
    nmi_detected: bool,
    /// Level of the IRQ line as of the most recent bus cycle.
    irq_line: bool,
}

impl Cpu {
    /// Create a new CPU. Call [`Cpu::power_on`] before executing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0,
            status: Status::POWER_ON,
            cycles: 0,
            nmi_level: false,
            nmi_detected: false,
            irq_line: false,
        }
    }

    /// Power on the CPU: clear registers, then run the reset sequence
    /// (7 cycles, leaves SP at $FD and PC at the reset vector).
    pub fn power_on(&mut self, bus: &mut impl Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0;
        self.status = Status::POWER_ON;
        self.cycles = 0;
        self.nmi_level = false;
        self.nmi_detected = false;
        self.irq_line = false;
        self.reset_sequence(bus);
    }

    /// Soft reset: registers survive, SP drops by 3 with writes suppressed,
    /// I is set and PC reloads from the reset vector. 7 cycles.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.nmi_detected = false;
        self.reset_sequence(bus);
    }

    /// The 7-cycle reset sequence. The three "push" cycles decrement SP but
    /// suppress the writes, which shows up on the bus as stack reads.
    fn reset_sequence(&mut self, bus: &mut impl Bus) {
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        for _ in 0..3 {
            self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
            self.sp = self.sp.wrapping_sub(1);
        }
        self.status.insert(Status::I);
        let lo = self.read_cycle(bus, vectors::RESET, Access::READ);
        let hi = self.read_cycle(bus, vectors::RESET + 1, Access::READ);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    /// Set the NMI line level. A rising edge is latched and serviced at the
    /// next instruction boundary.
    pub fn set_nmi_line(&mut self, level: bool) {
        if level && !self.nmi_level {
            self.nmi_detected = true;
        }
        self.nmi_level = level;
    }

    /// Set the IRQ line level. Level-triggered: taken at the next
    /// instruction boundary while high and I is clear.
    pub fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Whether an NMI edge is latched and waiting to be serviced.
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_detected
    }

    /// Execute one instruction (or one interrupt sequence) and return the
    /// number of cycles consumed, including any DMA cycles stolen through
    /// the halt hook.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::IllegalOpcode`] when an unimplemented or jamming
    /// opcode is fetched. The CPU is left pointing past the bad opcode but
    /// further execution is not meaningful.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u64, CpuError> {
        let start = self.cycles;

        // Interrupts latched during the previous instruction are serviced
        // at the boundary. NMI wins over IRQ; IRQ is gated by I.
        if self.nmi_detected {
            self.nmi_detected = false;
            self.interrupt(bus, vectors::NMI);
            return Ok(self.cycles - start);
        }
        if self.irq_line && !self.status.contains(Status::I) {
            self.interrupt(bus, vectors::IRQ);
            return Ok(self.cycles - start);
        }

        let opcode_addr = self.pc;
        let opcode = self.read_cycle(bus, self.pc, Access::EXECUTE);
        self.pc = self.pc.wrapping_add(1);

        let info = OPCODE_TABLE[opcode as usize];
        self.execute(bus, info.mnemonic, info.mode)
            .map_err(|()| {
                log::error!("CPU jammed on opcode ${opcode:02X} at ${opcode_addr:04X}");
                CpuError::IllegalOpcode {
                    opcode,
                    addr: opcode_addr,
                }
            })?;

        Ok(self.cycles - start)
    }

    // =====================================================================
    // Bus cycles
    // =====================================================================

    /// One read cycle. Drains a pending DMA halt first, then performs the
    /// read and re-samples the interrupt lines.
    fn read_cycle(&mut self, bus: &mut impl Bus, addr: u16, access: Access) -> u8 {
        if bus.halt_requested() {
            self.cycles += bus.service_halt(addr);
        }
        self.cycles += 1;
        let value = bus.read(addr, access);
        self.sample_lines(bus);
        value
    }

    /// One write cycle. Writes never drain a halt; the CPU only yields the
    /// bus on read cycles.
    fn write_cycle(&mut self, bus: &mut impl Bus, addr: u16, value: u8, access: Access) {
        self.cycles += 1;
        bus.write(addr, value, access);
        self.sample_lines(bus);
    }

    fn sample_lines(&mut self, bus: &impl Bus) {
        let nmi = bus.nmi_line();
        if nmi && !self.nmi_level {
            self.nmi_detected = true;
        }
        self.nmi_level = nmi;
        self.irq_line = bus.irq_line();
    }

    /// Fetch the next instruction byte.
    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = self.read_cycle(bus, self.pc, Access::READ);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        self.write_cycle(bus, 0x0100 | u16::from(self.sp), value, Access::WRITE);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::READ)
    }

    // =====================================================================
    // Interrupts
    // =====================================================================

    /// The 7-cycle NMI/IRQ sequence: two dummy reads at PC, push PC and P
    /// with B clear, set I, fetch the vector.
    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) {
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, (self.pc & 0xFF) as u8);
        self.push(bus, self.status.to_stack_byte(false));
        self.status.insert(Status::I);
        let lo = self.read_cycle(bus, vector, Access::READ);
        let hi = self.read_cycle(bus, vector.wrapping_add(1), Access::READ);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // =====================================================================
    // Addressing
    // =====================================================================

    /// Resolve the effective address for a memory-operand instruction,
    /// performing the addressing mode's exact bus cycles.
    fn operand_addr(&mut self, bus: &mut impl Bus, mode: AddrMode, class: OpClass) -> u16 {
        match mode {
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            AddrMode::ZeroPage => u16::from(self.fetch(bus)),
            AddrMode::ZeroPageX => {
                let base = self.fetch(bus);
                // The pre-index address is read while the add happens
                self.read_cycle(bus, u16::from(base), Access::DUMMY_READ);
                u16::from(base.wrapping_add(self.x))
            }
            AddrMode::ZeroPageY => {
                let base = self.fetch(bus);
                self.read_cycle(bus, u16::from(base), Access::DUMMY_READ);
                u16::from(base.wrapping_add(self.y))
            }
            AddrMode::Absolute => {
                let lo = self.fetch(bus);
                let hi = self.fetch(bus);
                u16::from_le_bytes([lo, hi])
            }
            AddrMode::AbsoluteX => {
                let lo = self.fetch(bus);
                let hi = self.fetch(bus);
                let base = u16::from_le_bytes([lo, hi]);
                self.index_with_fixup(bus, base, self.x, class)
            }
            AddrMode::AbsoluteY => {
                let lo = self.fetch(bus);
                let hi = self.fetch(bus);
                let base = u16::from_le_bytes([lo, hi]);
                self.index_with_fixup(bus, base, self.y, class)
            }
            AddrMode::IndirectX => {
                let ptr = self.fetch(bus);
                self.read_cycle(bus, u16::from(ptr), Access::DUMMY_READ);
                let ptr = ptr.wrapping_add(self.x);
                let lo = self.read_cycle(bus, u16::from(ptr), Access::READ);
                let hi = self.read_cycle(bus, u16::from(ptr.wrapping_add(1)), Access::READ);
                u16::from_le_bytes([lo, hi])
            }
            AddrMode::IndirectY => {
                let ptr = self.fetch(bus);
                let lo = self.read_cycle(bus, u16::from(ptr), Access::READ);
                let hi = self.read_cycle(bus, u16::from(ptr.wrapping_add(1)), Access::READ);
                let base = u16::from_le_bytes([lo, hi]);
                self.index_with_fixup(bus, base, self.y, class)
            }
            AddrMode::Implied | AddrMode::Accumulator | AddrMode::Indirect | AddrMode::Relative => {
                unreachable!("mode has no memory operand")
            }
        }
    }

    /// Add an index to a base address. Reads get the fix-up dummy read only
    /// when the page boundary is crossed; writes and RMW always take it.
    fn index_with_fixup(
        &mut self,
        bus: &mut impl Bus,
        base: u16,
        index: u8,
        class: OpClass,
    ) -> u16 {
        let effective = base.wrapping_add(u16::from(index));
        let crossed = (base ^ effective) & 0xFF00 != 0;
        if crossed || class != OpClass::Read {
            // Read of the un-fixed address: old high byte, new low byte
            self.read_cycle(bus, (base & 0xFF00) | (effective & 0x00FF), Access::DUMMY_READ);
        }
        effective
    }

    /// Resolve and read a memory operand.
    fn read_operand(&mut self, bus: &mut impl Bus, mode: AddrMode) -> u8 {
        let addr = self.operand_addr(bus, mode, OpClass::Read);
        self.read_cycle(bus, addr, Access::READ)
    }

    /// Resolve a write target and store `value` there.
    fn write_operand(&mut self, bus: &mut impl Bus, mode: AddrMode, value: u8) {
        let addr = self.operand_addr(bus, mode, OpClass::Write);
        self.write_cycle(bus, addr, value, Access::WRITE);
    }

    /// Read-modify-write: read, dummy write of the original value, write of
    /// the modified value.
    fn rmw(
        &mut self,
        bus: &mut impl Bus,
        mode: AddrMode,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        let addr = self.operand_addr(bus, mode, OpClass::Rmw);
        let value = self.read_cycle(bus, addr, Access::READ);
        self.write_cycle(bus, addr, value, Access::DUMMY_WRITE);
        let result = f(&mut *self, value);
        self.write_cycle(bus, addr, result, Access::WRITE);
    }

    /// Shift/rotate on the accumulator: the operand cycle is a dummy read
    /// of the next instruction byte.
    fn rmw_accumulator(&mut self, bus: &mut impl Bus, f: impl FnOnce(&mut Self, u8) -> u8) {
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        let value = self.a;
        self.a = f(&mut *self, value);
    }

    // =====================================================================
    // Execution
    // =====================================================================

    #[allow(clippy::too_many_lines)] // one arm per mnemonic
    fn execute(
        &mut self,
        bus: &mut impl Bus,
        mnemonic: Mnemonic,
        mode: AddrMode,
    ) -> Result<(), ()> {
        match mnemonic {
            // Loads
            Mnemonic::Lda => {
                let v = self.read_operand(bus, mode);
                self.a = v;
                self.status.set_zn(v);
            }
            Mnemonic::Ldx => {
                let v = self.read_operand(bus, mode);
                self.x = v;
                self.status.set_zn(v);
            }
            Mnemonic::Ldy => {
                let v = self.read_operand(bus, mode);
                self.y = v;
                self.status.set_zn(v);
            }
            Mnemonic::Lax => {
                let v = self.read_operand(bus, mode);
                self.a = v;
                self.x = v;
                self.status.set_zn(v);
            }

            // Stores
            Mnemonic::Sta => self.write_operand(bus, mode, self.a),
            Mnemonic::Stx => self.write_operand(bus, mode, self.x),
            Mnemonic::Sty => self.write_operand(bus, mode, self.y),
            Mnemonic::Sax => self.write_operand(bus, mode, self.a & self.x),

            // Arithmetic and logic
            Mnemonic::Adc => {
                let v = self.read_operand(bus, mode);
                self.adc(v);
            }
            Mnemonic::Sbc => {
                let v = self.read_operand(bus, mode);
                self.adc(!v);
            }
            Mnemonic::And => {
                let v = self.read_operand(bus, mode);
                self.a &= v;
                self.status.set_zn(self.a);
            }
            Mnemonic::Ora => {
                let v = self.read_operand(bus, mode);
                self.a |= v;
                self.status.set_zn(self.a);
            }
            Mnemonic::Eor => {
                let v = self.read_operand(bus, mode);
                self.a ^= v;
                self.status.set_zn(self.a);
            }
            Mnemonic::Cmp => {
                let v = self.read_operand(bus, mode);
                self.compare(self.a, v);
            }
            Mnemonic::Cpx => {
                let v = self.read_operand(bus, mode);
                self.compare(self.x, v);
            }
            Mnemonic::Cpy => {
                let v = self.read_operand(bus, mode);
                self.compare(self.y, v);
            }
            Mnemonic::Bit => {
                let v = self.read_operand(bus, mode);
                self.status.set(Status::Z, self.a & v == 0);
                self.status.set(Status::V, v & 0x40 != 0);
                self.status.set(Status::N, v & 0x80 != 0);
            }

            // Shifts and rotates
            Mnemonic::Asl if mode == AddrMode::Accumulator => {
                self.rmw_accumulator(bus, Self::asl);
            }
            Mnemonic::Asl => self.rmw(bus, mode, Self::asl),
            Mnemonic::Lsr if mode == AddrMode::Accumulator => {
                self.rmw_accumulator(bus, Self::lsr);
            }
            Mnemonic::Lsr => self.rmw(bus, mode, Self::lsr),
            Mnemonic::Rol if mode == AddrMode::Accumulator => {
                self.rmw_accumulator(bus, Self::rol);
            }
            Mnemonic::Rol => self.rmw(bus, mode, Self::rol),
            Mnemonic::Ror if mode == AddrMode::Accumulator => {
                self.rmw_accumulator(bus, Self::ror);
            }
            Mnemonic::Ror => self.rmw(bus, mode, Self::ror),

            // Memory increment/decrement
            Mnemonic::Inc => self.rmw(bus, mode, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Dec => self.rmw(bus, mode, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.status.set_zn(r);
                r
            }),

            // Unofficial RMW + ALU combinations
            Mnemonic::Slo => self.rmw(bus, mode, |cpu, v| {
                let r = cpu.asl(v);
                cpu.a |= r;
                cpu.status.set_zn(cpu.a);
                r
            }),
            Mnemonic::Rla => self.rmw(bus, mode, |cpu, v| {
                let r = cpu.rol(v);
                cpu.a &= r;
                cpu.status.set_zn(cpu.a);
                r
            }),
            Mnemonic::Sre => self.rmw(bus, mode, |cpu, v| {
                let r = cpu.lsr(v);
                cpu.a ^= r;
                cpu.status.set_zn(cpu.a);
                r
            }),
            Mnemonic::Rra => self.rmw(bus, mode, |cpu, v| {
                let r = cpu.ror(v);
                cpu.adc(r);
                r
            }),
            Mnemonic::Dcp => self.rmw(bus, mode, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.compare(cpu.a, r);
                r
            }),
            Mnemonic::Isb => self.rmw(bus, mode, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.adc(!r);
                r
            }),

            // Register transfers and increments (implied, 2 cycles)
            Mnemonic::Tax => self.implied(bus, |cpu| {
                cpu.x = cpu.a;
                cpu.status.set_zn(cpu.x);
            }),
            Mnemonic::Tay => self.implied(bus, |cpu| {
                cpu.y = cpu.a;
                cpu.status.set_zn(cpu.y);
            }),
            Mnemonic::Txa => self.implied(bus, |cpu| {
                cpu.a = cpu.x;
                cpu.status.set_zn(cpu.a);
            }),
            Mnemonic::Tya => self.implied(bus, |cpu| {
                cpu.a = cpu.y;
                cpu.status.set_zn(cpu.a);
            }),
            Mnemonic::Tsx => self.implied(bus, |cpu| {
                cpu.x = cpu.sp;
                cpu.status.set_zn(cpu.x);
            }),
            Mnemonic::Txs => self.implied(bus, |cpu| cpu.sp = cpu.x),
            Mnemonic::Inx => self.implied(bus, |cpu| {
                cpu.x = cpu.x.wrapping_add(1);
                cpu.status.set_zn(cpu.x);
            }),
            Mnemonic::Iny => self.implied(bus, |cpu| {
                cpu.y = cpu.y.wrapping_add(1);
                cpu.status.set_zn(cpu.y);
            }),
            Mnemonic::Dex => self.implied(bus, |cpu| {
                cpu.x = cpu.x.wrapping_sub(1);
                cpu.status.set_zn(cpu.x);
            }),
            Mnemonic::Dey => self.implied(bus, |cpu| {
                cpu.y = cpu.y.wrapping_sub(1);
                cpu.status.set_zn(cpu.y);
            }),

            // Flag operations
            Mnemonic::Clc => self.implied(bus, |cpu| cpu.status.remove(Status::C)),
            Mnemonic::Sec => self.implied(bus, |cpu| cpu.status.insert(Status::C)),
            Mnemonic::Cli => self.implied(bus, |cpu| cpu.status.remove(Status::I)),
            Mnemonic::Sei => self.implied(bus, |cpu| cpu.status.insert(Status::I)),
            Mnemonic::Clv => self.implied(bus, |cpu| cpu.status.remove(Status::V)),
            Mnemonic::Cld => self.implied(bus, |cpu| cpu.status.remove(Status::D)),
            Mnemonic::Sed => self.implied(bus, |cpu| cpu.status.insert(Status::D)),

            // NOPs, official and unofficial. The operand variants still
            // perform their addressing cycles.
            Mnemonic::Nop if mode == AddrMode::Implied => self.implied(bus, |_| {}),
            Mnemonic::Nop => {
                let _ = self.read_operand(bus, mode);
            }

            // Stack
            Mnemonic::Pha => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.push(bus, self.a);
            }
            Mnemonic::Php => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                let value = self.status.to_stack_byte(true);
                self.push(bus, value);
            }
            Mnemonic::Pla => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
                self.a = self.pull(bus);
                self.status.set_zn(self.a);
            }
            Mnemonic::Plp => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
                let value = self.pull(bus);
                self.status = Status::from_stack_byte(value);
            }

            // Jumps and subroutines
            Mnemonic::Jmp if mode == AddrMode::Absolute => {
                let lo = self.fetch(bus);
                let hi = self.read_cycle(bus, self.pc, Access::READ);
                self.pc = u16::from_le_bytes([lo, hi]);
            }
            Mnemonic::Jmp => {
                // Indirect, with the page-wrap bug on the pointer's high byte
                let lo = self.fetch(bus);
                let hi = self.fetch(bus);
                let ptr = u16::from_le_bytes([lo, hi]);
                let target_lo = self.read_cycle(bus, ptr, Access::READ);
                let hi_addr = (ptr & 0xFF00) | u16::from((ptr as u8).wrapping_add(1));
                let target_hi = self.read_cycle(bus, hi_addr, Access::READ);
                self.pc = u16::from_le_bytes([target_lo, target_hi]);
            }
            Mnemonic::Jsr => {
                let lo = self.fetch(bus);
                self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, (self.pc & 0xFF) as u8);
                let hi = self.read_cycle(bus, self.pc, Access::READ);
                self.pc = u16::from_le_bytes([lo, hi]);
            }
            Mnemonic::Rts => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.pc = u16::from_le_bytes([lo, hi]);
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.pc = self.pc.wrapping_add(1);
            }
            Mnemonic::Rti => {
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.read_cycle(bus, 0x0100 | u16::from(self.sp), Access::DUMMY_READ);
                let value = self.pull(bus);
                self.status = Status::from_stack_byte(value);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.pc = u16::from_le_bytes([lo, hi]);
            }
            Mnemonic::Brk => {
                // Padding byte after BRK is fetched and discarded
                self.read_cycle(bus, self.pc, Access::DUMMY_READ);
                self.pc = self.pc.wrapping_add(1);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, (self.pc & 0xFF) as u8);
                let value = self.status.to_stack_byte(true);
                self.push(bus, value);
                self.status.insert(Status::I);
                let lo = self.read_cycle(bus, vectors::IRQ, Access::READ);
                let hi = self.read_cycle(bus, vectors::IRQ + 1, Access::READ);
                self.pc = u16::from_le_bytes([lo, hi]);
            }

            // Branches
            Mnemonic::Bpl => self.branch(bus, !self.status.contains(Status::N)),
            Mnemonic::Bmi => self.branch(bus, self.status.contains(Status::N)),
            Mnemonic::Bvc => self.branch(bus, !self.status.contains(Status::V)),
            Mnemonic::Bvs => self.branch(bus, self.status.contains(Status::V)),
            Mnemonic::Bcc => self.branch(bus, !self.status.contains(Status::C)),
            Mnemonic::Bcs => self.branch(bus, self.status.contains(Status::C)),
            Mnemonic::Bne => self.branch(bus, !self.status.contains(Status::Z)),
            Mnemonic::Beq => self.branch(bus, self.status.contains(Status::Z)),

            Mnemonic::Jam => return Err(()),
        }
        Ok(())
    }

    /// Implied instruction body: the second cycle is a dummy read of the
    /// next instruction byte.
    fn implied(&mut self, bus: &mut impl Bus, f: impl FnOnce(&mut Self)) {
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        f(self);
    }

    /// Branch: 2 cycles not taken, 3 taken, 4 taken across a page. The
    /// extra cycles are dummy reads; the page-cross read happens at the
    /// address formed by the old high byte and the new low byte.
    fn branch(&mut self, bus: &mut impl Bus, taken: bool) {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return;
        }
        self.read_cycle(bus, self.pc, Access::DUMMY_READ);
        let old_pc = self.pc;
        self.pc = old_pc.wrapping_add(offset as u16);
        if (old_pc ^ self.pc) & 0xFF00 != 0 {
            self.read_cycle(bus, (old_pc & 0xFF00) | (self.pc & 0x00FF), Access::DUMMY_READ);
        }
    }

    // =====================================================================
    // ALU helpers
    // =====================================================================

    /// Binary add with carry. The D flag is storable but has no effect on
    /// this CPU variant.
    fn adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;

        self.status.set(Status::C, sum > 0xFF);
        self.status.set(
            Status::V,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );
        self.a = result;
        self.status.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.status.set_zn(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x01 != 0);
        let result = value >> 1;
        self.status.set_zn(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.status.set_zn(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C)) << 7;
        self.status.set(Status::C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.status.set_zn(result);
        result
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
