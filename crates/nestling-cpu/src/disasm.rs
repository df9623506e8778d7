//! One-instruction disassembler.
//!
//! Reads instruction bytes through [`Bus::peek`], so disassembling never
//! perturbs hardware registers. Output format:
//!
//! ```text
//! $C000  A9 42     LDA #$42
//! ```

use crate::bus::Bus;
use crate::opcodes::{AddrMode, OPCODE_TABLE};

/// Disassemble the instruction at `addr`.
///
/// Returns the rendered text and the instruction length in bytes. The text
/// is a pure function of the instruction bytes: disassembling the same
/// bytes always yields the same string.
#[must_use]
pub fn disassemble_at(bus: &impl Bus, addr: u16) -> (String, u16) {
    let opcode = bus.peek(addr);
    let info = OPCODE_TABLE[opcode as usize];
    let length = info.mode.length();

    let lo = bus.peek(addr.wrapping_add(1));
    let hi = bus.peek(addr.wrapping_add(2));
    let operand16 = u16::from_le_bytes([lo, hi]);

    let bytes = match length {
        1 => format!("{opcode:02X}"),
        2 => format!("{opcode:02X} {lo:02X}"),
        _ => format!("{opcode:02X} {lo:02X} {hi:02X}"),
    };

    let operand = match info.mode {
        AddrMode::Implied => String::new(),
        AddrMode::Accumulator => "A".to_string(),
        AddrMode::Immediate => format!("#${lo:02X}"),
        AddrMode::ZeroPage => format!("${lo:02X}"),
        AddrMode::ZeroPageX => format!("${lo:02X},X"),
        AddrMode::ZeroPageY => format!("${lo:02X},Y"),
        AddrMode::Absolute => format!("${operand16:04X}"),
        AddrMode::AbsoluteX => format!("${operand16:04X},X"),
        AddrMode::AbsoluteY => format!("${operand16:04X},Y"),
        AddrMode::Indirect => format!("(${operand16:04X})"),
        AddrMode::IndirectX => format!("(${lo:02X},X)"),
        AddrMode::IndirectY => format!("(${lo:02X}),Y"),
        AddrMode::Relative => {
            // Branch target from the address of the following instruction
            let target = addr.wrapping_add(2).wrapping_add((lo as i8) as u16);
            format!("${target:04X}")
        }
    };

    let name = info.mnemonic.name();
    let text = if operand.is_empty() {
        format!("${addr:04X}  {bytes:<9} {name}")
    } else {
        format!("${addr:04X}  {bytes:<9} {name} {operand}")
    };

    (text, length)
}
