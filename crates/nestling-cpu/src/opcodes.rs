//! Opcode dispatch table.
//!
//! The 256-entry table maps every opcode byte to its mnemonic and addressing
//! mode. Cycle counts are not stored here: timing falls out of executing
//! each instruction as its exact sequence of bus cycles.

/// Addressing modes of the 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operand.
    Implied,
    /// Operates on the accumulator.
    Accumulator,
    /// Operand is the byte after the opcode.
    Immediate,
    /// One-byte address into page zero.
    ZeroPage,
    /// Zero-page address indexed by X (wraps within page zero).
    ZeroPageX,
    /// Zero-page address indexed by Y (wraps within page zero).
    ZeroPageY,
    /// Two-byte absolute address.
    Absolute,
    /// Absolute address indexed by X.
    AbsoluteX,
    /// Absolute address indexed by Y.
    AbsoluteY,
    /// Indirect jump target (JMP only, with the page-wrap bug).
    Indirect,
    /// (zp,X): pointer in page zero indexed by X before dereferencing.
    IndirectX,
    /// (zp),Y: pointer in page zero, Y added after dereferencing.
    IndirectY,
    /// Signed one-byte branch displacement.
    Relative,
}

impl AddrMode {
    /// Total instruction length in bytes (opcode included).
    #[must_use]
    pub const fn length(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 1,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative => 2,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 3,
        }
    }
}

/// Instruction mnemonics, official and the implemented unofficial ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // the variants are the 6502 mnemonics themselves
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Stable unofficial opcodes
    Lax, Sax, Dcp, Isb, Slo, Rla, Sre, Rra,
    /// Unimplemented or jamming opcode; fetching one is a fatal error.
    Jam,
}

impl Mnemonic {
    /// Three-letter assembler name. Unofficial opcodes get the conventional
    /// names used by most disassemblers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC", Self::And => "AND", Self::Asl => "ASL",
            Self::Bcc => "BCC", Self::Bcs => "BCS", Self::Beq => "BEQ",
            Self::Bit => "BIT", Self::Bmi => "BMI", Self::Bne => "BNE",
            Self::Bpl => "BPL", Self::Brk => "BRK", Self::Bvc => "BVC",
            Self::Bvs => "BVS", Self::Clc => "CLC", Self::Cld => "CLD",
            Self::Cli => "CLI", Self::Clv => "CLV", Self::Cmp => "CMP",
            Self::Cpx => "CPX", Self::Cpy => "CPY", Self::Dec => "DEC",
            Self::Dex => "DEX", Self::Dey => "DEY", Self::Eor => "EOR",
            Self::Inc => "INC", Self::Inx => "INX", Self::Iny => "INY",
            Self::Jmp => "JMP", Self::Jsr => "JSR", Self::Lda => "LDA",
            Self::Ldx => "LDX", Self::Ldy => "LDY", Self::Lsr => "LSR",
            Self::Nop => "NOP", Self::Ora => "ORA", Self::Pha => "PHA",
            Self::Php => "PHP", Self::Pla => "PLA", Self::Plp => "PLP",
            Self::Rol => "ROL", Self::Ror => "ROR", Self::Rti => "RTI",
            Self::Rts => "RTS", Self::Sbc => "SBC", Self::Sec => "SEC",
            Self::Sed => "SED", Self::Sei => "SEI", Self::Sta => "STA",
            Self::Stx => "STX", Self::Sty => "STY", Self::Tax => "TAX",
            Self::Tay => "TAY", Self::Tsx => "TSX", Self::Txa => "TXA",
            Self::Txs => "TXS", Self::Tya => "TYA", Self::Lax => "LAX",
            Self::Sax => "SAX", Self::Dcp => "DCP", Self::Isb => "ISB",
            Self::Slo => "SLO", Self::Rla => "RLA", Self::Sre => "SRE",
            Self::Rra => "RRA", Self::Jam => "???",
        }
    }
}

/// One opcode table entry.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,
    /// Addressing mode.
    pub mode: AddrMode,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode) -> Opcode {
    Opcode { mnemonic, mode }
}

use AddrMode::{
    Absolute as Abs, AbsoluteX as Abx, AbsoluteY as Aby, Accumulator as Acc,
    Immediate as Imm, Implied as Imp, Indirect as Ind, IndirectX as Izx,
    IndirectY as Izy, Relative as Rel, ZeroPage as Zp, ZeroPageX as Zpx,
    ZeroPageY as Zpy,
};
use Mnemonic::*;

/// Full 256-entry opcode table indexed by opcode byte.
#[rustfmt::skip]
pub static OPCODE_TABLE: [Opcode; 256] = [
    // 0x00
    op(Brk, Imp), op(Ora, Izx), op(Jam, Imp), op(Slo, Izx),
    op(Nop, Zp),  op(Ora, Zp),  op(Asl, Zp),  op(Slo, Zp),
    op(Php, Imp), op(Ora, Imm), op(Asl, Acc), op(Jam, Imp),
    op(Nop, Abs), op(Ora, Abs), op(Asl, Abs), op(Slo, Abs),
    // 0x10
    op(Bpl, Rel), op(Ora, Izy), op(Jam, Imp), op(Slo, Izy),
    op(Nop, Zpx), op(Ora, Zpx), op(Asl, Zpx), op(Slo, Zpx),
    op(Clc, Imp), op(Ora, Aby), op(Nop, Imp), op(Slo, Aby),
    op(Nop, Abx), op(Ora, Abx), op(Asl, Abx), op(Slo, Abx),
    // 0x20
    op(Jsr, Abs), op(And, Izx), op(Jam, Imp), op(Rla, Izx),
    op(Bit, Zp),  op(And, Zp),  op(Rol, Zp),  op(Rla, Zp),
    op(Plp, Imp), op(And, Imm), op(Rol, Acc), op(Jam, Imp),
    op(Bit, Abs), op(And, Abs), op(Rol, Abs), op(Rla, Abs),
    // 0x30
    op(Bmi, Rel), op(And, Izy), op(Jam, Imp), op(Rla, Izy),
    op(Nop, Zpx), op(And, Zpx), op(Rol, Zpx), op(Rla, Zpx),
    op(Sec, Imp), op(And, Aby), op(Nop, Imp), op(Rla, Aby),
    op(Nop, Abx), op(And, Abx), op(Rol, Abx), op(Rla, Abx),
    // 0x40
    op(Rti, Imp), op(Eor, Izx), op(Jam, Imp), op(Sre, Izx),
    op(Nop, Zp),  op(Eor, Zp),  op(Lsr, Zp),  op(Sre, Zp),
    op(Pha, Imp), op(Eor, Imm), op(Lsr, Acc), op(Jam, Imp),
    op(Jmp, Abs), op(Eor, Abs), op(Lsr, Abs), op(Sre, Abs),
    // 0x50
    op(Bvc, Rel), op(Eor, Izy), op(Jam, Imp), op(Sre, Izy),
    op(Nop, Zpx), op(Eor, Zpx), op(Lsr, Zpx), op(Sre, Zpx),
    op(Cli, Imp), op(Eor, Aby), op(Nop, Imp), op(Sre, Aby),
    op(Nop, Abx), op(Eor, Abx), op(Lsr, Abx), op(Sre, Abx),
    // 0x60
    op(Rts, Imp), op(Adc, Izx), op(Jam, Imp), op(Rra, Izx),
    op(Nop, Zp),  op(Adc, Zp),  op(Ror, Zp),  op(Rra, Zp),
    op(Pla, Imp), op(Adc, Imm), op(Ror, Acc), op(Jam, Imp),
    op(Jmp, Ind), op(Adc, Abs), op(Ror, Abs), op(Rra, Abs),
    // 0x70
    op(Bvs, Rel), op(Adc, Izy), op(Jam, Imp), op(Rra, Izy),
    op(Nop, Zpx), op(Adc, Zpx), op(Ror, Zpx), op(Rra, Zpx),
    op(Sei, Imp), op(Adc, Aby), op(Nop, Imp), op(Rra, Aby),
    op(Nop, Abx), op(Adc, Abx), op(Ror, Abx), op(Rra, Abx),
    // 0x80
    op(Nop, Imm), op(Sta, Izx), op(Nop, Imm), op(Sax, Izx),
    op(Sty, Zp),  op(Sta, Zp),  op(Stx, Zp),  op(Sax, Zp),
    op(Dey, Imp), op(Nop, Imm), op(Txa, Imp), op(Jam, Imp),
    op(Sty, Abs), op(Sta, Abs), op(Stx, Abs), op(Sax, Abs),
    // 0x90
    op(Bcc, Rel), op(Sta, Izy), op(Jam, Imp), op(Jam, Imp),
    op(Sty, Zpx), op(Sta, Zpx), op(Stx, Zpy), op(Sax, Zpy),
    op(Tya, Imp), op(Sta, Aby), op(Txs, Imp), op(Jam, Imp),
    op(Jam, Imp), op(Sta, Abx), op(Jam, Imp), op(Jam, Imp),
    // 0xA0
    op(Ldy, Imm), op(Lda, Izx), op(Ldx, Imm), op(Lax, Izx),
    op(Ldy, Zp),  op(Lda, Zp),  op(Ldx, Zp),  op(Lax, Zp),
    op(Tay, Imp), op(Lda, Imm), op(Tax, Imp), op(Jam, Imp),
    op(Ldy, Abs), op(Lda, Abs), op(Ldx, Abs), op(Lax, Abs),
    // 0xB0
    op(Bcs, Rel), op(Lda, Izy), op(Jam, Imp), op(Lax, Izy),
    op(Ldy, Zpx), op(Lda, Zpx), op(Ldx, Zpy), op(Lax, Zpy),
    op(Clv, Imp), op(Lda, Aby), op(Tsx, Imp), op(Jam, Imp),
    op(Ldy, Abx), op(Lda, Abx), op(Ldx, Aby), op(Lax, Aby),
    // 0xC0
    op(Cpy, Imm), op(Cmp, Izx), op(Nop, Imm), op(Dcp, Izx),
    op(Cpy, Zp),  op(Cmp, Zp),  op(Dec, Zp),  op(Dcp, Zp),
    op(Iny, Imp), op(Cmp, Imm), op(Dex, Imp), op(Jam, Imp),
    op(Cpy, Abs), op(Cmp, Abs), op(Dec, Abs), op(Dcp, Abs),
    // 0xD0
    op(Bne, Rel), op(Cmp, Izy), op(Jam, Imp), op(Dcp, Izy),
    op(Nop, Zpx), op(Cmp, Zpx), op(Dec, Zpx), op(Dcp, Zpx),
    op(Cld, Imp), op(Cmp, Aby), op(Nop, Imp), op(Dcp, Aby),
    op(Nop, Abx), op(Cmp, Abx), op(Dec, Abx), op(Dcp, Abx),
    // 0xE0
    op(Cpx, Imm), op(Sbc, Izx), op(Nop, Imm), op(Isb, Izx),
    op(Cpx, Zp),  op(Sbc, Zp),  op(Inc, Zp),  op(Isb, Zp),
    op(Inx, Imp), op(Sbc, Imm), op(Nop, Imp), op(Sbc, Imm),
    op(Cpx, Abs), op(Sbc, Abs), op(Inc, Abs), op(Isb, Abs),
    // 0xF0
    op(Beq, Rel), op(Sbc, Izy), op(Jam, Imp), op(Isb, Izy),
    op(Nop, Zpx), op(Sbc, Zpx), op(Inc, Zpx), op(Isb, Zpx),
    op(Sed, Imp), op(Sbc, Aby), op(Nop, Imp), op(Isb, Aby),
    op(Nop, Abx), op(Sbc, Abx), op(Inc, Abx), op(Isb, Abx),
];
