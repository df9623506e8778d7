//! UxROM (mapper 2).
//!
//! A single write-only latch: any write to $8000-$FFFF selects the 16 KiB
//! PRG bank visible at $8000-$BFFF. $C000-$FFFF is hard-wired to the last
//! bank. Boards in this family carry CHR RAM.

use crate::banks::{Banks, MemoryRegion, Mirroring};
use crate::rom::Rom;

/// UxROM cartridge.
#[derive(Debug, Clone)]
pub struct Uxrom {
    banks: Banks,
    has_battery: bool,
    bank: u8,
}

impl Uxrom {
    /// Build a UxROM cartridge from a parsed ROM.
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let has_battery = rom.header.has_battery;
        let mut banks = Banks::new(rom.prg_rom, rom.chr_rom, rom.header.mirroring);

        banks.map_prg(0x60, 0x20, MemoryRegion::PrgRam, 0);
        banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 0);
        let last_bank = banks.prg_bank_count().saturating_sub(1);
        banks.map_prg(0xC0, 0x40, MemoryRegion::PrgRom, last_bank * 16 * 1024);
        banks.map_pattern(0x00, 0x20, 0);

        Self {
            banks,
            has_battery,
            bank: 0,
        }
    }

    /// CPU-side read.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        self.banks.cpu_read(addr)
    }

    /// CPU-side write: $8000-$FFFF latches the switched bank.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.bank = value & 0x0F;
            self.banks
                .map_prg(0x80, 0x40, MemoryRegion::PrgRom, self.bank as usize * 16 * 1024);
        } else {
            self.banks.cpu_write(addr, value);
        }
    }

    /// PPU-side read.
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        self.banks.ppu_read(addr)
    }

    /// PPU-side write.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        self.banks.ppu_write(addr, value);
    }

    /// Current nametable arrangement.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.banks.mirroring()
    }

    /// Whether the board carries battery-backed PRG RAM.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// Soft reset: back to bank 0.
    pub fn reset(&mut self) {
        self.bank = 0;
        self.banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 0);
    }

    pub(crate) fn banks(&self) -> &Banks {
        &self.banks
    }

    pub(crate) fn banks_mut(&mut self) -> &mut Banks {
        &mut self.banks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::InesHeader;

    fn make_rom(prg_units: usize) -> Rom {
        let prg_rom: Vec<u8> = (0..prg_units * 16 * 1024)
            .map(|i| (i / (16 * 1024)) as u8)
            .collect();
        Rom {
            header: InesHeader {
                prg_rom_size: prg_units * 16 * 1024,
                chr_rom_size: 0,
                mapper: 2,
                mirroring: Mirroring::Vertical,
                has_battery: false,
                has_trainer: false,
            },
            prg_rom,
            chr_rom: Vec::new(),
        }
    }

    #[test]
    fn test_power_on_layout() {
        let mapper = Uxrom::new(make_rom(8));
        assert_eq!(mapper.cpu_read(0x8000), 0);
        assert_eq!(mapper.cpu_read(0xC000), 7);
    }

    #[test]
    fn test_bank_switch() {
        let mut mapper = Uxrom::new(make_rom(8));
        mapper.cpu_write(0x8000, 0x03);
        assert_eq!(mapper.cpu_read(0x8000), 3);
        // Last bank never moves
        assert_eq!(mapper.cpu_read(0xC000), 7);

        mapper.cpu_write(0xFFFF, 0x05);
        assert_eq!(mapper.cpu_read(0x8000), 5);
    }

    #[test]
    fn test_chr_ram() {
        let mut mapper = Uxrom::new(make_rom(4));
        mapper.ppu_write(0x0000, 0x42);
        assert_eq!(mapper.ppu_read(0x0000), 0x42);
    }

    #[test]
    fn test_reset_returns_to_bank_zero() {
        let mut mapper = Uxrom::new(make_rom(8));
        mapper.cpu_write(0x8000, 0x06);
        mapper.reset();
        assert_eq!(mapper.cpu_read(0x8000), 0);
    }
}
