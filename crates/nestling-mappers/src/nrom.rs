//! NROM (mapper 0).
//!
//! No banking hardware at all: 16 KiB of PRG ROM mirrored across
//! $8000-$FFFF, or 32 KiB mapped linearly; 8 KiB of CHR; nametable
//! arrangement fixed by the board.

use crate::banks::{Banks, MemoryRegion, Mirroring};
use crate::rom::Rom;

/// NROM cartridge.
#[derive(Debug, Clone)]
pub struct Nrom {
    banks: Banks,
    has_battery: bool,
}

impl Nrom {
    /// Build an NROM cartridge from a parsed ROM.
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let has_battery = rom.header.has_battery;
        let prg_len = rom.prg_rom.len();
        let mut banks = Banks::new(rom.prg_rom, rom.chr_rom, rom.header.mirroring);

        banks.map_prg(0x60, 0x20, MemoryRegion::PrgRam, 0);
        if prg_len <= 16 * 1024 {
            // 16 KiB boards see the same bank at $8000 and $C000
            banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 0);
            banks.map_prg(0xC0, 0x40, MemoryRegion::PrgRom, 0);
        } else {
            banks.map_prg(0x80, 0x80, MemoryRegion::PrgRom, 0);
        }
        banks.map_pattern(0x00, 0x20, 0);

        Self { banks, has_battery }
    }

    /// CPU-side read.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        self.banks.cpu_read(addr)
    }

    /// CPU-side write. NROM has no registers; ROM pages drop the write.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        self.banks.cpu_write(addr, value);
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

    fn make_rom(prg_units: usize, chr_units: usize) -> Rom {
        let prg_rom: Vec<u8> = (0..prg_units * 16 * 1024)
            .map(|i| (i / (16 * 1024)) as u8)
            .collect();
        let chr_rom: Vec<u8> = (0..chr_units * 8 * 1024).map(|i| (i & 0xFF) as u8).collect();
        Rom {
            header: InesHeader {
                prg_rom_size: prg_units * 16 * 1024,
                chr_rom_size: chr_units * 8 * 1024,
                mapper: 0,
                mirroring: Mirroring::Vertical,
                has_battery: false,
                has_trainer: false,
            },
            prg_rom,
            chr_rom,
        }
    }

    #[test]
    fn test_16k_mirrors_at_c000() {
        let mut rom = make_rom(1, 1);
        rom.prg_rom[0x0123] = 0x42;
        let nrom = Nrom::new(rom);
        assert_eq!(nrom.cpu_read(0x8123), 0x42);
        assert_eq!(nrom.cpu_read(0xC123), 0x42);
    }

    #[test]
    fn test_32k_is_linear() {
        let nrom = Nrom::new(make_rom(2, 1));
        assert_eq!(nrom.cpu_read(0x8000), 0);
        assert_eq!(nrom.cpu_read(0xC000), 1);
    }

    #[test]
    fn test_rom_writes_dropped() {
        let mut nrom = Nrom::new(make_rom(2, 1));
        nrom.cpu_write(0x8000, 0xFF);
        assert_eq!(nrom.cpu_read(0x8000), 0);
    }

    #[test]
    fn test_prg_ram() {
        let mut nrom = Nrom::new(make_rom(1, 1));
        nrom.cpu_write(0x6000, 0x99);
        assert_eq!(nrom.cpu_read(0x6000), 0x99);
    }

    #[test]
    fn test_chr_access() {
        let nrom = Nrom::new(make_rom(1, 1));
        assert_eq!(nrom.ppu_read(0x0042), 0x42);
    }

    #[test]
    fn test_chr_ram_board_is_writable() {
        let mut nrom = Nrom::new(make_rom(1, 0));
        nrom.ppu_write(0x0100, 0x7E);
        assert_eq!(nrom.ppu_read(0x0100), 0x7E);
    }

    #[test]
    fn test_header_mirroring_applies() {
        let nrom = Nrom::new(make_rom(1, 1));
        assert_eq!(nrom.mirroring(), Mirroring::Vertical);
    }
}
