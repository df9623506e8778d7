//! Mapper dispatch.
//!
//! Supported mappers form a closed set, so dispatch is a `match` on an enum
//! rather than a trait object: the variants carry their own state and the
//! compiler sees every call target.

use std::io::{Read, Write};

use crate::banks::{Banks, Mirroring};
use crate::mmc1::Mmc1;
use crate::nrom::Nrom;
use crate::rom::{Rom, RomError};
use crate::uxrom::Uxrom;

/// A cartridge with its mapper hardware.
#[derive(Debug, Clone)]
pub enum Mapper {
    /// Mapper 0.
    Nrom(Nrom),
    /// Mapper 1.
    Mmc1(Mmc1),
    /// Mapper 2.
    Uxrom(Uxrom),
}

impl Mapper {
    /// Build the mapper named by the ROM header.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::UnsupportedMapper`] when the header names a
    /// mapper outside the registry.
    pub fn new(rom: Rom) -> Result<Self, RomError> {
        let mapper = match rom.header.mapper {
            0 => Self::Nrom(Nrom::new(rom)),
            1 => Self::Mmc1(Mmc1::new(rom)),
            2 => Self::Uxrom(Uxrom::new(rom)),
            n => return Err(RomError::UnsupportedMapper(n)),
        };
        log::debug!("cartridge uses mapper #{} ({})", mapper.number(), mapper.name());
        Ok(mapper)
    }

    /// iNES mapper number.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Self::Nrom(_) => 0,
            Self::Mmc1(_) => 1,
            Self::Uxrom(_) => 2,
        }
    }

    /// Board name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nrom(_) => "NROM",
            Self::Mmc1(_) => "MMC1",
            Self::Uxrom(_) => "UxROM",
        }
    }

    /// CPU-side read ($4020-$FFFF).
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match self {
            Self::Nrom(m) => m.cpu_read(addr),
            Self::Mmc1(m) => m.cpu_read(addr),
            Self::Uxrom(m) => m.cpu_read(addr),
        }
    }

    /// CPU-side write ($4020-$FFFF).
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match self {
            Self::Nrom(m) => m.cpu_write(addr, value),
            Self::Mmc1(m) => m.cpu_write(addr, value),
            Self::Uxrom(m) => m.cpu_write(addr, value),
        }
    }

    /// PPU-side read (pattern tables and nametables).
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        match self {
            Self::Nrom(m) => m.ppu_read(addr),
            Self::Mmc1(m) => m.ppu_read(addr),
            Self::Uxrom(m) => m.ppu_read(addr),
        }
    }

    /// PPU-side write.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        match self {
            Self::Nrom(m) => m.ppu_write(addr, value),
            Self::Mmc1(m) => m.ppu_write(addr, value),
            Self::Uxrom(m) => m.ppu_write(addr, value),
        }
    }

    /// Current nametable arrangement.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        match self {
            Self::Nrom(m) => m.mirroring(),
            Self::Mmc1(m) => m.mirroring(),
            Self::Uxrom(m) => m.mirroring(),
        }
    }

    /// Mapper-driven IRQ line. None of the supported boards generate one.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        false
    }

    /// Soft reset of the mapper hardware.
    pub fn reset(&mut self) {
        match self {
            Self::Nrom(_) => {}
            Self::Mmc1(m) => m.reset(),
            Self::Uxrom(m) => m.reset(),
        }
    }

    /// Whether the board carries battery-backed PRG RAM.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        match self {
            Self::Nrom(m) => m.has_battery(),
            Self::Mmc1(m) => m.has_battery(),
            Self::Uxrom(m) => m.has_battery(),
        }
    }

    fn banks(&self) -> &Banks {
        match self {
            Self::Nrom(m) => m.banks(),
            Self::Mmc1(m) => m.banks(),
            Self::Uxrom(m) => m.banks(),
        }
    }

    fn banks_mut(&mut self) -> &mut Banks {
        match self {
            Self::Nrom(m) => m.banks_mut(),
            Self::Mmc1(m) => m.banks_mut(),
            Self::Uxrom(m) => m.banks_mut(),
        }
    }

    /// Persist PRG RAM to a save stream.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the stream.
    pub fn save_battery(&self, writer: &mut impl Write) -> std::io::Result<()> {
        self.banks().save_battery(writer)
    }

    /// Restore PRG RAM from a save stream.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the stream.
    pub fn load_battery(&mut self, reader: &mut impl Read) -> std::io::Result<()> {
        self.banks_mut().load_battery(reader)
    }

    /// Check the page-table validity invariant (every mapped page points
    /// inside its backing region).
    #[must_use]
    pub fn pages_are_valid(&self) -> bool {
        self.banks().pages_are_valid()
    }
}
