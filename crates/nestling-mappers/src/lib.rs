//! NES cartridge emulation: ROM parsing, banking, mappers.
//!
//! A [`Mapper`] owns everything on the cartridge side of the bus: PRG ROM,
//! optional battery-backed PRG RAM, CHR ROM or CHR RAM, and the console's
//! nametable RAM (which the cartridge wires up, since mirroring is decided
//! by board traces or mapper registers). CPU and PPU addresses are
//! translated through per-page tables, so bank switching is a table update
//! and every access stays O(1).
//!
//! # Supported mappers
//!
//! | Mapper | Name  | Description |
//! |--------|-------|-------------|
//! | 0      | NROM  | Fixed 16/32 KiB PRG, fixed CHR |
//! | 1      | MMC1  | Serial shift register, PRG/CHR banking + mirroring |
//! | 2      | UxROM | Switched 16 KiB PRG at $8000, last bank fixed |
//!
//! # Example
//!
//! ```no_run
//! use nestling_mappers::{Mapper, Rom};
//!
//! let data = std::fs::read("game.nes").expect("read ROM");
//! let rom = Rom::load(&data).expect("parse ROM");
//! let mapper = Mapper::new(rom).expect("unsupported mapper");
//!
//! let reset_lo = mapper.cpu_read(0xFFFC);
//! let tile = mapper.ppu_read(0x0000);
//! # let _ = (reset_lo, tile);
//! ```

#![warn(missing_docs)]

mod banks;
mod mapper;
mod mmc1;
mod nrom;
mod rom;
mod uxrom;

pub use banks::{Banks, MemoryRegion, Mirroring};
pub use mapper::Mapper;
pub use mmc1::Mmc1;
pub use nrom::Nrom;
pub use rom::{InesHeader, Rom, RomError};
pub use uxrom::Uxrom;

/// Mapper numbers this crate implements.
#[must_use]
pub fn supported_mappers() -> &'static [u8] {
    &[0, 1, 2]
}

/// Whether a mapper number is supported.
#[must_use]
pub fn is_mapper_supported(number: u8) -> bool {
    supported_mappers().contains(&number)
}

/// Board name for a mapper number, if supported.
#[must_use]
pub fn mapper_name(number: u8) -> Option<&'static str> {
    match number {
        0 => Some("NROM"),
        1 => Some("MMC1"),
        2 => Some("UxROM"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_mappers() {
        assert!(is_mapper_supported(0));
        assert!(is_mapper_supported(1));
        assert!(is_mapper_supported(2));
        assert!(!is_mapper_supported(4));
    }

    #[test]
    fn test_mapper_names() {
        assert_eq!(mapper_name(0), Some("NROM"));
        assert_eq!(mapper_name(1), Some("MMC1"));
        assert_eq!(mapper_name(2), Some("UxROM"));
        assert_eq!(mapper_name(66), None);
    }
}
