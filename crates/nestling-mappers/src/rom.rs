//! iNES ROM file parsing.
//!
//! Only the original 16-byte iNES format is consumed:
//!
//! ```text
//! Byte 0-3:  "NES" followed by MS-DOS EOF (4E 45 53 1A)
//! Byte 4:    PRG-ROM size in 16 KiB units
//! Byte 5:    CHR-ROM size in 8 KiB units (0 = board carries CHR RAM)
//! Byte 6:    bit 0 mirroring (0=horizontal, 1=vertical), bit 1 battery,
//!            bit 2 trainer, bit 3 four-screen, bits 4-7 mapper low nibble
//! Byte 7:    bits 4-7 mapper high nibble
//! ```
//!
//! Archaic dumps were padded by a tool that stamped "DiskDude!" into bytes
//! 7-15; when that signature is present byte 7 is garbage and the high
//! mapper nibble is taken as zero.

use crate::banks::Mirroring;

/// Errors that can occur when parsing an iNES ROM image.
#[derive(Debug, thiserror::Error)]
pub enum RomError {
    /// File is too small for the 16-byte header.
    #[error("ROM file too small: expected at least 16 bytes, got {0}")]
    FileTooSmall(usize),

    /// Header magic is not "NES\x1A".
    #[error("invalid iNES magic: expected [4E 45 53 1A], got {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Header declares zero PRG units; there is nothing to execute.
    #[error("ROM has no PRG ROM")]
    MissingPrgRom,

    /// File is shorter than the header-declared PRG/CHR payload.
    #[error("ROM file truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected minimum file size in bytes.
        expected: usize,
        /// Actual file size in bytes.
        actual: usize,
    },

    /// The mapper number is not in the registry.
    #[error("mapper #{0} is not supported")]
    UnsupportedMapper(u8),
}

/// Parsed iNES header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InesHeader {
    /// PRG ROM size in bytes (multiple of 16 KiB, never zero).
    pub prg_rom_size: usize,
    /// CHR ROM size in bytes (multiple of 8 KiB; zero means CHR RAM).
    pub chr_rom_size: usize,
    /// iNES mapper number.
    pub mapper: u8,
    /// Nametable arrangement soldered on the board.
    pub mirroring: Mirroring,
    /// Battery-backed PRG RAM present.
    pub has_battery: bool,
    /// 512-byte trainer block precedes PRG data.
    pub has_trainer: bool,
}

impl InesHeader {
    /// "NES" followed by MS-DOS EOF.
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parse a header from the first 16 bytes of a ROM image.
    ///
    /// # Errors
    ///
    /// Fails when the data is shorter than 16 bytes, the magic is wrong,
    /// or no PRG ROM is declared.
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 {
            return Err(RomError::FileTooSmall(data.len()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(RomError::InvalidMagic(magic));
        }

        let prg_units = data[4] as usize;
        if prg_units == 0 {
            return Err(RomError::MissingPrgRom);
        }
        let chr_units = data[5] as usize;

        let mut mapper = (data[6] & 0xF0) >> 4;
        // "DiskDude!" in bytes 7-15 marks an archaic dump whose byte 7 is
        // junk; only the low nibble is trusted then.
        if &data[7..16] != b"DiskDude!" {
            mapper |= data[7] & 0xF0;
        }

        let mirroring = if data[6] & 0x08 != 0 {
            Mirroring::FourScreen
        } else if data[6] & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Self {
            prg_rom_size: prg_units * 16 * 1024,
            chr_rom_size: chr_units * 8 * 1024,
            mapper,
            mirroring,
            has_battery: data[6] & 0x02 != 0,
            has_trainer: data[6] & 0x04 != 0,
        })
    }
}

/// Parsed ROM image: header plus the PRG and CHR payloads.
#[derive(Debug, Clone)]
pub struct Rom {
    /// Header information.
    pub header: InesHeader,
    /// PRG ROM data.
    pub prg_rom: Vec<u8>,
    /// CHR ROM data; empty when the board carries CHR RAM.
    pub chr_rom: Vec<u8>,
}

impl Rom {
    /// Load a ROM from a complete iNES file image.
    ///
    /// The optional 512-byte trainer block is skipped; nothing past the CHR
    /// payload is consumed.
    ///
    /// # Errors
    ///
    /// Fails when the header is invalid or the file is shorter than the
    /// declared payload.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header = InesHeader::parse(data)?;

        let mut offset = 16;
        if header.has_trainer {
            offset += 512;
        }

        let expected = offset + header.prg_rom_size + header.chr_rom_size;
        if data.len() < expected {
            return Err(RomError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let prg_rom = data[offset..offset + header.prg_rom_size].to_vec();
        offset += header.prg_rom_size;
        let chr_rom = data[offset..offset + header.chr_rom_size].to_vec();

        Ok(Self {
            header,
            prg_rom,
            chr_rom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_image(prg_units: u8, chr_units: u8, mapper: u8, flags6: u8) -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A];
        image.push(prg_units);
        image.push(chr_units);
        image.push(((mapper & 0x0F) << 4) | flags6);
        image.push(mapper & 0xF0);
        image.extend_from_slice(&[0; 8]);
        image.extend(std::iter::repeat(0xAA).take(prg_units as usize * 16 * 1024));
        image.extend(std::iter::repeat(0x55).take(chr_units as usize * 8 * 1024));
        image
    }

    #[test]
    fn test_valid_header() {
        let image = build_image(2, 1, 0, 0x00);
        let header = InesHeader::parse(&image).unwrap();
        assert_eq!(header.prg_rom_size, 32 * 1024);
        assert_eq!(header.chr_rom_size, 8 * 1024);
        assert_eq!(header.mapper, 0);
        assert_eq!(header.mirroring, Mirroring::Horizontal);
        assert!(!header.has_battery);
        assert!(!header.has_trainer);
    }

    #[test]
    fn test_invalid_magic() {
        let mut image = build_image(1, 1, 0, 0);
        image[0] = 0x00;
        assert!(matches!(
            InesHeader::parse(&image),
            Err(RomError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            InesHeader::parse(&[0x4E, 0x45, 0x53]),
            Err(RomError::FileTooSmall(3))
        ));
    }

    #[test]
    fn test_zero_prg_rejected() {
        let image = build_image(0, 1, 0, 0);
        assert!(matches!(
            InesHeader::parse(&image),
            Err(RomError::MissingPrgRom)
        ));
    }

    #[test]
    fn test_mapper_nibbles() {
        let image = build_image(1, 1, 0x42, 0x00);
        let header = InesHeader::parse(&image).unwrap();
        assert_eq!(header.mapper, 0x42);
    }

    #[test]
    fn test_diskdude_zeroes_high_nibble() {
        let mut image = build_image(1, 1, 0x01, 0x00);
        image[7..16].copy_from_slice(b"DiskDude!");
        let header = InesHeader::parse(&image).unwrap();
        // Byte 7 would have contributed 0x40; only the low nibble survives
        assert_eq!(header.mapper, 0x01);
    }

    #[test]
    fn test_mirroring_flags() {
        let header = InesHeader::parse(&build_image(1, 1, 0, 0x00)).unwrap();
        assert_eq!(header.mirroring, Mirroring::Horizontal);

        let header = InesHeader::parse(&build_image(1, 1, 0, 0x01)).unwrap();
        assert_eq!(header.mirroring, Mirroring::Vertical);

        let header = InesHeader::parse(&build_image(1, 1, 0, 0x08)).unwrap();
        assert_eq!(header.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn test_battery_and_trainer_flags() {
        let header = InesHeader::parse(&build_image(1, 1, 0, 0x02)).unwrap();
        assert!(header.has_battery);

        let mut image = build_image(1, 0, 0, 0x04);
        // Insert the trainer block between header and PRG data
        image.splice(16..16, std::iter::repeat(0xFF).take(512));
        let rom = Rom::load(&image).unwrap();
        assert!(rom.header.has_trainer);
        assert_eq!(rom.prg_rom[0], 0xAA);
    }

    #[test]
    fn test_rom_payload_slicing() {
        let image = build_image(1, 1, 0, 0x00);
        let rom = Rom::load(&image).unwrap();
        assert_eq!(rom.prg_rom.len(), 16 * 1024);
        assert_eq!(rom.chr_rom.len(), 8 * 1024);
        assert_eq!(rom.prg_rom[0], 0xAA);
        assert_eq!(rom.chr_rom[0], 0x55);
    }

    #[test]
    fn test_truncated_rom() {
        let mut image = build_image(2, 1, 0, 0x00);
        image.truncate(16 + 1024);
        assert!(matches!(Rom::load(&image), Err(RomError::Truncated { .. })));
    }

    #[test]
    fn test_chr_ram_board() {
        let image = build_image(1, 0, 0, 0x00);
        let rom = Rom::load(&image).unwrap();
        assert_eq!(rom.header.chr_rom_size, 0);
        assert!(rom.chr_rom.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn parse_never_panics(data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..64)) {
            let _ = InesHeader::parse(&data);
            let _ = Rom::load(&data);
        }

        #[test]
        fn parsed_sizes_match_declared_units(prg in 1u8..=8, chr in 0u8..=4) {
            let image = build_image(prg, chr, 0, 0x00);
            let rom = Rom::load(&image).unwrap();
            proptest::prop_assert_eq!(rom.prg_rom.len(), prg as usize * 16 * 1024);
            proptest::prop_assert_eq!(rom.chr_rom.len(), chr as usize * 8 * 1024);
        }
    }
}
