//! Shared helpers: in-memory iNES image builders.
#![allow(dead_code)] // each test binary uses a subset of the builders

/// Build an iNES image from raw pieces.
///
/// `flags6` carries mirroring/battery bits plus the mapper low nibble; the
/// mapper high nibble goes into byte 7.
pub fn build_image(mapper: u8, flags6: u8, prg: &[u8], chr: &[u8]) -> Vec<u8> {
    assert!(prg.len() % (16 * 1024) == 0 && !prg.is_empty());
    assert!(chr.len() % (8 * 1024) == 0);

    let mut image = vec![0x4E, 0x45, 0x53, 0x1A];
    image.push((prg.len() / (16 * 1024)) as u8);
    image.push((chr.len() / (8 * 1024)) as u8);
    image.push(((mapper & 0x0F) << 4) | flags6);
    image.push(mapper & 0xF0);
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(prg);
    image.extend_from_slice(chr);
    image
}

/// 16 KiB NROM cartridge with `program` at $C000 and the reset vector
/// pointing there. The PRG bank mirrors at $8000.
pub fn nrom_with_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; 16 * 1024];
    prg[..program.len()].copy_from_slice(program);
    // Reset vector -> $C000
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0xC0;
    build_image(0, 0x00, &prg, &vec![0u8; 8 * 1024])
}

/// MMC1 cartridge with eight 16 KiB PRG banks, each filled with its own
/// index, battery-backed RAM, and 16 KiB of CHR.
pub fn mmc1_banked_image() -> Vec<u8> {
    let mut prg = Vec::with_capacity(8 * 16 * 1024);
    for bank in 0u8..8 {
        prg.extend(std::iter::repeat(bank).take(16 * 1024));
    }
    // Keep the reset vector valid in the fixed last bank
    let len = prg.len();
    prg[len - 4] = 0x00;
    prg[len - 3] = 0x80;
    build_image(1, 0x02, &prg, &vec![0u8; 16 * 1024])
}
