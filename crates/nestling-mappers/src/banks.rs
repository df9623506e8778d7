//! Cartridge memory storage and page-table address translation.
//!
//! The cartridge sees two address spaces: the CPU's (64 KiB, of which the
//! cartridge answers $4020-$FFFF) and the PPU's (14 address bits, 16 KiB).
//! Both are carved into 256-byte pages, and each page maps to a
//! `(region, offset, writable)` triple. Bank switching rewrites page
//! entries; reads and writes are a single table lookup.

use std::io::{Read, Write};

/// CPU address space page count (64 KiB / 256).
const CPU_PAGE_COUNT: usize = 0x100;
/// PPU address space page count (16 KiB / 256).
const PPU_PAGE_COUNT: usize = 0x40;
/// Bytes per page.
const PAGE_SIZE: usize = 0x100;

/// Nametable arrangement: how the four logical nametables alias onto the
/// physical nametable RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mirroring {
    /// $2000/$2400 share, $2800/$2C00 share.
    #[default]
    Horizontal,
    /// $2000/$2800 share, $2400/$2C00 share.
    Vertical,
    /// All four map to the first physical KiB.
    SingleScreenLower,
    /// All four map to the second physical KiB.
    SingleScreenUpper,
    /// Four distinct nametables (board carries 4 KiB of RAM).
    FourScreen,
}

/// Physical memory region a page resolves to. Each region is one contiguous
/// buffer owned by [`Banks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Nothing mapped; reads return 0, writes are dropped.
    Unmapped,
    /// Cartridge program ROM.
    PrgRom,
    /// Cartridge work/battery RAM.
    PrgRam,
    /// Cartridge character ROM.
    ChrRom,
    /// Cartridge character RAM.
    ChrRam,
    /// Console nametable RAM (wired through the cartridge connector).
    NametableRam,
}

/// One page-table entry.
#[derive(Debug, Clone, Copy)]
struct Page {
    region: MemoryRegion,
    offset: usize,
    writable: bool,
}

impl Page {
    const UNMAPPED: Self = Self {
        region: MemoryRegion::Unmapped,
        offset: 0,
        writable: false,
    };
}

/// Cartridge memory banks and the page tables over them.
#[derive(Debug, Clone)]
pub struct Banks {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_rom: Vec<u8>,
    chr_ram: Vec<u8>,
    nametable_ram: Vec<u8>,

    cpu_pages: [Page; CPU_PAGE_COUNT],
    ppu_pages: [Page; PPU_PAGE_COUNT],
    mirroring: Mirroring,
}

impl Banks {
    /// Size of the PRG RAM bank (8 KiB, the common board configuration).
    pub const PRG_RAM_SIZE: usize = 8 * 1024;
    /// Size of a CHR RAM bank.
    pub const CHR_RAM_SIZE: usize = 8 * 1024;

    /// Build the cartridge storage from a parsed ROM. Boards without CHR
    /// ROM get 8 KiB of CHR RAM; four-screen boards carry 4 KiB of
    /// nametable RAM instead of the usual 2 KiB. Nothing is mapped yet:
    /// the mapper lays out its pages on construction.
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let chr_ram = if chr_rom.is_empty() {
            vec![0; Self::CHR_RAM_SIZE]
        } else {
            Vec::new()
        };
        let nametable_size = if mirroring == Mirroring::FourScreen {
            4 * 1024
        } else {
            2 * 1024
        };
        let mut banks = Self {
            prg_rom,
            prg_ram: vec![0; Self::PRG_RAM_SIZE],
            chr_rom,
            chr_ram,
            nametable_ram: vec![0; nametable_size],
            cpu_pages: [Page::UNMAPPED; CPU_PAGE_COUNT],
            ppu_pages: [Page::UNMAPPED; PPU_PAGE_COUNT],
            mirroring,
        };
        banks.set_mirroring(mirroring);
        banks
    }

    /// Whether the board carries CHR RAM (no CHR ROM shipped).
    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }

    /// Number of 16 KiB PRG ROM banks.
    #[must_use]
    pub fn prg_bank_count(&self) -> usize {
        self.prg_rom.len() / (16 * 1024)
    }

    fn region_buf(&self, region: MemoryRegion) -> &[u8] {
        match region {
            MemoryRegion::Unmapped => &[],
            MemoryRegion::PrgRom => &self.prg_rom,
            MemoryRegion::PrgRam => &self.prg_ram,
            MemoryRegion::ChrRom => &self.chr_rom,
            MemoryRegion::ChrRam => &self.chr_ram,
            MemoryRegion::NametableRam => &self.nametable_ram,
        }
    }

    fn region_buf_mut(&mut self, region: MemoryRegion) -> &mut [u8] {
        match region {
            MemoryRegion::Unmapped => &mut [],
            MemoryRegion::PrgRom => &mut self.prg_rom,
            MemoryRegion::PrgRam => &mut self.prg_ram,
            MemoryRegion::ChrRom => &mut self.chr_rom,
            MemoryRegion::ChrRam => &mut self.chr_ram,
            MemoryRegion::NametableRam => &mut self.nametable_ram,
        }
    }

    fn region_writable(region: MemoryRegion) -> bool {
        matches!(
            region,
            MemoryRegion::PrgRam | MemoryRegion::ChrRam | MemoryRegion::NametableRam
        )
    }

    // =====================================================================
    // Page mapping
    // =====================================================================

    /// Map `page_count` consecutive CPU pages starting at `start_page` to
    /// `region` at byte `offset`. The offset wraps within the region, so
    /// out-of-range bank numbers alias instead of escaping the buffer.
    pub fn map_prg(
        &mut self,
        start_page: u8,
        page_count: usize,
        region: MemoryRegion,
        offset: usize,
    ) {
        let len = self.region_buf(region).len();
        for i in 0..page_count {
            let page = start_page as usize + i;
            if page >= CPU_PAGE_COUNT {
                break;
            }
            self.cpu_pages[page] = Page {
                region,
                offset: if len == 0 { 0 } else { (offset + i * PAGE_SIZE) % len },
                writable: Self::region_writable(region),
            };
        }
    }

    /// Unmap a run of CPU pages.
    pub fn unmap_prg(&mut self, start_page: u8, page_count: usize) {
        for i in 0..page_count {
            let page = start_page as usize + i;
            if page >= CPU_PAGE_COUNT {
                break;
            }
            self.cpu_pages[page] = Page::UNMAPPED;
        }
    }

    /// Map `page_count` consecutive PPU pages starting at `start_page` to
    /// `region` at byte `offset`.
    pub fn map_chr(
        &mut self,
        start_page: u8,
        page_count: usize,
        region: MemoryRegion,
        offset: usize,
    ) {
        let len = self.region_buf(region).len();
        for i in 0..page_count {
            let page = start_page as usize + i;
            if page >= PPU_PAGE_COUNT {
                break;
            }
            self.ppu_pages[page] = Page {
                region,
                offset: if len == 0 { 0 } else { (offset + i * PAGE_SIZE) % len },
                writable: Self::region_writable(region),
            };
        }
    }

    /// Map the CHR pattern area ($0000-$1FFF) to whichever of CHR ROM/RAM
    /// the board carries, at the given byte offset.
    pub fn map_pattern(&mut self, start_page: u8, page_count: usize, offset: usize) {
        let region = if self.has_chr_ram() {
            MemoryRegion::ChrRam
        } else {
            MemoryRegion::ChrRom
        };
        self.map_chr(start_page, page_count, region, offset);
    }

    /// Rewire the nametable pages ($2000-$2FFF, mirrored through $3FFF in
    /// the PPU page table) for an arrangement.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        for logical in 0..4usize {
            let physical = match mirroring {
                Mirroring::Horizontal => [0, 0, 1, 1][logical],
                Mirroring::Vertical => [0, 1, 0, 1][logical],
                Mirroring::SingleScreenLower => 0,
                Mirroring::SingleScreenUpper => 1,
                Mirroring::FourScreen => logical,
            };
            // Each nametable spans four 256-byte pages
            self.map_chr(
                (0x20 + logical * 4) as u8,
                4,
                MemoryRegion::NametableRam,
                physical * 0x400,
            );
        }
        // $3000-$3FFF mirrors the nametable area
        for page in 0x30..PPU_PAGE_COUNT {
            self.ppu_pages[page] = self.ppu_pages[page - 0x10];
        }
    }

    /// Current nametable arrangement.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    // =====================================================================
    // Access
    // =====================================================================

    /// Read through the CPU page table.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        let page = self.cpu_pages[(addr >> 8) as usize];
        let buf = self.region_buf(page.region);
        buf.get(page.offset + (addr & 0xFF) as usize).copied().unwrap_or(0)
    }

    /// Write through the CPU page table; dropped on read-only pages.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        let page = self.cpu_pages[(addr >> 8) as usize];
        if !page.writable {
            return;
        }
        let index = page.offset + (addr & 0xFF) as usize;
        if let Some(byte) = self.region_buf_mut(page.region).get_mut(index) {
            *byte = value;
        }
    }

    /// Read through the PPU page table. Only the low 14 address bits are
    /// decoded.
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        let page = self.ppu_pages[(addr >> 8) as usize];
        let buf = self.region_buf(page.region);
        buf.get(page.offset + (addr & 0xFF) as usize).copied().unwrap_or(0)
    }

    /// Write through the PPU page table; dropped on read-only pages.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        let page = self.ppu_pages[(addr >> 8) as usize];
        if !page.writable {
            return;
        }
        let index = page.offset + (addr & 0xFF) as usize;
        if let Some(byte) = self.region_buf_mut(page.region).get_mut(index) {
            *byte = value;
        }
    }

    // =====================================================================
    // Battery persistence
    // =====================================================================

    /// Write the PRG RAM contents to a save stream.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the stream.
    pub fn save_battery(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_all(&self.prg_ram)
    }

    /// Load PRG RAM contents from a save stream. Short streams fill what
    /// they can and leave the rest untouched.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors other than a short read.
    pub fn load_battery(&mut self, reader: &mut impl Read) -> std::io::Result<()> {
        let mut filled = 0;
        while filled < self.prg_ram.len() {
            let n = reader.read(&mut self.prg_ram[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(())
    }

    /// Verify every mapped page points inside its backing region. Holds
    /// after any remap; exercised by tests.
    #[must_use]
    pub fn pages_are_valid(&self) -> bool {
        let cpu_ok = self.cpu_pages.iter().all(|page| {
            page.region == MemoryRegion::Unmapped
                || page.offset + PAGE_SIZE <= self.region_buf(page.region).len()
        });
        let ppu_ok = self.ppu_pages.iter().all(|page| {
            page.region == MemoryRegion::Unmapped
                || page.offset + PAGE_SIZE <= self.region_buf(page.region).len()
        });
        cpu_ok && ppu_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_banks() -> Banks {
        let prg: Vec<u8> = (0..32 * 1024).map(|i| (i / (16 * 1024)) as u8).collect();
        let chr: Vec<u8> = (0..8 * 1024).map(|i| (i & 0xFF) as u8).collect();
        Banks::new(prg, chr, Mirroring::Horizontal)
    }

    #[test]
    fn test_prg_mapping_and_read() {
        let mut banks = test_banks();
        // Map the second 16 KiB bank at $8000
        banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 16 * 1024);
        assert_eq!(banks.cpu_read(0x8000), 1);
        // Unmapped space reads 0
        assert_eq!(banks.cpu_read(0x5000), 0);
    }

    #[test]
    fn test_rom_pages_reject_writes() {
        let mut banks = test_banks();
        banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 0);
        banks.cpu_write(0x8000, 0xFF);
        assert_eq!(banks.cpu_read(0x8000), 0);
    }

    #[test]
    fn test_prg_ram_round_trip() {
        let mut banks = test_banks();
        banks.map_prg(0x60, 0x20, MemoryRegion::PrgRam, 0);
        banks.cpu_write(0x6123, 0x42);
        assert_eq!(banks.cpu_read(0x6123), 0x42);
    }

    #[test]
    fn test_offset_wraps_within_region() {
        let mut banks = test_banks();
        // Offset past the end of 32 KiB PRG wraps around
        banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 64 * 1024);
        assert_eq!(banks.cpu_read(0x8000), 0);
        assert!(banks.pages_are_valid());
    }

    #[test]
    fn test_chr_ram_when_no_chr_rom() {
        let mut banks = Banks::new(vec![0; 16 * 1024], Vec::new(), Mirroring::Vertical);
        assert!(banks.has_chr_ram());
        banks.map_pattern(0x00, 0x20, 0);
        banks.ppu_write(0x0155, 0x77);
        assert_eq!(banks.ppu_read(0x0155), 0x77);
    }

    #[test]
    fn test_chr_rom_rejects_writes() {
        let mut banks = test_banks();
        banks.map_pattern(0x00, 0x20, 0);
        banks.ppu_write(0x0100, 0xFF);
        assert_eq!(banks.ppu_read(0x0100), 0x00);
    }

    #[test]
    fn test_vertical_mirroring() {
        let mut banks = test_banks();
        banks.set_mirroring(Mirroring::Vertical);
        // $2000 and $2800 share physical nametable 0
        banks.ppu_write(0x2000, 0x5A);
        assert_eq!(banks.ppu_read(0x2800), 0x5A);
        // $2400 and $2C00 share physical nametable 1
        banks.ppu_write(0x2400, 0xA5);
        assert_eq!(banks.ppu_read(0x2C00), 0xA5);
        assert_ne!(banks.ppu_read(0x2000), 0xA5);
    }

    #[test]
    fn test_horizontal_mirroring() {
        let mut banks = test_banks();
        banks.set_mirroring(Mirroring::Horizontal);
        banks.ppu_write(0x2000, 0x11);
        assert_eq!(banks.ppu_read(0x2400), 0x11);
        banks.ppu_write(0x2800, 0x22);
        assert_eq!(banks.ppu_read(0x2C00), 0x22);
        assert_eq!(banks.ppu_read(0x2000), 0x11);
    }

    #[test]
    fn test_single_screen_mirroring() {
        let mut banks = test_banks();
        banks.set_mirroring(Mirroring::SingleScreenUpper);
        banks.ppu_write(0x2000, 0x33);
        assert_eq!(banks.ppu_read(0x2400), 0x33);
        assert_eq!(banks.ppu_read(0x2800), 0x33);
        assert_eq!(banks.ppu_read(0x2C00), 0x33);

        banks.set_mirroring(Mirroring::SingleScreenLower);
        assert_ne!(banks.ppu_read(0x2000), 0x33);
    }

    #[test]
    fn test_nametable_mirror_region() {
        let mut banks = test_banks();
        banks.set_mirroring(Mirroring::Vertical);
        banks.ppu_write(0x2005, 0x99);
        // $3000-$3EFF mirrors $2000-$2EFF
        assert_eq!(banks.ppu_read(0x3005), 0x99);
    }

    #[test]
    fn test_four_screen() {
        let prg = vec![0; 16 * 1024];
        let mut banks = Banks::new(prg, Vec::new(), Mirroring::FourScreen);
        banks.ppu_write(0x2000, 0x01);
        banks.ppu_write(0x2400, 0x02);
        banks.ppu_write(0x2800, 0x03);
        banks.ppu_write(0x2C00, 0x04);
        assert_eq!(banks.ppu_read(0x2000), 0x01);
        assert_eq!(banks.ppu_read(0x2400), 0x02);
        assert_eq!(banks.ppu_read(0x2800), 0x03);
        assert_eq!(banks.ppu_read(0x2C00), 0x04);
    }

    #[test]
    fn test_battery_round_trip() {
        let mut banks = test_banks();
        banks.map_prg(0x60, 0x20, MemoryRegion::PrgRam, 0);
        banks.cpu_write(0x6000, 0xAB);
        banks.cpu_write(0x7FFF, 0xCD);

        let mut save = Vec::new();
        banks.save_battery(&mut save).unwrap();
        assert_eq!(save.len(), Banks::PRG_RAM_SIZE);

        let mut restored = test_banks();
        restored.map_prg(0x60, 0x20, MemoryRegion::PrgRam, 0);
        restored.load_battery(&mut save.as_slice()).unwrap();
        assert_eq!(restored.cpu_read(0x6000), 0xAB);
        assert_eq!(restored.cpu_read(0x7FFF), 0xCD);
    }

    #[test]
    fn test_pages_valid_after_mapping() {
        let mut banks = test_banks();
        banks.map_prg(0x80, 0x40, MemoryRegion::PrgRom, 0);
        banks.map_prg(0xC0, 0x40, MemoryRegion::PrgRom, 16 * 1024);
        banks.map_pattern(0x00, 0x20, 0);
        assert!(banks.pages_are_valid());
    }
}
