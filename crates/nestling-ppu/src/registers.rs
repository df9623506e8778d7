//! PPU control, mask and status registers.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000), write-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        /// Nametable select, horizontal bit.
        const NAMETABLE_X = 1 << 0;
        /// Nametable select, vertical bit.
        const NAMETABLE_Y = 1 << 1;
        /// VRAM address increment: 0 adds 1 (across), 1 adds 32 (down).
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table for 8x8 sprites ($0000/$1000).
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table ($0000/$1000).
        const BACKGROUND_TABLE = 1 << 4;
        /// Sprite size: 0 = 8x8, 1 = 8x16.
        const SPRITE_SIZE = 1 << 5;
        /// PPU master/slave select (unused on a stock console).
        const MASTER_SLAVE = 1 << 6;
        /// Generate NMI at the start of vertical blank.
        const NMI_ENABLE = 1 << 7;
    }
}

impl PpuCtrl {
    /// VRAM address increment applied after PPUDATA access.
    #[must_use]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    /// Base address of the background pattern table.
    #[must_use]
    pub fn background_table_addr(self) -> u16 {
        if self.contains(Self::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Base address of the sprite pattern table (8x8 mode only; 8x16
    /// sprites select their table per tile).
    #[must_use]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in scanlines.
    #[must_use]
    pub fn sprite_height(self) -> u16 {
        if self.contains(Self::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }
}

bitflags! {
    /// PPUMASK ($2001), write-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuMask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels.
        const SHOW_BACKGROUND_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels.
        const SHOW_SPRITES_LEFT = 1 << 2;
        /// Render the background.
        const SHOW_BACKGROUND = 1 << 3;
        /// Render sprites.
        const SHOW_SPRITES = 1 << 4;
        /// Emphasize red.
        const EMPHASIZE_RED = 1 << 5;
        /// Emphasize green.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl PpuMask {
    /// Whether rendering is enabled at all (background or sprites).
    #[must_use]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND.union(Self::SHOW_SPRITES))
    }
}

bitflags! {
    /// PPUSTATUS ($2002), read-only. Only the upper three bits are driven.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        /// More than eight sprites landed on a scanline.
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Currently in vertical blank.
        const VBLANK = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vram_increment() {
        assert_eq!(PpuCtrl::empty().vram_increment(), 1);
        assert_eq!(PpuCtrl::VRAM_INCREMENT.vram_increment(), 32);
    }

    #[test]
    fn test_table_addresses() {
        assert_eq!(PpuCtrl::empty().background_table_addr(), 0x0000);
        assert_eq!(PpuCtrl::BACKGROUND_TABLE.background_table_addr(), 0x1000);
        assert_eq!(PpuCtrl::SPRITE_TABLE.sprite_table_addr(), 0x1000);
    }

    #[test]
    fn test_sprite_height() {
        assert_eq!(PpuCtrl::empty().sprite_height(), 8);
        assert_eq!(PpuCtrl::SPRITE_SIZE.sprite_height(), 16);
    }

    #[test]
    fn test_rendering_enabled() {
        assert!(!PpuMask::empty().rendering_enabled());
        assert!(PpuMask::SHOW_BACKGROUND.rendering_enabled());
        assert!(PpuMask::SHOW_SPRITES.rendering_enabled());
        assert!(!PpuMask::GRAYSCALE.rendering_enabled());
    }
}
