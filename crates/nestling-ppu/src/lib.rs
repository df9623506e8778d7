//! Cycle-accurate Ricoh 2C02 PPU core for the NES.
//!
//! The PPU is driven one dot at a time via [`Ppu::tick`]; three dots run per
//! CPU cycle. Pattern table and nametable traffic goes through the
//! [`PpuBus`] trait, implemented by the cartridge (nametable RAM is wired
//! through the cartridge connector, which is what makes mirroring a mapper
//! concern). Palette RAM and the 256×240 RGBA frame buffer live inside the
//! PPU.
//!
//! The NMI line exposed by [`Ppu::nmi_line`] is the plain conjunction of
//! the vblank flag and the NMI enable bit; the CPU samples it every bus
//! cycle and latches the rising edge.

#![warn(missing_docs)]

mod oam;
mod palette;
mod ppu;
mod registers;
mod scroll;

pub use oam::{Oam, Sprite};
pub use palette::SYSTEM_PALETTE;
pub use ppu::{Ppu, PpuBus, FRAME_HEIGHT, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::ScrollRegisters;
