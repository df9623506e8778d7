//! NES emulation core: CPU, PPU, APU, DMA and mappers wired together.
//!
//! The [`Console`] is the public face: load a ROM, call
//! [`Console::run_frame`] in a loop, read the frame buffer and drain the
//! audio samples between frames, feed button state with
//! [`Console::press_button`]/[`Console::release_button`].
//!
//! Scheduling is single-threaded and deterministic. Every CPU bus cycle
//! advances the APU by one CPU cycle and the PPU by three dots before the
//! interrupt lines are re-latched; DMA transfers steal cycles through the
//! CPU's halt hook. There is no parallelism and no timer anywhere in the
//! core: a frame is just the instructions it takes for the PPU's frame
//! counter to advance.
//!
//! # Example
//!
//! ```no_run
//! use nestling_core::{Buttons, Console};
//!
//! let rom = std::fs::read("game.nes").expect("read ROM");
//! let mut console = Console::new(&rom).expect("load ROM");
//!
//! console.press_button(Buttons::START);
//! console.run_frame().expect("CPU jammed");
//! let audio = console.take_audio_samples();
//! let pixels = console.frame_buffer();
//! # let _ = (pixels, audio);
//! ```

#![warn(missing_docs)]

mod bus;
mod console;
mod controller;
mod dma;

pub use bus::SystemBus;
pub use console::{Console, ConsoleError, DEFAULT_SAMPLE_RATE_HZ, NTSC_CPU_CLOCK_HZ};
pub use controller::{Buttons, StandardController};
pub use dma::DmaController;

// The building blocks, for hosts that want to poke at the internals.
pub use nestling_apu::{Apu, Channel};
pub use nestling_cpu::{Access, Bus, Cpu, CpuError};
pub use nestling_mappers::{Mapper, Rom, RomError};
pub use nestling_ppu::{Ppu, FRAME_HEIGHT, FRAME_WIDTH};
