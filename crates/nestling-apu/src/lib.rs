//! NES 2A03 APU emulation.
//!
//! Five synthesis channels (two pulse, triangle, noise, DMC), the frame
//! sequencer that clocks their envelopes, sweeps and length counters, and
//! a non-linear mixer producing mono signed 16-bit samples at a
//! configurable host rate.
//!
//! The APU advances one CPU cycle per [`Apu::tick`]. It never touches the
//! system bus itself: the DMC raises fetch requests through
//! [`Apu::take_dmc_request`] and receives bytes back through
//! [`Apu::dmc_deliver_sample`], with the DMA controller doing the actual
//! reads while the CPU is halted.

#![warn(missing_docs)]

mod apu;
mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod sweep;
mod timer;
mod triangle;

pub use apu::{Apu, Channel};
pub use dmc::Dmc;
pub use envelope::Envelope;
pub use frame_counter::{FrameClocks, FrameCounter};
pub use length_counter::LengthCounter;
pub use noise::Noise;
pub use pulse::Pulse;
pub use sweep::{NegateMode, Sweep};
pub use timer::Timer;
pub use triangle::Triangle;
