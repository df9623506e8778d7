//! The console: composition root and high-level emulation API.

use std::io::{Read, Write};

use nestling_apu::Channel;
use nestling_cpu::{disassemble_at, Cpu, CpuError};
use nestling_mappers::{Mapper, Rom, RomError};

use crate::bus::SystemBus;
use crate::controller::Buttons;

/// NTSC CPU clock rate in Hz.
pub const NTSC_CPU_CLOCK_HZ: f64 = 1_789_773.0;
/// Default host audio sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 44_100.0;

/// Console error type.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// ROM parsing or mapper selection failed; the console never powers on.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
    /// The CPU hit an unimplemented opcode; emulation cannot continue.
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),
}

/// A complete NES.
#[derive(Debug)]
pub struct Console {
    cpu: Cpu,
    bus: SystemBus,
}

impl Console {
    /// Build a console from a ROM image at the default sample rate and
    /// power it on.
    ///
    /// # Errors
    ///
    /// Fails when the ROM is malformed or names an unsupported mapper.
    pub fn new(rom_data: &[u8]) -> Result<Self, ConsoleError> {
        Self::with_sample_rate(rom_data, DEFAULT_SAMPLE_RATE_HZ)
    }

    /// Build a console producing audio at a specific host sample rate.
    ///
    /// # Errors
    ///
    /// Fails when the ROM is malformed or names an unsupported mapper.
    pub fn with_sample_rate(rom_data: &[u8], sample_rate_hz: f64) -> Result<Self, ConsoleError> {
        let rom = Rom::load(rom_data)?;
        let mapper = Mapper::new(rom)?;
        let mut console = Self {
            cpu: Cpu::new(),
            bus: SystemBus::new(mapper, NTSC_CPU_CLOCK_HZ, sample_rate_hz),
        };
        console.power_on();
        Ok(console)
    }

    /// Cold boot: everything reinitialized, CPU vectors through reset.
    pub fn power_on(&mut self) {
        self.bus.power_on();
        self.cpu.power_on(&mut self.bus);
    }

    /// Soft reset between instructions. Palette RAM, OAM and APU channel
    /// registers survive; control state and pending DMA do not.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
    }

    /// Execute a single CPU instruction.
    ///
    /// # Errors
    ///
    /// Returns the CPU's error when it jams on an unimplemented opcode.
    pub fn step(&mut self) -> Result<u64, ConsoleError> {
        Ok(self.cpu.step(&mut self.bus)?)
    }

    /// Run CPU instructions until the PPU finishes the current frame.
    ///
    /// # Errors
    ///
    /// Returns the CPU's error when it jams; the frame is left partially
    /// rendered.
    pub fn run_frame(&mut self) -> Result<(), ConsoleError> {
        let frame = self.bus.ppu().frame();
        while self.bus.ppu().frame() == frame {
            self.cpu.step(&mut self.bus)?;
        }
        Ok(())
    }

    // =====================================================================
    // Input
    // =====================================================================

    /// Press a controller button.
    pub fn press_button(&mut self, button: Buttons) {
        self.bus.controller_mut().press(button);
    }

    /// Release a controller button.
    pub fn release_button(&mut self, button: Buttons) {
        self.bus.controller_mut().release(button);
    }

    // =====================================================================
    // Video and audio output
    // =====================================================================

    /// The 256x240 RGBA frame buffer of the most recent frame.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        self.bus.ppu().frame_buffer()
    }

    /// Accumulated mono 16-bit audio samples.
    #[must_use]
    pub fn audio_samples(&self) -> &[i16] {
        self.bus.apu().samples()
    }

    /// Drain the accumulated audio samples.
    pub fn take_audio_samples(&mut self) -> Vec<i16> {
        self.bus.apu_mut().take_samples()
    }

    /// Discard the accumulated audio samples.
    pub fn clear_audio_samples(&mut self) {
        self.bus.apu_mut().clear_samples();
    }

    /// Set a channel's linear gain (clamped to [0, 1]).
    pub fn set_channel_volume(&mut self, channel: Channel, gain: f32) {
        self.bus.apu_mut().set_channel_volume(channel, gain);
    }

    /// A channel's linear gain.
    #[must_use]
    pub fn channel_volume(&self, channel: Channel) -> f32 {
        self.bus.apu().channel_volume(channel)
    }

    /// Mute or unmute a channel.
    pub fn set_channel_mute(&mut self, channel: Channel, mute: bool) {
        self.bus.apu_mut().set_channel_mute(channel, mute);
    }

    /// Whether a channel is muted.
    #[must_use]
    pub fn channel_mute(&self, channel: Channel) -> bool {
        self.bus.apu().channel_mute(channel)
    }

    /// Set the master volume (clamped to [0, 1]).
    pub fn set_master_volume(&mut self, volume: f32) {
        self.bus.apu_mut().set_master_volume(volume);
    }

    /// The master volume.
    #[must_use]
    pub fn master_volume(&self) -> f32 {
        self.bus.apu().master_volume()
    }

    // =====================================================================
    // Battery saves
    // =====================================================================

    /// Whether the cartridge carries battery-backed PRG RAM.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.bus.mapper().has_battery()
    }

    /// Persist battery RAM to a save stream. I/O failure is logged and
    /// otherwise ignored; emulation continues without persistence.
    pub fn save_battery(&self, writer: &mut impl Write) {
        if !self.has_battery() {
            return;
        }
        if let Err(err) = self.bus.mapper().save_battery(writer) {
            log::warn!("battery save failed: {err}");
        }
    }

    /// Restore battery RAM from a save stream. I/O failure is logged and
    /// otherwise ignored.
    pub fn load_battery(&mut self, reader: &mut impl Read) {
        if !self.has_battery() {
            return;
        }
        if let Err(err) = self.bus.mapper_mut().load_battery(reader) {
            log::warn!("battery load failed: {err}");
        }
    }

    // =====================================================================
    // Debugging
    // =====================================================================

    /// Disassemble the instruction at an address without side effects.
    #[must_use]
    pub fn disassemble_at(&self, addr: u16) -> (String, u16) {
        disassemble_at(&self.bus, addr)
    }

    /// Read a byte without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        use nestling_cpu::Bus;
        self.bus.peek(addr)
    }

    /// The CPU, for state inspection.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The bus, for component inspection.
    #[must_use]
    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// The bus, mutably (tests and debuggers).
    pub fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }

    /// iNES mapper number of the loaded cartridge.
    #[must_use]
    pub fn mapper_number(&self) -> u8 {
        self.bus.mapper().number()
    }

    /// Board name of the loaded cartridge.
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.bus.mapper().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal NROM image: NOP loop with the reset vector at $8000.
    fn nop_rom() -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0, 0];
        image.extend_from_slice(&[0; 8]);
        let mut prg = vec![0xEA; 32 * 1024];
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        image.extend_from_slice(&prg);
        image.extend_from_slice(&[0; 8 * 1024]);
        image
    }

    #[test]
    fn test_console_boot() {
        let console = Console::new(&nop_rom()).unwrap();
        assert_eq!(console.cpu().pc, 0x8000);
        assert_eq!(console.mapper_number(), 0);
        assert_eq!(console.mapper_name(), "NROM");
        assert_eq!(console.frame_buffer().len(), 256 * 240 * 4);
    }

    #[test]
    fn test_invalid_rom_rejected() {
        let err = Console::new(&[0x00, 0x01]).unwrap_err();
        assert!(matches!(err, ConsoleError::Rom(_)));
    }

    #[test]
    fn test_unsupported_mapper_rejected() {
        let mut image = nop_rom();
        image[6] = 0x40; // mapper low nibble 4
        let err = Console::new(&image).unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Rom(RomError::UnsupportedMapper(4))
        ));
    }

    #[test]
    fn test_run_frame_advances_ppu() {
        let mut console = Console::new(&nop_rom()).unwrap();
        let frame = console.bus().ppu().frame();
        console.run_frame().unwrap();
        assert_eq!(console.bus().ppu().frame(), frame + 1);
    }

    #[test]
    fn test_frame_duration_in_cpu_cycles() {
        let mut console = Console::new(&nop_rom()).unwrap();
        console.run_frame().unwrap();
        let start = console.cpu().cycles;
        console.run_frame().unwrap();
        let elapsed = console.cpu().cycles - start;
        // 262 scanlines * 341 dots / 3 dots per cycle, within one
        // instruction of slack
        let expected = 262 * 341 / 3;
        assert!(
            (i64::try_from(elapsed).unwrap() - expected).abs() < 10,
            "frame took {elapsed} cycles"
        );
    }

    #[test]
    fn test_jam_propagates_from_run_frame() {
        let mut image = nop_rom();
        // Jam opcode at the reset target
        image[16] = 0x02;
        let mut console = Console::new(&image).unwrap();
        let err = console.run_frame().unwrap_err();
        assert!(matches!(err, ConsoleError::Cpu(CpuError::IllegalOpcode { .. })));
    }

    #[test]
    fn test_audio_accumulates_and_drains() {
        let mut console = Console::new(&nop_rom()).unwrap();
        console.run_frame().unwrap();
        assert!(!console.audio_samples().is_empty());
        let samples = console.take_audio_samples();
        // Roughly a frame's worth at 44.1 kHz
        assert!((600..900).contains(&samples.len()), "{}", samples.len());
        assert!(console.audio_samples().is_empty());
    }

    #[test]
    fn test_volume_passthrough() {
        let mut console = Console::new(&nop_rom()).unwrap();
        console.set_channel_volume(Channel::Noise, 0.25);
        assert_eq!(console.channel_volume(Channel::Noise), 0.25);
        console.set_channel_mute(Channel::Dmc, true);
        assert!(console.channel_mute(Channel::Dmc));
        console.set_master_volume(0.75);
        assert_eq!(console.master_volume(), 0.75);
    }

    #[test]
    fn test_disassemble_at_reset_target() {
        let console = Console::new(&nop_rom()).unwrap();
        let (text, length) = console.disassemble_at(0x8000);
        assert_eq!(text, "$8000  EA        NOP");
        assert_eq!(length, 1);
    }
}
