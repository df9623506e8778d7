//! APU register file, per-cycle clocking, mixing and sample generation.
//!
//! [`Apu::tick`] runs once per CPU cycle: it accumulates toward the next
//! host-rate output sample, clocks the channel timers at their native
//! rates (triangle, noise and DMC every CPU cycle; pulses every other),
//! and steps the frame sequencer. Samples are mono signed 16-bit PCM in a
//! producer-owned buffer the host drains between frames.

use crate::dmc::Dmc;
use crate::frame_counter::{FrameClocks, FrameCounter};
use crate::noise::Noise;
use crate::pulse::Pulse;
use crate::sweep::NegateMode;
use crate::triangle::Triangle;

/// Channel identifiers for the volume/mute API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Pulse channel 1 ($4000-$4003).
    Pulse1,
    /// Pulse channel 2 ($4004-$4007).
    Pulse2,
    /// Triangle channel ($4008-$400B).
    Triangle,
    /// Noise channel ($400C-$400F).
    Noise,
    /// Delta modulation channel ($4010-$4013).
    Dmc,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Self::Pulse1 => 0,
            Self::Pulse2 => 1,
            Self::Triangle => 2,
            Self::Noise => 3,
            Self::Dmc => 4,
        }
    }
}

/// The 2A03 APU.
#[derive(Debug, Clone)]
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,

    /// CPU cycles per host-rate output sample.
    cpu_cycles_per_sample: f64,
    /// Fractional accumulator toward the next sample.
    sample_timer: f64,
    /// Produced samples, drained by the host.
    samples: Vec<i16>,

    master_volume: f32,
    gains: [f32; 5],
    mutes: [bool; 5],
}

impl Apu {
    /// Create an APU producing samples at `sample_rate_hz` from a CPU
    /// clocked at `cpu_clock_hz`.
    #[must_use]
    pub fn new(cpu_clock_hz: f64, sample_rate_hz: f64) -> Self {
        Self {
            pulse1: Pulse::new(NegateMode::OnesComplement),
            pulse2: Pulse::new(NegateMode::TwosComplement),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dmc: Dmc::new(),
            frame_counter: FrameCounter::new(),
            cpu_cycles_per_sample: cpu_clock_hz / sample_rate_hz,
            sample_timer: 0.0,
            samples: Vec::new(),
            master_volume: 0.5,
            gains: [1.0; 5],
            mutes: [false; 5],
        }
    }

    /// Power on: every register written with zero.
    pub fn power_on(&mut self) {
        for addr in 0x4000..=0x4013 {
            self.write_register(addr, 0);
        }
        self.write_register(0x4015, 0);
        self.write_register(0x4017, 0);
        self.sample_timer = 0.0;
        self.samples.clear();
    }

    /// Soft reset: channels silenced, registers otherwise preserved.
    pub fn reset(&mut self) {
        self.write_register(0x4015, 0);
        self.sample_timer = 0.0;
        self.samples.clear();
    }

    /// Read $4015: channel/length status and IRQ flags. Side effect:
    /// clears the frame IRQ (but not the DMC IRQ).
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// $4015 contents without the read side effect.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.active() {
            status |= 0x01;
        }
        if self.pulse2.active() {
            status |= 0x02;
        }
        if self.triangle.active() {
            status |= 0x04;
        }
        if self.noise.active() {
            status |= 0x08;
        }
        if self.dmc.active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        status
    }

    /// Write an APU register ($4000-$4013, $4015, $4017).
    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 => self.pulse1.write_ctrl(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_lo(value),
            0x4003 => self.pulse1.write_timer_hi(value),

            0x4004 => self.pulse2.write_ctrl(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_lo(value),
            0x4007 => self.pulse2.write_timer_hi(value),

            0x4008 => self.triangle.write_linear(value),
            0x400A => self.triangle.write_timer_lo(value),
            0x400B => self.triangle.write_timer_hi(value),

            0x400C => self.noise.write_ctrl(value),
            0x400E => self.noise.write_period(value),
            0x400F => self.noise.write_length(value),

            0x4010 => self.dmc.write_ctrl(value),
            0x4011 => self.dmc.write_direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),

            0x4015 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
                self.dmc.clear_irq();
            }

            0x4017 => {
                let clocks = self.frame_counter.write(value);
                self.apply_frame_clocks(clocks);
            }

            _ => log::trace!("APU write to unmapped register ${addr:04X}"),
        }
    }

    /// Advance one CPU cycle.
    pub fn tick(&mut self) {
        self.sample_timer += 1.0;
        if self.sample_timer >= self.cpu_cycles_per_sample {
            self.sample_timer -= self.cpu_cycles_per_sample;
            let sample = self.mix_sample();
            self.samples.push(sample);
        }

        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();
        // Pulse timers run at the APU rate: every other CPU cycle, on the
        // "get" half of the frame counter's cycle
        if self.frame_counter.cycle() % 2 == 0 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
        }

        let clocks = self.frame_counter.clock();
        self.apply_frame_clocks(clocks);
    }

    fn apply_frame_clocks(&mut self, clocks: FrameClocks) {
        if clocks.quarter {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.triangle.clock_linear();
            self.noise.clock_envelope();
        }
        if clocks.half {
            self.pulse1.clock_length();
            self.pulse2.clock_length();
            self.triangle.clock_length();
            self.noise.clock_length();
            self.pulse1.clock_sweep();
            self.pulse2.clock_sweep();
        }
    }

    /// The non-linear mixer, with per-channel gains applied to the channel
    /// levels feeding it.
    fn mix_sample(&self) -> i16 {
        let gain = |index: usize| {
            if self.mutes[index] {
                0.0
            } else {
                self.gains[index]
            }
        };
        let pulse1 = f32::from(self.pulse1.output()) * gain(0);
        let pulse2 = f32::from(self.pulse2.output()) * gain(1);
        let triangle = f32::from(self.triangle.output()) * gain(2);
        let noise = f32::from(self.noise.output()) * gain(3);
        let dmc = f32::from(self.dmc.output()) * gain(4);

        let pulse_sum = pulse1 + pulse2;
        let pulse_out = if pulse_sum > 0.0 {
            95.88 / (8128.0 / pulse_sum + 100.0)
        } else {
            0.0
        };

        let tnd_sum = triangle / 8227.0 + noise / 12_241.0 + dmc / 22_638.0;
        let tnd_out = if tnd_sum > 0.0 {
            159.79 / (1.0 / tnd_sum + 100.0)
        } else {
            0.0
        };

        let mixed = (pulse_out + tnd_out) * self.master_volume;
        (mixed * f32::from(i16::MAX)) as i16
    }

    /// APU IRQ line: frame IRQ or DMC IRQ.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    /// Outstanding DMC fetch request, if any. The bus polls this after
    /// every tick and schedules the DMA.
    pub fn take_dmc_request(&mut self) -> Option<u16> {
        self.dmc.take_dma_request()
    }

    /// DMA completion: hand the fetched DPCM byte to the channel.
    pub fn dmc_deliver_sample(&mut self, value: u8) {
        self.dmc.deliver_sample(value);
    }

    /// Whether the frame counter sits in the "put" half of an APU cycle.
    /// The DMA controller consults this for its alignment cycle.
    #[must_use]
    pub fn is_put_cycle(&self) -> bool {
        self.frame_counter.is_put_cycle()
    }

    /// Frame counter cycle position (for debugging and tests).
    #[must_use]
    pub fn frame_cycle(&self) -> u32 {
        self.frame_counter.cycle()
    }

    /// Accumulated output samples.
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Drain the accumulated output samples.
    pub fn take_samples(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.samples)
    }

    /// Discard accumulated samples.
    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }

    // =====================================================================
    // Volume control
    // =====================================================================

    /// Set a channel's linear gain. Out-of-range values clamp to [0, 1].
    pub fn set_channel_volume(&mut self, channel: Channel, gain: f32) {
        self.gains[channel.index()] = gain.clamp(0.0, 1.0);
    }

    /// A channel's linear gain.
    #[must_use]
    pub fn channel_volume(&self, channel: Channel) -> f32 {
        self.gains[channel.index()]
    }

    /// Mute or unmute a channel. Channel state keeps advancing; only the
    /// mixer input is silenced.
    pub fn set_channel_mute(&mut self, channel: Channel, mute: bool) {
        self.mutes[channel.index()] = mute;
    }

    /// Whether a channel is muted.
    #[must_use]
    pub fn channel_mute(&self, channel: Channel) -> bool {
        self.mutes[channel.index()]
    }

    /// Set the master volume. Out-of-range values clamp to [0, 1].
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// The master volume.
    #[must_use]
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Current pulse 1 output level (debug aid).
    #[must_use]
    pub fn pulse1_output(&self) -> u8 {
        self.pulse1.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NTSC_CPU_CLOCK: f64 = 1_789_773.0;

    fn powered_apu() -> Apu {
        let mut apu = Apu::new(NTSC_CPU_CLOCK, 44_100.0);
        apu.power_on();
        apu
    }

    #[test]
    fn test_power_on_status_empty() {
        let mut apu = powered_apu();
        assert_eq!(apu.read_status(), 0);
        assert!(!apu.irq_line());
    }

    #[test]
    fn test_status_reports_active_lengths() {
        let mut apu = powered_apu();
        apu.write_register(0x4015, 0x0F);
        apu.write_register(0x4003, 0x00); // load pulse 1 length
        apu.write_register(0x400B, 0x00); // load triangle length
        let status = apu.read_status();
        assert_eq!(status & 0x01, 0x01);
        assert_eq!(status & 0x04, 0x04);
        assert_eq!(status & 0x02, 0x00);
    }

    #[test]
    fn test_frame_irq_fires_and_clears_on_status_read() {
        let mut apu = powered_apu();
        for _ in 0..29_830 {
            apu.tick();
        }
        assert!(apu.irq_line());
        let status = apu.read_status();
        assert_ne!(status & 0x40, 0);
        assert!(!apu.irq_line());
    }

    #[test]
    fn test_4017_bit6_inhibits_frame_irq() {
        let mut apu = powered_apu();
        apu.write_register(0x4017, 0x40);
        for _ in 0..40_000 {
            apu.tick();
        }
        assert!(!apu.irq_line());
    }

    #[test]
    fn test_4017_bit7_clocks_immediately() {
        let mut apu = powered_apu();
        apu.write_register(0x4015, 0x01);
        apu.write_register(0x4000, 0x00); // halt clear
        apu.write_register(0x4003, 0x18); // length index 3 -> 2
        assert_eq!(apu.peek_status() & 0x01, 0x01);

        // Two immediate half-frame clocks exhaust the length counter
        apu.write_register(0x4017, 0x80);
        apu.write_register(0x4017, 0x80);
        assert_eq!(apu.peek_status() & 0x01, 0x00);
    }

    #[test]
    fn test_4015_disable_zeroes_dmc_and_clears_irq() {
        let mut apu = powered_apu();
        apu.write_register(0x4010, 0x80); // IRQ enabled
        apu.write_register(0x4013, 0x00); // 1 byte
        apu.write_register(0x4015, 0x10);
        let addr = apu.take_dmc_request().unwrap();
        apu.dmc_deliver_sample(0x00);
        let _ = addr;
        assert!(apu.irq_line());

        apu.write_register(0x4015, 0x00);
        assert!(!apu.irq_line());
        assert_eq!(apu.peek_status() & 0x10, 0);
    }

    #[test]
    fn test_sample_cadence() {
        let mut apu = powered_apu();
        let cycles = 100_000u32;
        for _ in 0..cycles {
            apu.tick();
        }
        let expected = (f64::from(cycles) / (NTSC_CPU_CLOCK / 44_100.0)) as usize;
        let produced = apu.samples().len();
        assert!(
            produced == expected || produced == expected + 1,
            "produced {produced}, expected about {expected}"
        );
    }

    #[test]
    fn test_silence_mixes_to_zero() {
        let mut apu = powered_apu();
        for _ in 0..10_000 {
            apu.tick();
        }
        assert!(apu.samples().iter().all(|&sample| sample == 0));
    }

    #[test]
    fn test_pulse_duty_period() {
        // The end-to-end pulse scenario: duty 2, constant volume, period
        // $0FE. Rising edges of the raw channel output must land every
        // 2 * (period + 1) * 8 CPU cycles.
        let mut apu = powered_apu();
        apu.write_register(0x4015, 0x01);
        apu.write_register(0x4000, 0xBF);
        apu.write_register(0x4002, 0xFE);
        apu.write_register(0x4003, 0x00);

        let cycles = 200_000u32;
        let mut rising = 0u32;
        let mut previous = apu.pulse1_output();
        for _ in 0..cycles {
            apu.tick();
            let now = apu.pulse1_output();
            if previous == 0 && now > 0 {
                rising += 1;
            }
            previous = now;
        }

        let waveform_period = 2 * (0x0FE + 1) * 8;
        assert_eq!(rising, cycles / waveform_period);
    }

    #[test]
    fn test_take_samples_drains() {
        let mut apu = powered_apu();
        for _ in 0..1_000 {
            apu.tick();
        }
        let samples = apu.take_samples();
        assert!(!samples.is_empty());
        assert!(apu.samples().is_empty());
    }

    #[test]
    fn test_volume_clamping() {
        let mut apu = powered_apu();
        apu.set_channel_volume(Channel::Pulse1, 2.5);
        assert_eq!(apu.channel_volume(Channel::Pulse1), 1.0);
        apu.set_channel_volume(Channel::Pulse1, -1.0);
        assert_eq!(apu.channel_volume(Channel::Pulse1), 0.0);
        apu.set_master_volume(7.0);
        assert_eq!(apu.master_volume(), 1.0);
    }

    #[test]
    fn test_mute_silences_mixer_only() {
        let mut apu = powered_apu();
        apu.set_master_volume(1.0);
        apu.write_register(0x4015, 0x01);
        apu.write_register(0x4000, 0xBF);
        apu.write_register(0x4002, 0xFE);
        apu.write_register(0x4003, 0x00);
        apu.set_channel_mute(Channel::Pulse1, true);

        for _ in 0..50_000 {
            apu.tick();
        }
        // Mixer output silent, but the channel itself still runs
        assert!(apu.samples().iter().all(|&sample| sample == 0));
        assert_eq!(apu.peek_status() & 0x01, 0x01);
    }

    #[test]
    fn test_dmc_request_surfaces_through_tick() {
        let mut apu = powered_apu();
        apu.write_register(0x4012, 0x10);
        apu.write_register(0x4013, 0x01);
        apu.write_register(0x4015, 0x10);
        let addr = apu.take_dmc_request();
        assert_eq!(addr, Some(0xC000 + 0x10 * 64));
    }

    #[test]
    fn test_put_cycle_parity_tracks_frame_counter() {
        let mut apu = powered_apu();
        assert!(!apu.is_put_cycle());
        apu.tick();
        assert!(apu.is_put_cycle());
    }
}
