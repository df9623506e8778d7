//! The system bus.
//!
//! Routes every CPU access to work RAM, the PPU registers, the APU/IO
//! registers, the controller or the cartridge, and advances the rest of
//! the machine in lockstep: after each access the APU runs one CPU cycle,
//! the PPU runs three dots, and the interrupt lines are re-latched for the
//! CPU to sample. The DMA drain sequence also lives here, since it is made
//! of ordinary bus cycles.

use nestling_apu::Apu;
use nestling_cpu::{Access, Bus};
use nestling_mappers::Mapper;
use nestling_ppu::{Ppu, PpuBus};

use crate::controller::StandardController;
use crate::dma::DmaController;

/// The PPU's window onto cartridge memory (pattern tables and nametables).
struct CartridgeBus<'a> {
    mapper: &'a mut Mapper,
}

impl PpuBus for CartridgeBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        self.mapper.ppu_read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mapper.ppu_write(addr, value);
    }
}

/// Everything on the far side of the CPU pins.
#[derive(Debug)]
pub struct SystemBus {
    ram: [u8; 0x800],
    ppu: Ppu,
    apu: Apu,
    mapper: Mapper,
    controller: StandardController,
    dma: DmaController,

    /// Interrupt lines, latched after every bus cycle.
    nmi_line: bool,
    irq_line: bool,
}

impl SystemBus {
    /// Build a bus around a cartridge.
    #[must_use]
    pub fn new(mapper: Mapper, cpu_clock_hz: f64, sample_rate_hz: f64) -> Self {
        Self {
            ram: [0; 0x800],
            ppu: Ppu::new(),
            apu: Apu::new(cpu_clock_hz, sample_rate_hz),
            mapper,
            controller: StandardController::new(),
            dma: DmaController::new(),
            nmi_line: false,
            irq_line: false,
        }
    }

    /// Power-on initialization of everything behind the bus.
    pub fn power_on(&mut self) {
        self.ram = [0; 0x800];
        self.ppu.power_on();
        self.apu.power_on();
        self.dma.clear();
        self.controller = StandardController::new();
        self.nmi_line = false;
        self.irq_line = false;
    }

    /// Soft reset: PPU and APU keep the state a reset preserves, the
    /// mapper returns to its power-up banks, pending DMA is dropped.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.mapper.reset();
        self.dma.clear();
        self.nmi_line = false;
        self.irq_line = false;
    }

    /// Shared reference to the PPU.
    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Shared reference to the APU.
    #[must_use]
    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    /// Exclusive reference to the APU (volume controls, sample drain).
    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    /// Shared reference to the cartridge.
    #[must_use]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Exclusive reference to the cartridge (battery I/O).
    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    /// Exclusive reference to the controller.
    pub fn controller_mut(&mut self) -> &mut StandardController {
        &mut self.controller
    }

    /// Advance the machine by one CPU cycle: APU once, PPU three dots,
    /// then re-latch the interrupt lines and pick up any DMC fetch request.
    fn tick_system(&mut self) {
        self.apu.tick();
        if let Some(addr) = self.apu.take_dmc_request() {
            self.dma.schedule_dmc_dma(addr);
        }

        for _ in 0..3 {
            let mut cartridge = CartridgeBus {
                mapper: &mut self.mapper,
            };
            self.ppu.tick(&mut cartridge);
        }

        self.nmi_line = self.ppu.nmi_line();
        self.irq_line = self.apu.irq_line() || self.mapper.irq_line();
    }

    fn dispatch_read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let mut cartridge = CartridgeBus {
                    mapper: &mut self.mapper,
                };
                self.ppu.read_register(addr, &mut cartridge)
            }
            0x4015 => self.apu.read_status(),
            0x4016 => self.controller.read(),
            // Write-only and disabled registers ($4017 reads as open)
            0x4000..=0x401F => 0,
            _ => self.mapper.cpu_read(addr),
        }
    }

    fn dispatch_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let mut cartridge = CartridgeBus {
                    mapper: &mut self.mapper,
                };
                self.ppu.write_register(addr, value, &mut cartridge);
            }
            0x4014 => self.dma.schedule_oam_dma(value),
            0x4016 => self.controller.write(value),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, value),
            0x4018..=0x401F => {}
            _ => self.mapper.cpu_write(addr, value),
        }
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16, _access: Access) -> u8 {
        let value = self.dispatch_read(addr);
        self.tick_system();
        value
    }

    fn write(&mut self, addr: u16, value: u8, _access: Access) {
        self.dispatch_write(addr, value);
        self.tick_system();
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // PPU registers have read side effects; report nothing
            0x2000..=0x3FFF => 0,
            0x4015 => self.apu.peek_status(),
            0x4000..=0x401F => 0,
            _ => self.mapper.cpu_read(addr),
        }
    }

    fn nmi_line(&self) -> bool {
        self.nmi_line
    }

    fn irq_line(&self) -> bool {
        self.irq_line
    }

    fn halt_requested(&self) -> bool {
        self.dma.pending()
    }

    /// The DMA drain, entered from the CPU's halt check right before a
    /// read cycle:
    ///
    /// 1. the halt cycle itself (a dummy read of the stalled address);
    /// 2. one extra dummy read when a DMC fetch is pending;
    /// 3. one alignment dummy read when the APU sits in a "put" cycle;
    /// 4. the 256 read/write pairs of an OAM transfer, or the single DMC
    ///    fetch.
    ///
    /// When both transfers are pending the OAM transfer wins; the DMC
    /// fetch is dropped here and the APU re-requests it.
    fn service_halt(&mut self, next_addr: u16) -> u64 {
        let mut cycles = 0u64;
        let dmc_was_pending = self.dma.dmc_pending();

        self.read(next_addr, Access::DMA | Access::DUMMY_READ);
        cycles += 1;
        if dmc_was_pending {
            self.read(next_addr, Access::DMA | Access::DUMMY_READ);
            cycles += 1;
        }
        if self.apu.is_put_cycle() {
            self.read(next_addr, Access::DMA | Access::DUMMY_READ);
            cycles += 1;
        }

        if let Some(page) = self.dma.take_oam() {
            let base = u16::from(page) << 8;
            for offset in 0..256u16 {
                let value = self.read(base | offset, Access::DMA | Access::READ);
                self.write(0x2004, value, Access::DMA | Access::WRITE);
            }
            cycles += 512;
            self.dma.take_dmc();
        } else if let Some(addr) = self.dma.take_dmc() {
            let value = self.read(addr, Access::DMA | Access::READ);
            cycles += 1;
            self.apu.dmc_deliver_sample(value);
        }

        cycles
    }
}
