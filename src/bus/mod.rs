/*!
Bus: the memory-mapped fabric that owns the CPU, PPU, APU, RAM, DMA engine
and controller ports, routes every CPU access, and phases the whole machine
off one master clock.

Submodules:
- cpu_interface: the CPU-visible address decoder (`CpuBusView`)
- dma: the OAM DMA engine ($4014)
- clock: master-cycle phasing, region timing and the `update(now_ns)` loop

Ownership
- The bus exclusively owns CPU, PPU, APU, RAM, the DMA latch and the
  controller ports; the cartridge (and its mapper) is owned here too and
  lent to the PPU during each tick.
- The CPU holds no back-reference; every CPU cycle receives a short-lived
  `CpuBusView` over the other bus-owned state.
*/

pub mod clock;
pub mod cpu_interface;
pub mod dma;

use crate::apu::Apu;
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::cpu::{Cpu, CpuBus, Interrupt};
use crate::palette::PaletteError;
use crate::ppu::Ppu;
use crate::rom::Timing;
use crate::screen::Screen;
use cpu_interface::CpuBusView;
use dma::OamDma;

/// Console region; selects the master-clock ratio set and frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
    Dendy,
}

impl From<Timing> for Region {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::Pal => Region::Pal,
            Timing::Dendy => Region::Dendy,
            _ => Region::Ntsc,
        }
    }
}

pub struct Bus {
    pub(crate) cpu: Cpu,
    pub(crate) ppu: Ppu,
    pub(crate) apu: Apu,
    pub(crate) ram: [u8; 0x0800],
    pub(crate) controllers: [Option<Box<dyn Controller>>; 2],
    pub(crate) cartridge: Option<Cartridge>,
    pub(crate) dma: OamDma,

    pub(crate) region: Region,
    pub(crate) master_cycle: u32,
    pub(crate) cpu_cycle: u64,

    // update(now_ns) bookkeeping
    pub(crate) time_carry: u128,
    pub(crate) last_now_ns: Option<u64>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self::with_region(Region::Ntsc)
    }

    pub fn with_region(region: Region) -> Self {
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            ram: [0; 0x0800],
            controllers: [None, None],
            cartridge: None,
            dma: OamDma::new(),
            region,
            master_cycle: 0,
            cpu_cycle: 0,
            time_carry: 0,
            last_now_ns: None,
        }
    }

    /// Cold boot: clear RAM and all device state, then load PC from the
    /// reset vector.
    pub fn power(&mut self) {
        self.ram = [0; 0x0800];
        self.ppu.reset();
        self.apu.reset();
        self.dma.reset();
        if let Some(cart) = self.cartridge.as_mut() {
            cart.mapper.reset();
        }
        self.master_cycle = 0;
        self.cpu_cycle = 0;
        self.time_carry = 0;
        self.last_now_ns = None;
        let mut view = self.view();
        let mut cpu = Cpu::new();
        cpu.power(&mut view);
        self.cpu = cpu;
    }

    /// Warm reset: RAM survives; the CPU takes its reset sequence (A/X/Y
    /// preserved, SP -= 3, I set), PPU and APU restart.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.dma.reset();
        if let Some(cart) = self.cartridge.as_mut() {
            cart.mapper.reset();
        }
        self.cpu.set_suspended(false);
        self.cpu.latch_interrupt(Interrupt::Reset);
    }

    /// Attach a cartridge; the region follows the container's timing.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.region = Region::from(cartridge.timing());
        self.cartridge = Some(cartridge);
    }

    /// Attach the host framebuffer; the PPU writes pixels and swaps once
    /// per frame.
    pub fn connect_screen(&mut self, screen: Box<dyn Screen>) {
        self.ppu.connect_screen(screen);
    }

    /// Attach an input device to slot 0 or 1.
    pub fn connect_controller(&mut self, slot: usize, device: Box<dyn Controller>) {
        if let Some(entry) = self.controllers.get_mut(slot) {
            *entry = Some(device);
        }
    }

    /// Supply a raw master palette (192 or 1536 bytes).
    pub fn set_palette(&mut self, bytes: &[u8]) -> Result<(), PaletteError> {
        self.ppu.set_palette(bytes)
    }

    /// CPU-visible read (same decode the CPU core sees).
    pub fn read(&mut self, addr: u16) -> u8 {
        self.view().read(addr)
    }

    /// CPU-visible write. A $4014 write starts OAM DMA and suspends the CPU
    /// from the next cycle.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.view().write(addr, value);
        if self.dma.is_active() {
            self.cpu.set_suspended(true);
        }
    }

    /// Little-endian word read (vectors).
    pub fn read_word(&mut self, addr: u16) -> u16 {
        self.view().read_word(addr)
    }

    fn view(&mut self) -> CpuBusView<'_> {
        CpuBusView {
            ram: &mut self.ram,
            ppu: &mut self.ppu,
            apu: &mut self.apu,
            controllers: &mut self.controllers,
            mapper: self.cartridge.as_mut().map(|c| &mut c.mapper),
            dma: Some(&mut self.dma),
            cpu_cycle: self.cpu_cycle,
        }
    }

    // Accessors for integration code and tests.

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn cartridge_ref(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_active()
    }

    /// Total CPU cycles elapsed since power.
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycle
    }
}
