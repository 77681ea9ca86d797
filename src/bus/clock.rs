/*!
Master-clock phasing and the host time loop.

The three regions divide one master oscillator into CPU and PPU ticks:
NTSC 12/4, PAL 16/5, Dendy 15/5. The bus keeps a master counter modulo
`cpu_div * ppu_div`; within one master cycle the CPU subtick (including the
DMA micro-step) runs before the PPU subtick, and a PPU-raised NMI is latched
into the CPU on the same master cycle, giving at most one CPU cycle of
delivery latency.

`update(now_ns)` converts a monotonic host timestamp into whole master
cycles at the region's main-clock frequency; the sub-cycle remainder is
carried between calls so rounding never drifts.
*/

use crate::bus::cpu_interface::CpuBusView;
use crate::bus::{Bus, Region};
use crate::cpu::Interrupt;

const NANOS_PER_SEC: u128 = 1_000_000_000;

impl Region {
    /// Master-clock divisors as (cpu_div, ppu_div).
    pub fn divisors(self) -> (u32, u32) {
        match self {
            Region::Ntsc => (12, 4),
            Region::Pal => (16, 5),
            Region::Dendy => (15, 5),
        }
    }

    /// Main oscillator frequency in Hz.
    pub fn master_clock_hz(self) -> u64 {
        match self {
            Region::Ntsc => 21_477_272,
            Region::Pal | Region::Dendy => 26_601_712,
        }
    }
}

impl Bus {
    /// Advance one master clock.
    pub fn tick(&mut self) {
        let (cpu_div, ppu_div) = self.region.divisors();
        if self.master_cycle % cpu_div == 0 {
            self.cpu_subtick();
        }
        if self.master_cycle % ppu_div == 0 {
            self.ppu_subtick();
        }
        self.master_cycle = (self.master_cycle + 1) % (cpu_div * ppu_div);
    }

    /// Drive emulated time forward to a monotonic host timestamp.
    pub fn update(&mut self, now_ns: u64) {
        let last = match self.last_now_ns {
            Some(t) => t,
            None => {
                self.last_now_ns = Some(now_ns);
                return;
            }
        };
        let elapsed = u128::from(now_ns.saturating_sub(last));
        self.last_now_ns = Some(now_ns);

        let numerator = elapsed * u128::from(self.region.master_clock_hz()) + self.time_carry;
        let cycles = numerator / NANOS_PER_SEC;
        self.time_carry = numerator % NANOS_PER_SEC;
        for _ in 0..cycles {
            self.tick();
        }
    }

    /// Run until `n` further CPU cycles have elapsed.
    pub fn step_cpu_cycles(&mut self, n: u64) {
        let target = self.cpu_cycle + n;
        while self.cpu_cycle < target {
            self.tick();
        }
    }

    fn cpu_subtick(&mut self) {
        // Level-sensitive IRQ aggregation: APU frame/DMC line OR mapper line.
        let mapper_irq = self
            .cartridge
            .as_ref()
            .map(|c| c.mapper.irq_pending())
            .unwrap_or(false);
        if self.apu.irq_asserted() || mapper_irq {
            self.cpu.latch_interrupt(Interrupt::Irq);
        }

        let Bus {
            cpu,
            ppu,
            apu,
            ram,
            controllers,
            cartridge,
            dma,
            cpu_cycle,
            ..
        } = self;

        let dma_was_active = dma.is_active();
        {
            let mut view = CpuBusView {
                ram: &mut *ram,
                ppu: &mut *ppu,
                apu: &mut *apu,
                controllers: &mut *controllers,
                mapper: cartridge.as_mut().map(|c| &mut c.mapper),
                dma: Some(&mut *dma),
                cpu_cycle: *cpu_cycle,
            };
            cpu.tick(&mut view);
        }

        // The DMA micro-step runs in the CPU's slot, starting the cycle
        // after the $4014 write.
        if dma_was_active {
            let mut view = CpuBusView {
                ram: &mut *ram,
                ppu: &mut *ppu,
                apu: &mut *apu,
                controllers: &mut *controllers,
                mapper: cartridge.as_mut().map(|c| &mut c.mapper),
                dma: None,
                cpu_cycle: *cpu_cycle,
            };
            dma.step(&mut view);
        }
        cpu.set_suspended(dma.is_active());

        apu.tick();
        *cpu_cycle += 1;
    }

    fn ppu_subtick(&mut self) {
        let mapper = self.cartridge.as_mut().map(|c| &mut c.mapper);
        self.ppu.tick(mapper);
        if self.ppu.take_nmi_request() {
            self.cpu.latch_interrupt(Interrupt::Nmi);
        }
    }
}
