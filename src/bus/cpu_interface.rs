/*!
CPU-visible address decoder.

Address map:
- $0000-$07FF: 2 KiB internal RAM, mirrored through $1FFF
- $2000-$3FFF: PPU registers (8-byte window, mirrored)
- $4000-$4013: APU channel registers
- $4014: OAM DMA trigger (write-only; reads are open bus)
- $4015: APU status/enables
- $4016: controller strobe (write; any write reloads both pads), pad 1 read
- $4017: APU frame counter (write), pad 2 read
- $4018-$401F: disabled test registers
- $4020-$FFFF: cartridge (mapper-controlled)

`CpuBusView` borrows exactly the Bus fields a CPU (or DMA) cycle needs, so
the CPU core can run against it while the Bus retains ownership of the CPU
itself.
*/

use crate::apu::Apu;
use crate::bus::dma::OamDma;
use crate::controller::Controller;
use crate::cpu::CpuBus;
use crate::mapper::Mapper;
use crate::ppu::Ppu;

pub(crate) struct CpuBusView<'a> {
    pub ram: &'a mut [u8; 0x0800],
    pub ppu: &'a mut Ppu,
    pub apu: &'a mut Apu,
    pub controllers: &'a mut [Option<Box<dyn Controller>>; 2],
    pub mapper: Option<&'a mut Mapper>,
    /// Absent while the DMA engine itself is driving the view.
    pub dma: Option<&'a mut OamDma>,
    pub cpu_cycle: u64,
}

impl CpuBus for CpuBusView<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.read_reg(addr, self.mapper.as_deref()),
            0x4000..=0x4013 | 0x4015 => self.apu.read_reg(addr),
            0x4014 => 0, // write-only; open bus
            0x4016 => controller_read(&mut self.controllers[0]),
            0x4017 => controller_read(&mut self.controllers[1]),
            0x4018..=0x401F => 0,
            0x4020..=0xFFFF => self.mapper.as_deref().map(|m| m.cpu_read(addr)).unwrap_or(0),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => self.ppu.write_reg(addr, value, self.mapper.as_deref_mut()),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_reg(addr, value),
            0x4014 => {
                if let Some(dma) = self.dma.as_deref_mut() {
                    dma.start(value, self.cpu_cycle);
                }
            }
            0x4016 => {
                // Strobe: latch the live state into both shift registers.
                for slot in self.controllers.iter_mut() {
                    if let Some(pad) = slot.as_deref_mut() {
                        pad.reload();
                    }
                }
            }
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(m) = self.mapper.as_deref_mut() {
                    m.cpu_write(addr, value);
                }
            }
        }
    }
}

#[inline]
fn controller_read(slot: &mut Option<Box<dyn Controller>>) -> u8 {
    match slot.as_deref_mut() {
        Some(pad) => pad.read() & 0x01,
        None => 0,
    }
}
