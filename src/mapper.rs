/*!
Mapper subsystem: mapper kinds and the NROM (mapper 0) implementation.

Purpose
- Decouple CPU/PPU address mapping from the `Cartridge` so additional mappers
  can be added.
- Provide a stable surface the Bus and PPU call for memory transactions in
  cartridge space, and the nametable mirroring policy the PPU consults for
  every nametable access.

Dispatch model
- `Mapper` is a tagged enum of mapper kinds rather than a trait object; each
  access is a small `match` over the variant. This keeps the hot path free of
  indirect calls and the per-kind state plainly visible.

Capability set
- `cpu_read` / `cpu_write`: CPU-visible $4020..=$FFFF (Bus forwards these).
- `ppu_read` / `ppu_write`: PPU-visible $0000..=$1FFF (pattern tables).
- `mirror_addr`: map a nametable address into the PPU's nametable RAM.
- `irq_pending`: the mapper's IRQ output line (NROM never asserts it).
- `on_scanline`: notification hook for scanline-counting mappers (NROM no-op).
*/

use log::debug;

/// Nametable mirroring policy. `mirror_addr` folds a 12-bit nametable offset
/// into the PPU's nametable RAM according to the active mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreenA,
    SingleScreenB,
    FourScreen,
}

impl Mirroring {
    /// Fold a nametable address (anything in $2000..=$3EFF, or a bare 12-bit
    /// offset) into an index within nametable RAM. Modes other than
    /// `FourScreen` only ever produce indices below 2 KiB.
    #[inline]
    pub fn mirror_addr(self, addr: u16) -> u16 {
        let addr = addr & 0x0FFF;
        match self {
            Mirroring::Vertical => addr & 0x07FF,
            Mirroring::Horizontal => ((addr & 0x0800) >> 1) | (addr & 0x03FF),
            Mirroring::SingleScreenA => addr & 0x03FF,
            Mirroring::SingleScreenB => 0x0400 | (addr & 0x03FF),
            Mirroring::FourScreen => addr,
        }
    }
}

/// NROM (mapper 0).
///
/// - PRG ROM: 16 KiB (mirrored across $C000..=$FFFF) or 32 KiB, indexed with
///   `addr & (len - 1)`.
/// - PRG RAM: optional, at $6000..=$7FFF.
/// - CHR: 8 KiB ROM, or RAM when the container ships none.
/// - Mirroring: hardwired from the header.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    pub fn new(
        prg_rom: Vec<u8>,
        chr: Vec<u8>,
        chr_is_ram: bool,
        prg_ram_size: usize,
        mirroring: Mirroring,
    ) -> Self {
        Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            mirroring,
        }
    }

    #[inline]
    fn prg_rom_read(&self, addr: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0;
        }
        let rel = addr.wrapping_sub(0x8000) as usize;
        let len = self.prg_rom.len();
        if len.is_power_of_two() {
            self.prg_rom[rel & (len - 1)]
        } else {
            self.prg_rom[rel % len]
        }
    }

    #[inline]
    fn prg_ram_index(&self, addr: u16) -> Option<usize> {
        if self.prg_ram.is_empty() {
            return None;
        }
        let rel = (addr as usize).wrapping_sub(0x6000);
        Some(rel % self.prg_ram.len())
    }
}

/// Polymorphic cartridge mapper; currently only NROM is populated.
#[derive(Clone, Debug)]
pub enum Mapper {
    Nrom(Nrom),
}

impl Mapper {
    /// CPU-visible read in $4020..=$FFFF. Unmapped space reads open bus (0).
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom(nrom) => match addr {
                0x6000..=0x7FFF => nrom
                    .prg_ram_index(addr)
                    .map(|i| nrom.prg_ram[i])
                    .unwrap_or(0),
                0x8000..=0xFFFF => nrom.prg_rom_read(addr),
                _ => 0,
            },
        }
    }

    /// CPU-visible write in $4020..=$FFFF. Writes to ROM are ignored.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::Nrom(nrom) => match addr {
                0x6000..=0x7FFF => {
                    if let Some(i) = nrom.prg_ram_index(addr) {
                        nrom.prg_ram[i] = value;
                    }
                }
                0x8000..=0xFFFF => {
                    debug!("ignored write {value:02X} to NROM PRG ROM at {addr:04X}");
                }
                _ => {}
            },
        }
    }

    /// PPU-visible read in the pattern table region ($0000..=$1FFF).
    pub fn ppu_read(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom(nrom) => {
                if nrom.chr.is_empty() {
                    return 0;
                }
                nrom.chr[((addr as usize) & 0x1FFF) % nrom.chr.len()]
            }
        }
    }

    /// PPU-visible write in the pattern table region. Only CHR RAM accepts it.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::Nrom(nrom) => {
                if nrom.chr_is_ram && !nrom.chr.is_empty() {
                    let idx = (addr as usize) & 0x1FFF;
                    nrom.chr[idx] = value;
                }
            }
        }
    }

    /// Fold a nametable address into nametable RAM per the active mirroring.
    #[inline]
    pub fn mirror_addr(&self, addr: u16) -> u16 {
        self.mirroring().mirror_addr(addr)
    }

    pub fn mirroring(&self) -> Mirroring {
        match self {
            Mapper::Nrom(nrom) => nrom.mirroring,
        }
    }

    /// Whether the mapper asserts its IRQ output line.
    pub fn irq_pending(&self) -> bool {
        match self {
            Mapper::Nrom(_) => false,
        }
    }

    /// Scanline notification for counting mappers. NROM has no counters.
    pub fn on_scanline(&mut self) {
        match self {
            Mapper::Nrom(_) => {}
        }
    }

    /// Reset mapper-internal state (bank registers, IRQ counters).
    pub fn reset(&mut self) {
        match self {
            Mapper::Nrom(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_32k() -> Mapper {
        let prg = vec![0xAA; 32 * 1024];
        let chr = vec![0xCC; 8 * 1024];
        Mapper::Nrom(Nrom::new(prg, chr, false, 8 * 1024, Mirroring::Vertical))
    }

    #[test]
    fn nrom_32k_prg_basic() {
        let mut m = nrom_32k();

        assert_eq!(m.cpu_read(0x8000), 0xAA);
        assert_eq!(m.cpu_read(0xFFFF), 0xAA);

        // PRG RAM read/write
        m.cpu_write(0x6000, 0x42);
        assert_eq!(m.cpu_read(0x6000), 0x42);

        // CHR ROM read (write ignored)
        assert_eq!(m.ppu_read(0x0000), 0xCC);
        m.ppu_write(0x0000, 0x11);
        assert_eq!(m.ppu_read(0x0000), 0xCC);
    }

    #[test]
    fn nrom_16k_prg_mirrors_upper_half() {
        let mut prg = vec![0x00; 16 * 1024];
        prg[0] = 0x12;
        prg[0x3FFF] = 0x34;
        let m = Mapper::Nrom(Nrom::new(
            prg,
            vec![0; 8 * 1024],
            true,
            0,
            Mirroring::Horizontal,
        ));

        assert_eq!(m.cpu_read(0x8000), 0x12);
        assert_eq!(m.cpu_read(0xBFFF), 0x34);
        assert_eq!(m.cpu_read(0xC000), 0x12);
        assert_eq!(m.cpu_read(0xFFFF), 0x34);
    }

    #[test]
    fn chr_ram_is_writable() {
        let mut m = Mapper::Nrom(Nrom::new(
            vec![0xAA; 32 * 1024],
            vec![0x00; 8 * 1024],
            true,
            0,
            Mirroring::Vertical,
        ));
        assert_eq!(m.ppu_read(0x0001), 0x00);
        m.ppu_write(0x0001, 0x77);
        assert_eq!(m.ppu_read(0x0001), 0x77);
    }

    #[test]
    fn rom_ignores_prg_writes() {
        let mut m = nrom_32k();
        m.cpu_write(0x8000, 0x99);
        assert_eq!(m.cpu_read(0x8000), 0xAA);
    }

    #[test]
    fn mirror_addr_vertical() {
        let m = Mirroring::Vertical;
        for k in 0..0x400u16 {
            assert_eq!(m.mirror_addr(k), m.mirror_addr(0x0800 | k));
            assert_eq!(m.mirror_addr(0x0400 | k), m.mirror_addr(0x0C00 | k));
        }
    }

    #[test]
    fn mirror_addr_horizontal() {
        let m = Mirroring::Horizontal;
        for k in 0..0x400u16 {
            assert_eq!(m.mirror_addr(k), m.mirror_addr(0x0400 | k));
            assert_eq!(m.mirror_addr(0x0800 | k), m.mirror_addr(0x0C00 | k));
            assert_ne!(m.mirror_addr(k), m.mirror_addr(0x0800 | k));
        }
    }

    #[test]
    fn mirror_addr_single_screen_and_four_screen() {
        assert_eq!(Mirroring::SingleScreenA.mirror_addr(0x0C23), 0x0023);
        assert_eq!(Mirroring::SingleScreenB.mirror_addr(0x0023), 0x0423);
        assert_eq!(Mirroring::FourScreen.mirror_addr(0x0C23), 0x0C23);
    }

    #[test]
    fn mirror_addr_accepts_full_ppu_addresses() {
        // $2000-relative and absolute forms fold identically.
        let m = Mirroring::Vertical;
        assert_eq!(m.mirror_addr(0x2481), m.mirror_addr(0x0481));
    }
}
