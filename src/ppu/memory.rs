/*!
PPU address-space mapping ($0000..=$3FFF).

- $0000..=$1FFF: pattern tables, delegated to the mapper (CHR ROM/RAM).
- $2000..=$2FFF: nametables, folded into the PPU's nametable RAM through the
  mapper's mirroring policy; $3000..=$3EFF mirrors this range.
- $3F00..=$3F1F: palette RAM, with $3F10/$3F14/$3F18/$3F1C aliasing the
  universal-background entries; $3F20..=$3FFF mirrors every 32 bytes.

Without a cartridge the nametables fold with a plain 2 KiB mask and pattern
reads return 0.
*/

use crate::mapper::Mapper;
use crate::ppu::Ppu;

/// Palette RAM byte index (0..=31) for an address in $3F00..=$3FFF,
/// applying the universal-background aliasing rule.
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let idx = (addr as usize) & 0x1F;
    if idx >= 0x10 && idx & 0x03 == 0 {
        idx - 0x10
    } else {
        idx
    }
}

impl Ppu {
    /// Read from PPU space with full mirroring semantics.
    pub fn mem_read(&self, addr: u16, mapper: Option<&Mapper>) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => mapper.map(|m| m.ppu_read(addr)).unwrap_or(0),
            0x2000..=0x3EFF => {
                let idx = self.nametable_index(addr, mapper);
                self.vram[idx]
            }
            _ => self.palette_ram[palette_index(addr)],
        }
    }

    /// Write to PPU space with full mirroring semantics.
    pub fn mem_write(&mut self, addr: u16, value: u8, mapper: Option<&mut Mapper>) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if let Some(m) = mapper {
                    m.ppu_write(addr, value);
                }
            }
            0x2000..=0x3EFF => {
                let idx = self.nametable_index(addr, mapper.as_deref());
                self.vram[idx] = value;
            }
            _ => self.palette_ram[palette_index(addr)] = value,
        }
    }

    #[inline]
    fn nametable_index(&self, addr: u16, mapper: Option<&Mapper>) -> usize {
        let folded = match mapper {
            Some(m) => m.mirror_addr(addr),
            None => addr & 0x07FF,
        };
        folded as usize % self.vram.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{Mirroring, Nrom};

    fn mapper_with(mirroring: Mirroring) -> Mapper {
        Mapper::Nrom(Nrom::new(
            vec![0; 16 * 1024],
            vec![0; 8 * 1024],
            true,
            0,
            mirroring,
        ))
    }

    #[test]
    fn palette_universal_background_aliases() {
        for (alias, base) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            assert_eq!(palette_index(alias), palette_index(base));
        }
        // Non-multiple-of-four sprite entries do not alias.
        assert_ne!(palette_index(0x3F11), palette_index(0x3F01));
    }

    #[test]
    fn palette_mirrors_every_32_bytes() {
        let mut p = Ppu::new();
        p.mem_write(0x3F21, 0x19, None);
        assert_eq!(p.mem_read(0x3F01, None), 0x19);
    }

    #[test]
    fn vertical_mirroring_aliases_2000_2800() {
        let mut p = Ppu::new();
        let mut m = mapper_with(Mirroring::Vertical);
        for k in [0x0000u16, 0x01FF, 0x03FF] {
            p.mem_write(0x2000 + k, 0x55, Some(&mut m));
            assert_eq!(p.mem_read(0x2800 + k, Some(&m)), 0x55);
        }
        p.mem_write(0x2400, 0x66, Some(&mut m));
        assert_eq!(p.mem_read(0x2C00, Some(&m)), 0x66);
        assert_ne!(p.mem_read(0x2000, Some(&m)), 0x66);
    }

    #[test]
    fn horizontal_mirroring_aliases_2000_2400() {
        let mut p = Ppu::new();
        let mut m = mapper_with(Mirroring::Horizontal);
        p.mem_write(0x2000, 0x31, Some(&mut m));
        assert_eq!(p.mem_read(0x2400, Some(&m)), 0x31);
        p.mem_write(0x2800, 0x32, Some(&mut m));
        assert_eq!(p.mem_read(0x2C00, Some(&m)), 0x32);
        assert_ne!(p.mem_read(0x2000, Some(&m)), 0x32);
    }

    #[test]
    fn mirror_3000_folds_onto_2000() {
        let mut p = Ppu::new();
        let mut m = mapper_with(Mirroring::Vertical);
        p.mem_write(0x2123, 0x44, Some(&mut m));
        assert_eq!(p.mem_read(0x3123, Some(&m)), 0x44);
    }

    #[test]
    fn pattern_space_routes_to_mapper_chr() {
        let mut p = Ppu::new();
        let mut m = mapper_with(Mirroring::Vertical);
        p.mem_write(0x0123, 0x77, Some(&mut m));
        assert_eq!(p.mem_read(0x0123, Some(&m)), 0x77);
        // Without a cartridge pattern reads are open (0).
        assert_eq!(p.mem_read(0x0123, None), 0);
    }
}
