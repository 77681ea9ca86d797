/*!
Background tile pipeline.

Runs on every rendering line during dots 1..=256 and 321..=336 in the 8-dot
hardware cadence:

```text
phase 0: reload shifters, fetch nametable byte
phase 2: fetch attribute byte (2-bit field for this tile's quadrant)
phase 4: fetch pattern low plane
phase 6: fetch pattern high plane
phase 7: increment coarse X (wrapping the horizontal nametable)
```

Two 16-bit pattern shifters and two 16-bit attribute shifters feed the pixel
mux; `fine_x` selects the sampled bit from the top of each shifter.
*/

use crate::mapper::Mapper;
use crate::ppu::registers::PpuCtrl;
use crate::ppu::Ppu;

impl Ppu {
    /// Advance all four background shifters by one dot.
    #[inline]
    pub(in crate::ppu) fn shift_background(&mut self) {
        self.bg_pattern_lo <<= 1;
        self.bg_pattern_hi <<= 1;
        self.bg_attr_lo <<= 1;
        self.bg_attr_hi <<= 1;
    }

    /// Reload the low halves of the shifters from the latches fetched over
    /// the previous 8-dot group.
    #[inline]
    pub(in crate::ppu) fn load_background_shifters(&mut self) {
        self.bg_pattern_lo = (self.bg_pattern_lo & 0xFF00) | u16::from(self.pattern_lo_latch);
        self.bg_pattern_hi = (self.bg_pattern_hi & 0xFF00) | u16::from(self.pattern_hi_latch);
        self.bg_attr_lo =
            (self.bg_attr_lo & 0xFF00) | if self.at_latch & 0x01 != 0 { 0xFF } else { 0x00 };
        self.bg_attr_hi =
            (self.bg_attr_hi & 0xFF00) | if self.at_latch & 0x02 != 0 { 0xFF } else { 0x00 };
    }

    /// One dot of the 8-dot fetch cadence.
    pub(in crate::ppu) fn background_fetch_step(&mut self, mapper: Option<&Mapper>) {
        match (self.dot - 1) & 0x07 {
            0 => {
                self.load_background_shifters();
                self.nt_latch = self.mem_read(self.v.tile_address(), mapper);
            }
            2 => {
                let attr = self.mem_read(self.v.attribute_address(), mapper);
                self.at_latch = (attr >> self.v.attribute_shift()) & 0x03;
            }
            4 => {
                let addr = self.background_pattern_addr(false);
                self.pattern_lo_latch = self.mem_read(addr, mapper);
            }
            6 => {
                let addr = self.background_pattern_addr(true);
                self.pattern_hi_latch = self.mem_read(addr, mapper);
            }
            7 => self.v.increment_coarse_x(),
            _ => {}
        }
    }

    #[inline]
    fn background_pattern_addr(&self, high_plane: bool) -> u16 {
        let table = if self.ctrl.contains(PpuCtrl::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        };
        table | (u16::from(self.nt_latch) << 4) | (u16::from(high_plane) << 3) | self.v.fine_y()
    }

    /// Sample the 2-bit background pattern and 2-bit attribute under fine X.
    #[inline]
    pub(in crate::ppu) fn background_sample(&self) -> (u8, u8) {
        let bit = 0x8000u16 >> self.fine_x;
        let p0 = u8::from(self.bg_pattern_lo & bit != 0);
        let p1 = u8::from(self.bg_pattern_hi & bit != 0);
        let a0 = u8::from(self.bg_attr_lo & bit != 0);
        let a1 = u8::from(self.bg_attr_hi & bit != 0);
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifter_reload_expands_attribute_bits() {
        let mut p = Ppu::new();
        p.pattern_lo_latch = 0xAB;
        p.pattern_hi_latch = 0xCD;
        p.at_latch = 0x03;
        p.load_background_shifters();
        assert_eq!(p.bg_pattern_lo & 0x00FF, 0x00AB);
        assert_eq!(p.bg_pattern_hi & 0x00FF, 0x00CD);
        assert_eq!(p.bg_attr_lo & 0x00FF, 0x00FF);
        assert_eq!(p.bg_attr_hi & 0x00FF, 0x00FF);
    }

    #[test]
    fn sample_respects_fine_x() {
        let mut p = Ppu::new();
        p.bg_pattern_lo = 0x8000; // only the leftmost bit set
        p.bg_pattern_hi = 0x0000;
        p.fine_x = 0;
        assert_eq!(p.background_sample().0, 1);
        p.fine_x = 1;
        assert_eq!(p.background_sample().0, 0);
    }

    #[test]
    fn fetch_cadence_increments_coarse_x_at_phase_seven() {
        let mut p = Ppu::new();
        p.dot = 8; // phase (dot-1)&7 == 7
        let before = p.v.coarse_x();
        p.background_fetch_step(None);
        assert_eq!(p.v.coarse_x(), before + 1);
    }
}
