/*!
Master palette lookup with colour-emphasis support.

The table holds 1536 bytes: 8 emphasis combinations x 64 entries x 3 RGB
bytes. `set_emphasis` selects the active 192-byte plane from the PPUMASK
emphasis bits; `rgb` reads the triple for a 6-bit palette entry out of that
plane.

Palette files come in two raw formats (see the `.pal` convention):
- 192 bytes: one 64-entry plane, replicated across all 8 emphasis planes.
- 1536 bytes: all emphasis planes precomputed.
*/

use thiserror::Error;

const ENTRIES: usize = 64;
const PLANE_LEN: usize = ENTRIES * 3;
const FULL_LEN: usize = PLANE_LEN * 8;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("palette data must be {PLANE_LEN} or {FULL_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

#[derive(Clone, Debug)]
pub struct Palette {
    data: Vec<u8>,
    emphasis: u16,
}

impl Default for Palette {
    fn default() -> Self {
        // Built-in approximation of the NTSC master palette, replicated
        // across the emphasis planes.
        let plane = base_table();
        let mut data = Vec::with_capacity(FULL_LEN);
        for _ in 0..8 {
            data.extend_from_slice(&plane);
        }
        Self { data, emphasis: 0 }
    }
}

impl Palette {
    /// Build a palette from a 192-byte or 1536-byte raw RGB dump.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PaletteError> {
        let data = match bytes.len() {
            PLANE_LEN => {
                let mut full = Vec::with_capacity(FULL_LEN);
                for _ in 0..8 {
                    full.extend_from_slice(bytes);
                }
                full
            }
            FULL_LEN => bytes.to_vec(),
            n => return Err(PaletteError::InvalidLength(n)),
        };
        Ok(Self { data, emphasis: 0 })
    }

    /// Select the emphasis plane from the PPUMASK emphasis bits.
    pub fn set_emphasis(&mut self, red: bool, green: bool, blue: bool) {
        self.set_emphasis_index((u16::from(blue) << 2) | (u16::from(green) << 1) | u16::from(red));
    }

    /// Select the emphasis plane directly (0..=7).
    pub fn set_emphasis_index(&mut self, index: u16) {
        self.emphasis = index & 0x07;
    }

    /// RGB triple for a 6-bit palette entry under the active emphasis.
    #[inline]
    pub fn rgb(&self, entry: u8) -> (u8, u8, u8) {
        let base = (usize::from(entry) * 3 + usize::from(self.emphasis) * PLANE_LEN) % self.data.len();
        (
            self.data[base],
            self.data[(base + 1) % self.data.len()],
            self.data[(base + 2) % self.data.len()],
        )
    }
}

/// Canonical (approximate) 64-entry NES palette as a 192-byte plane.
fn base_table() -> [u8; PLANE_LEN] {
    const BASE: [[u8; 3]; ENTRIES] = [
        [0x75, 0x75, 0x75],
        [0x27, 0x1B, 0x8F],
        [0x00, 0x00, 0xAB],
        [0x47, 0x00, 0x9F],
        [0x8F, 0x00, 0x77],
        [0xAB, 0x00, 0x13],
        [0xA7, 0x00, 0x00],
        [0x7F, 0x0B, 0x00],
        [0x43, 0x2F, 0x00],
        [0x00, 0x47, 0x00],
        [0x00, 0x51, 0x00],
        [0x00, 0x3F, 0x17],
        [0x1B, 0x3F, 0x5F],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0xBC, 0xBC, 0xBC],
        [0x00, 0x73, 0xEF],
        [0x23, 0x3B, 0xEF],
        [0x83, 0x00, 0xF3],
        [0xBF, 0x00, 0xBF],
        [0xE7, 0x00, 0x5B],
        [0xDB, 0x2B, 0x00],
        [0xCB, 0x4F, 0x0F],
        [0x8B, 0x73, 0x00],
        [0x00, 0x97, 0x00],
        [0x00, 0xAB, 0x00],
        [0x00, 0x93, 0x3B],
        [0x00, 0x83, 0x8B],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0xFF, 0xFF, 0xFF],
        [0x3F, 0xBF, 0xFF],
        [0x5F, 0x97, 0xFF],
        [0xA7, 0x8B, 0xFD],
        [0xF7, 0x7B, 0xFF],
        [0xFF, 0x77, 0xB7],
        [0xFF, 0x77, 0x63],
        [0xFF, 0x9B, 0x3B],
        [0xF3, 0xBF, 0x3F],
        [0x83, 0xD3, 0x13],
        [0x4F, 0xDF, 0x4B],
        [0x58, 0xF8, 0x98],
        [0x00, 0xEB, 0xDB],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0xFF, 0xFF, 0xFF],
        [0xAB, 0xE7, 0xFF],
        [0xC7, 0xD7, 0xFF],
        [0xD7, 0xCB, 0xFF],
        [0xFF, 0xC7, 0xFF],
        [0xFF, 0xC7, 0xDB],
        [0xFF, 0xBF, 0xB3],
        [0xFF, 0xDB, 0xAB],
        [0xFF, 0xE7, 0xA3],
        [0xE3, 0xFF, 0xA3],
        [0xAB, 0xF3, 0xBF],
        [0xB3, 0xFF, 0xCF],
        [0x9F, 0xFF, 0xF3],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
        [0x00, 0x00, 0x00],
    ];
    let mut out = [0u8; PLANE_LEN];
    for (i, rgb) in BASE.iter().enumerate() {
        out[i * 3..i * 3 + 3].copy_from_slice(rgb);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_replicated_for_short_files() {
        let mut plane = vec![0u8; PLANE_LEN];
        plane[0] = 0x12;
        plane[1] = 0x34;
        plane[2] = 0x56;
        let mut p = Palette::from_bytes(&plane).unwrap();
        assert_eq!(p.rgb(0), (0x12, 0x34, 0x56));

        // Any emphasis selects the same replicated plane.
        p.set_emphasis(true, true, false);
        assert_eq!(p.rgb(0), (0x12, 0x34, 0x56));
    }

    #[test]
    fn emphasis_selects_plane() {
        let mut full = vec![0u8; FULL_LEN];
        // Entry 5 of plane 0 and plane 3 (emphasis r+g).
        full[5 * 3] = 0x11;
        full[3 * PLANE_LEN + 5 * 3] = 0x99;
        let mut p = Palette::from_bytes(&full).unwrap();
        assert_eq!(p.rgb(5).0, 0x11);
        p.set_emphasis(true, true, false);
        assert_eq!(p.rgb(5).0, 0x99);
        p.set_emphasis(false, false, false);
        assert_eq!(p.rgb(5).0, 0x11);
    }

    #[test]
    fn bad_length_is_rejected() {
        assert!(matches!(
            Palette::from_bytes(&[0u8; 100]),
            Err(PaletteError::InvalidLength(100))
        ));
    }

    #[test]
    fn entry_index_wraps_within_table() {
        let p = Palette::default();
        // 6-bit entries above 63 cannot occur, but the lookup is total for
        // any u8 input.
        let _ = p.rgb(0xFF);
    }
}
