//! Shared test utilities for building minimal iNES / NES 2.0 images.
//!
//! These helpers de-duplicate container construction across the CPU, PPU,
//! Bus, cartridge and header tests. They intentionally support just what the
//! suite needs (NROM, simple flags, vector patching).
//!
//! Vector layout:
//! - 16 KiB PRG (NROM-128): vectors live at PRG offset 0x3FFA..=0x3FFF
//! - 32 KiB PRG (NROM-256): vectors live at PRG offset 0x7FFA..=0x7FFF

#![allow(dead_code)]

/// Build a bare 16-byte iNES header.
pub fn build_ines_header(prg_16k: u8, chr_8k: u8, flags6: u8, flags7: u8) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..4].copy_from_slice(b"NES\x1A");
    bytes[4] = prg_16k;
    bytes[5] = chr_8k;
    bytes[6] = flags6;
    bytes[7] = flags7;
    bytes
}

/// Build a bare 16-byte NES 2.0 header (flags 7 identifier bits set).
pub fn build_nes2_header(prg_low: u8, chr_low: u8) -> [u8; 16] {
    let mut bytes = build_ines_header(prg_low, chr_low, 0, 0);
    bytes[7] |= 0x08;
    bytes
}

/// Build a complete iNES (v1) image with configurable PRG/CHR sizes and
/// flags. PRG bytes are filled with 0xAA, CHR bytes with 0xCC.
///
/// - `prg_16k`: number of 16 KiB PRG units
/// - `chr_8k`: number of 8 KiB CHR units (0 => loader allocates CHR RAM)
/// - `flags6`/`flags7`: header flags (mirroring, battery, trainer, mapper)
/// - `prg_ram_8k`: PRG RAM size in 8 KiB units (0 => 8 KiB by convention)
/// - `trainer`: optional 512-byte trainer inserted after the header
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }

    bytes.extend(std::iter::repeat(0xAA).take(prg_16k * 16 * 1024));
    bytes.extend(std::iter::repeat(0xCC).take(chr_8k * 8 * 1024));

    bytes
}

/// Build a simple NROM image that injects a caller-provided program (up to
/// 16 KiB) at the start of a single PRG bank and patches the vectors.
///
/// - `prg`: program bytes placed at $8000
/// - `chr_8k`: number of 8 KiB CHR units (0 => CHR RAM)
/// - `prg_ram_8k`: PRG RAM size in 8 KiB units
/// - `vectors`: optional (reset, nmi, irq); defaults to $8000 for all three
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(
        prg.len() <= 16 * 1024,
        "program must fit within a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);

    let prg_start = 16;
    let prg_end = prg_start + 16 * 1024;
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);
    // Clear the remainder of the bank so stray 0xAA fill does not execute.
    rom[prg_start + prg.len()..prg_end].fill(0xEA);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_end], reset, nmi, irq);

    rom
}

/// Write the NMI/RESET/IRQ vectors into a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!("unsupported PRG length for vector placement: {other} bytes"),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0x00FF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom[8], 1);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_16k_prg() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(prg[0x3FFA], 0x56);
        assert_eq!(prg[0x3FFB], 0x84);
        assert_eq!(prg[0x3FFC], 0x23);
        assert_eq!(prg[0x3FFD], 0x81);
        assert_eq!(prg[0x3FFE], 0xBC);
        assert_eq!(prg[0x3FFF], 0x8A);
    }

    #[test]
    fn builds_nrom_with_prg_and_vectors() {
        let prg = [0xA9, 0x01, 0x00]; // LDA #$01; BRK
        let rom = build_nrom_with_prg(&prg, 1, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 1);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[16], 0xA9);
        // RESET vector low byte at PRG offset 0x3FFC.
        assert_eq!(rom[16 + 0x3FFC], 0x00);
        assert_eq!(rom[16 + 0x3FFD], 0x80);
    }
}
