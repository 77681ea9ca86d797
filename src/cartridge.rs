/*!
Cartridge loader: validates an iNES / NES 2.0 container and constructs the
mapper that owns its PRG/CHR memory.

Features
- Parse the 16-byte header via `rom::RomHeader` (both container kinds).
- Extract PRG ROM, CHR (ROM, or allocate CHR RAM when the container ships
  none), skip an optional 512-byte trainer, and size PRG RAM.
- Refuse images this core cannot run: bad magic, truncated payloads,
  exponent-form ROM sizes, non-NES console types, unsupported timing,
  mappers other than NROM.

PRG RAM sizing
- NES 2.0 headers state the size directly (`64 << shift`).
- iNES headers are unreliable here; byte 8 counts 8 KiB units and 0 is
  conventionally read as one 8 KiB bank.
*/

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::mapper::{Mapper, Mirroring, Nrom};
use crate::rom::{ConsoleType, HeaderKind, NametableLayout, RomHeader, Timing, HEADER_LEN};

const TRAINER_LEN: usize = 512;
const CHR_RAM_DEFAULT: usize = 8 * 1024;

/// Reasons a container is refused at load time. Nothing inside the tick loop
/// ever produces one of these.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("not an iNES or NES 2.0 image (bad magic)")]
    InvalidMagic,
    #[error("container truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("exponent-form ROM sizes are not supported")]
    ExponentRomSize,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
    #[error("unsupported console type")]
    UnsupportedConsole,
    #[error("unsupported region timing")]
    UnsupportedTiming,
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed cartridge: the mapper plus the header metadata the rest of the
/// system needs.
#[derive(Debug)]
pub struct Cartridge {
    pub(crate) mapper: Mapper,

    mapper_id: u16,
    submapper: u8,
    mirroring: Mirroring,
    timing: Timing,
    battery: bool,
    has_trainer: bool,

    prg_rom_len: usize,
    chr_len: usize,
    prg_ram_len: usize,
    chr_is_ram: bool,
}

impl Cartridge {
    /// Load a cartridge from raw container bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = RomHeader::from_prefix(data).ok_or(CartridgeError::Truncated {
            expected: HEADER_LEN,
            actual: data.len(),
        })?;
        if header.kind() == HeaderKind::Unsupported {
            return Err(CartridgeError::InvalidMagic);
        }
        if header.console_type() != ConsoleType::Nes {
            return Err(CartridgeError::UnsupportedConsole);
        }
        let timing = header.timing();
        if timing == Timing::Unsupported {
            return Err(CartridgeError::UnsupportedTiming);
        }

        let mapper_id = header.mapper();
        if mapper_id != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_id));
        }

        if header.kind() == HeaderKind::Nes2 {
            let byte9 = data[9];
            if byte9 & 0x0F == 0x0F || byte9 >> 4 == 0x0F {
                return Err(CartridgeError::ExponentRomSize);
            }
        }
        let prg_rom_len = header.prg_rom_size();
        if prg_rom_len == 0 {
            return Err(CartridgeError::Truncated {
                expected: HEADER_LEN + 16 * 1024,
                actual: data.len(),
            });
        }
        let chr_rom_len = header.chr_rom_size();

        let mut offset = HEADER_LEN;
        if header.has_trainer() {
            offset += TRAINER_LEN;
        }

        let prg_end = offset + prg_rom_len;
        let chr_end = prg_end + chr_rom_len;
        if data.len() < chr_end {
            return Err(CartridgeError::Truncated {
                expected: chr_end,
                actual: data.len(),
            });
        }
        let prg_rom = data[offset..prg_end].to_vec();

        // CHR: ROM from the file, or RAM sized by the header (NES 2.0) or by
        // the 8 KiB convention (iNES).
        let (chr, chr_is_ram) = if chr_rom_len > 0 {
            (data[prg_end..chr_end].to_vec(), false)
        } else {
            let size = match header.chr_ram_size() {
                0 => CHR_RAM_DEFAULT,
                n => n,
            };
            (vec![0; size], true)
        };

        let prg_ram_len = match header.kind() {
            HeaderKind::Nes2 => header.prg_ram_size() + header.prg_nvram_size(),
            _ => {
                let units = data.get(8).copied().unwrap_or(0) as usize;
                if units == 0 {
                    8 * 1024
                } else {
                    units * 8 * 1024
                }
            }
        };

        let mirroring = match header.nametable_layout() {
            NametableLayout::Horizontal => Mirroring::Horizontal,
            NametableLayout::Vertical => Mirroring::Vertical,
            NametableLayout::FourScreen => Mirroring::FourScreen,
        };

        let chr_len = chr.len();
        let mut mapper = Mapper::Nrom(Nrom::new(prg_rom, chr, chr_is_ram, prg_ram_len, mirroring));

        // A trainer loads into $7000-$71FF of PRG RAM.
        if header.has_trainer() {
            let trainer = &data[HEADER_LEN..HEADER_LEN + TRAINER_LEN];
            for (i, &b) in trainer.iter().enumerate() {
                mapper.cpu_write(0x7000 + i as u16, b);
            }
        }

        Ok(Self {
            mapper,
            mapper_id,
            submapper: header.submapper(),
            mirroring,
            timing,
            battery: header.has_battery(),
            has_trainer: header.has_trainer(),
            prg_rom_len,
            chr_len,
            prg_ram_len,
            chr_is_ram,
        })
    }

    /// Load a cartridge from a `.nes` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    pub fn mapper_id(&self) -> u16 {
        self.mapper_id
    }

    pub fn submapper(&self) -> u8 {
        self.submapper
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn battery_backed(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom_len
    }

    pub fn chr_len(&self) -> usize {
        self.chr_len
    }

    pub fn prg_ram_len(&self) -> usize {
        self.prg_ram_len
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_ines;

    #[test]
    fn parse_simple_nrom_32k_chr8k() {
        let flags6 = 0b0000_0001; // vertical mirroring
        let data = build_ines(2, 1, flags6, 0, 1, None);
        let cart = Cartridge::from_bytes(&data).expect("parse");

        assert_eq!(cart.mapper_id(), 0);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert_eq!(cart.prg_rom_len(), 32 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(!cart.chr_is_ram());
        assert_eq!(cart.timing(), Timing::Ntsc);

        assert_eq!(cart.mapper().cpu_read(0x8000), 0xAA);
        assert_eq!(cart.mapper().cpu_read(0xFFFF), 0xAA);
    }

    #[test]
    fn parse_nrom_16k_allocates_chr_ram() {
        let data = build_ines(1, 0, 0, 0, 0, None);
        let cart = Cartridge::from_bytes(&data).expect("parse");

        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        assert_eq!(cart.prg_rom_len(), 16 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(cart.chr_is_ram());
        // PRG RAM allocated by the 8 KiB convention.
        assert_eq!(cart.prg_ram_len(), 8 * 1024);

        // NROM-128 mirrors the single PRG bank.
        let m = cart.mapper();
        assert_eq!(m.cpu_read(0x8000), m.cpu_read(0xC000));
    }

    #[test]
    fn trainer_moves_payload_offset() {
        let mut trainer = [0u8; 512];
        for (i, b) in trainer.iter_mut().enumerate() {
            *b = (i & 0xFF) as u8;
        }
        let flags6 = 0b0000_0100;
        let data = build_ines(1, 1, flags6, 0, 1, Some(&trainer));
        let cart = Cartridge::from_bytes(&data).expect("parse");
        assert!(cart.has_trainer());
        // PRG payload still reads as the builder's fill byte.
        assert_eq!(cart.mapper().cpu_read(0x8000), 0xAA);
        // Trainer bytes landed at $7000-$71FF of PRG RAM.
        assert_eq!(cart.mapper().cpu_read(0x7000), 0x00);
        assert_eq!(cart.mapper().cpu_read(0x7001), 0x01);
        assert_eq!(cart.mapper().cpu_read(0x71FF), 0xFF);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut data = build_ines(1, 1, 0, 0, 1, None);
        data[0] = b'X';
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::InvalidMagic)
        ));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let data = build_ines(2, 1, 0, 0, 1, None);
        let err = Cartridge::from_bytes(&data[..data.len() - 1]).unwrap_err();
        assert!(matches!(err, CartridgeError::Truncated { .. }));
    }

    #[test]
    fn nonzero_mapper_is_rejected() {
        // Mapper 3 via flags6 high nibble.
        let data = build_ines(1, 1, 0x30, 0, 1, None);
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::UnsupportedMapper(3))
        ));
    }

    #[test]
    fn vs_system_is_rejected() {
        let data = build_ines(1, 1, 0, 0x01, 1, None);
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::UnsupportedConsole)
        ));
    }
}
