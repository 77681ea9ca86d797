/*!
ROM container header decoder (iNES and NES 2.0).

Purpose
- Wrap the 16-byte header at the front of a `.nes` image and expose typed
  accessors for everything the cartridge factory needs: container kind,
  mapper/submapper numbers, PRG/CHR ROM sizes, (NV)RAM sizes, nametable
  layout, console type, region timing, trainer/battery bits and the default
  expansion device.

Decoding rules
- Magic must be `4E 45 53 1A` ("NES<EOF>"); anything else is Unsupported and
  every size accessor returns 0.
- Header byte 7 bits 2-3 == 0b10 marks NES 2.0; otherwise the header is
  treated as archaic/standard iNES.
- iNES sizes: PRG = byte 4 * 16 KiB, CHR = byte 5 * 8 KiB, RAM sizes 0.
- NES 2.0 sizes: 12-bit block counts (byte 9 nibbles supply the high bits).
  The exponent form (high nibble == $F) is not supported and reads as 0 so
  loaders reject such images. RAM sizes use the `64 << shift` rule with
  shift 0 meaning "not present".

References: https://www.nesdev.org/wiki/INES and
https://www.nesdev.org/wiki/NES_2.0
*/

/// Container format of a 16-byte ROM header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    Ines,
    Nes2,
    Unsupported,
}

/// Hardwired nametable arrangement declared by the header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NametableLayout {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Console family a ROM targets. Vs. System, PlayChoice and the extended
/// console types are recognized but not emulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConsoleType {
    Nes,
    Unsupported,
}

/// Region timing requested by the header. Multi-region images collapse to
/// NTSC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timing {
    Ntsc,
    Pal,
    Dendy,
    Unsupported,
}

/// Default expansion (input) device requested by a NES 2.0 header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExpansionDevice {
    Unspecified,
    Standard,
    Unsupported,
}

/// The first 16 bytes of an iNES / NES 2.0 image.
#[derive(Copy, Clone, Debug)]
pub struct RomHeader {
    bytes: [u8; 16],
}

pub const HEADER_LEN: usize = 16;
const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

impl RomHeader {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Copy the header out of a larger image. Returns `None` when fewer than
    /// 16 bytes are available.
    pub fn from_prefix(data: &[u8]) -> Option<Self> {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(data.get(..HEADER_LEN)?);
        Some(Self::new(bytes))
    }

    pub fn kind(&self) -> HeaderKind {
        if self.bytes[..4] != MAGIC {
            return HeaderKind::Unsupported;
        }
        if self.bytes[7] & 0x0C == 0x08 {
            HeaderKind::Nes2
        } else {
            HeaderKind::Ines
        }
    }

    /// Mapper number: two nibbles from flags 6/7, plus four more bits from
    /// byte 8 for NES 2.0 (12-bit space).
    pub fn mapper(&self) -> u16 {
        match self.kind() {
            HeaderKind::Unsupported => 0,
            HeaderKind::Ines => u16::from(self.bytes[7] & 0xF0) | u16::from(self.bytes[6] >> 4),
            HeaderKind::Nes2 => {
                (u16::from(self.bytes[8] & 0x0F) << 8)
                    | u16::from(self.bytes[7] & 0xF0)
                    | u16::from(self.bytes[6] >> 4)
            }
        }
    }

    /// Submapper number (NES 2.0 only; 0 otherwise).
    pub fn submapper(&self) -> u8 {
        match self.kind() {
            HeaderKind::Nes2 => self.bytes[8] >> 4,
            _ => 0,
        }
    }

    /// PRG ROM size in bytes. 0 for unsupported headers and for the NES 2.0
    /// exponent size form.
    pub fn prg_rom_size(&self) -> usize {
        match self.kind() {
            HeaderKind::Unsupported => 0,
            HeaderKind::Ines => usize::from(self.bytes[4]) * 16 * 1024,
            HeaderKind::Nes2 => {
                let high = usize::from(self.bytes[9] & 0x0F);
                if high == 0x0F {
                    return 0; // exponent form unsupported
                }
                ((high << 8) | usize::from(self.bytes[4])) * 16 * 1024
            }
        }
    }

    /// CHR ROM size in bytes. Same rules as [`Self::prg_rom_size`].
    pub fn chr_rom_size(&self) -> usize {
        match self.kind() {
            HeaderKind::Unsupported => 0,
            HeaderKind::Ines => usize::from(self.bytes[5]) * 8 * 1024,
            HeaderKind::Nes2 => {
                let high = usize::from(self.bytes[9] >> 4);
                if high == 0x0F {
                    return 0; // exponent form unsupported
                }
                ((high << 8) | usize::from(self.bytes[5])) * 8 * 1024
            }
        }
    }

    pub fn prg_ram_size(&self) -> usize {
        self.nes2_shift_size(self.bytes[10] & 0x0F)
    }

    pub fn prg_nvram_size(&self) -> usize {
        self.nes2_shift_size(self.bytes[10] >> 4)
    }

    pub fn chr_ram_size(&self) -> usize {
        self.nes2_shift_size(self.bytes[11] & 0x0F)
    }

    pub fn chr_nvram_size(&self) -> usize {
        self.nes2_shift_size(self.bytes[11] >> 4)
    }

    // NES 2.0 RAM size rule: shift of 0 means absent, otherwise 64 << shift.
    // iNES headers carry no reliable RAM sizing, so report 0.
    fn nes2_shift_size(&self, shift: u8) -> usize {
        match self.kind() {
            HeaderKind::Nes2 if shift > 0 => 64usize << shift,
            _ => 0,
        }
    }

    /// Nametable layout. The four-screen bit wins; otherwise flags-6 bit 0
    /// selects vertical mirroring when set, horizontal when clear.
    pub fn nametable_layout(&self) -> NametableLayout {
        if self.bytes[6] & 0x08 != 0 {
            NametableLayout::FourScreen
        } else if self.bytes[6] & 0x01 != 0 {
            NametableLayout::Vertical
        } else {
            NametableLayout::Horizontal
        }
    }

    pub fn console_type(&self) -> ConsoleType {
        match self.kind() {
            HeaderKind::Unsupported => ConsoleType::Unsupported,
            // iNES flags 7 bits 0-1 / NES 2.0 console type field: only the
            // plain NES/Famicom is supported.
            _ => {
                if self.bytes[7] & 0x03 == 0 {
                    ConsoleType::Nes
                } else {
                    ConsoleType::Unsupported
                }
            }
        }
    }

    pub fn timing(&self) -> Timing {
        match self.kind() {
            HeaderKind::Unsupported => Timing::Unsupported,
            HeaderKind::Ines => {
                if self.bytes[9] & 0x01 != 0 {
                    Timing::Pal
                } else {
                    Timing::Ntsc
                }
            }
            HeaderKind::Nes2 => match self.bytes[12] & 0x03 {
                0 => Timing::Ntsc,
                1 => Timing::Pal,
                2 => Timing::Dendy,
                // Multi-region images are forced to NTSC timing.
                _ => Timing::Ntsc,
            },
        }
    }

    pub fn has_trainer(&self) -> bool {
        self.kind() != HeaderKind::Unsupported && self.bytes[6] & 0x04 != 0
    }

    pub fn has_battery(&self) -> bool {
        self.kind() != HeaderKind::Unsupported && self.bytes[6] & 0x02 != 0
    }

    pub fn expansion_device(&self) -> ExpansionDevice {
        match self.kind() {
            HeaderKind::Unsupported => ExpansionDevice::Unsupported,
            HeaderKind::Ines => ExpansionDevice::Unspecified,
            HeaderKind::Nes2 => match self.bytes[15] & 0x3F {
                0x00 => ExpansionDevice::Unspecified,
                0x01 => ExpansionDevice::Standard,
                _ => ExpansionDevice::Unsupported,
            },
        }
    }
}
