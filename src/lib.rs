#![doc = r#"
famicore library crate.

This crate exposes the emulator core modules for use by frontends and tests.

Modules:
- apu: APU register stub with frame IRQ behavior
- bus: Bus facade coordinating CPU/PPU/APU/controllers, OAM DMA and master-clock timing
- cartridge: iNES / NES 2.0 loader and cartridge metadata; constructs a Mapper
- controller: serial controller abstraction ($4016/$4017) and the standard pad
- cpu: cycle-accurate 6502 core (official + documented unofficial opcodes)
- mapper: mapper kinds (NROM) and nametable mirroring
- palette: emphasis-expanded master palette lookup
- ppu: dot-accurate PPU (background/sprite pipelines, registers, VRAM)
- rom: 16-byte iNES / NES 2.0 header decoder
- screen: host framebuffer boundary (per-pixel put + per-frame swap)

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

// Core emulator modules
pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod mapper;
pub mod palette;
pub mod ppu;
pub mod rom;
pub mod screen;

// Re-export commonly used types at the crate root for convenience.
pub use bus::{Bus, Region};
pub use cartridge::{Cartridge, CartridgeError};
pub use controller::{Button, Controller, StandardController};
pub use cpu::Cpu;
pub use mapper::{Mapper, Mirroring};
pub use palette::{Palette, PaletteError};
pub use ppu::Ppu;
pub use rom::RomHeader;
pub use screen::{FrameBuffer, Screen};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
