/*!
Cycle-accurate 6502 core (NES variant: no decimal ALU mode).

Execution model
- One `tick()` call is one CPU cycle. An instruction performs all of its bus
  accesses on its dispatch cycle, then burns the remaining documented cycles
  as idle ticks, so the cycle totals (including oops cycles and branch
  penalties) match hardware even though micro-timing inside an instruction
  is collapsed.
- Interrupts latch at any time via `latch_interrupt` and dispatch between
  instructions, highest priority first (reset > NMI > IRQ; IRQ is dropped at
  latch time while I is set).
- While `suspended` (OAM DMA), the core only toggles its read/write phase
  indicator; the DMA engine uses that to alternate read and write cycles.
- KIL/JAM opcodes leave the core halted until a reset.

The core owns no bus pointer; each call receives a short-lived `CpuBus`
capability from the owner.
*/

pub mod addressing;
pub mod execute;
pub mod state;
pub mod table;

use state::{CpuState, IRQ_DISABLE};
use table::OPCODES;

/// Memory capability injected into the core for the duration of one call.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Little-endian word read (vectors, indirect pointers).
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Interrupt sources in ascending priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Interrupt {
    Irq,
    Nmi,
    Reset,
}

const RESET_VECTOR: u16 = 0xFFFC;
const NMI_VECTOR: u16 = 0xFFFA;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles consumed by an interrupt sequence (and by BRK).
const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Clone)]
pub struct Cpu {
    pub(crate) state: CpuState,
    cycles_remaining: u32,
    pending: Option<Interrupt>,
    suspended: bool,
    read_phase: bool,
    pub(crate) jammed: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            state: CpuState::new(),
            cycles_remaining: 0,
            pending: None,
            suspended: false,
            read_phase: false,
            jammed: false,
        }
    }

    /// Power-on: registers to their power-up values, PC from the reset
    /// vector.
    pub fn power<B: CpuBus>(&mut self, bus: &mut B) {
        self.state = CpuState::new();
        self.state.pc = bus.read_word(RESET_VECTOR);
        self.cycles_remaining = 0;
        self.pending = None;
        self.suspended = false;
        self.read_phase = false;
        self.jammed = false;
    }

    /// Advance one CPU cycle.
    pub fn tick<B: CpuBus>(&mut self, bus: &mut B) {
        if self.suspended {
            self.read_phase = !self.read_phase;
            return;
        }
        if self.jammed {
            return;
        }
        if self.cycles_remaining > 0 {
            self.cycles_remaining -= 1;
            return;
        }
        if let Some(interrupt) = self.pending.take() {
            self.service(bus, interrupt);
            self.cycles_remaining = INTERRUPT_CYCLES - 1;
            return;
        }

        let opcode = self.fetch_byte(bus);
        let entry = &OPCODES[opcode as usize];
        let resolved = self.resolve(bus, entry.mode);
        let extra = self.exec(bus, entry.op, resolved.operand);

        let mut cycles = u32::from(entry.cycles) + extra;
        if entry.page_penalty && resolved.crossed {
            cycles += 1;
        }
        self.cycles_remaining = cycles - 1;
    }

    /// Latch an interrupt request. Keeps only the highest-priority pending
    /// source; IRQ is dropped while the I flag is set. Latching a reset also
    /// clears a KIL jam.
    pub fn latch_interrupt(&mut self, interrupt: Interrupt) {
        if interrupt == Interrupt::Irq && self.state.get_flag(IRQ_DISABLE) {
            return;
        }
        if interrupt == Interrupt::Reset {
            self.jammed = false;
        }
        self.pending = Some(match self.pending.take() {
            Some(current) if current > interrupt => current,
            _ => interrupt,
        });
    }

    fn service<B: CpuBus>(&mut self, bus: &mut B, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Reset => {
                // A/X/Y survive; the push attempts are suppressed, so only
                // the stack pointer moves.
                self.state.sp = self.state.sp.wrapping_sub(3);
                self.state.set_flag(IRQ_DISABLE, true);
                self.state.pc = bus.read_word(RESET_VECTOR);
            }
            Interrupt::Nmi => {
                let pc = self.state.pc;
                self.push_word(bus, pc);
                let p = self.state.compose_status_for_push(false);
                self.push(bus, p);
                self.state.set_flag(IRQ_DISABLE, true);
                self.state.pc = bus.read_word(NMI_VECTOR);
            }
            Interrupt::Irq => {
                let pc = self.state.pc;
                self.push_word(bus, pc);
                let p = self.state.compose_status_for_push(false);
                self.push(bus, p);
                self.state.set_flag(IRQ_DISABLE, true);
                self.state.pc = bus.read_word(IRQ_VECTOR);
            }
        }
    }

    /// DMA suspension control. A suspended core only toggles its phase bit.
    pub fn set_suspended(&mut self, on: bool) {
        self.suspended = on;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Phase indicator toggled while suspended; even/odd alternation for the
    /// DMA engine's read/write cadence.
    pub fn read_phase(&self) -> bool {
        self.read_phase
    }

    /// True once a KIL opcode has executed. Only a reset recovers the core.
    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    /// True while the current instruction (or interrupt sequence) is still
    /// burning cycles.
    pub fn mid_instruction(&self) -> bool {
        self.cycles_remaining > 0
    }

    // Register accessors for integration code and tests.
    pub fn a(&self) -> u8 {
        self.state.a
    }
    pub fn x(&self) -> u8 {
        self.state.x
    }
    pub fn y(&self) -> u8 {
        self.state.y
    }
    pub fn sp(&self) -> u8 {
        self.state.sp
    }
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    pub fn status(&self) -> u8 {
        self.state.status
    }
    pub fn set_pc(&mut self, pc: u16) {
        self.state.pc = pc;
    }
}
