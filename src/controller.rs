/*!
Controller abstraction for NES-style serial input via $4016/$4017.

Protocol
- While the CPU holds the $4016 strobe high the shift register keeps
  reloading from the live button state; the Bus models this by calling
  `reload()` on every $4016 write.
- Once the strobe drops, each read of $4016 (or $4017 for the second pad)
  clocks out one bit of the latched snapshot, most significant bit first.
  After eight reads the line reports 1.

Buttons are packed A|B|Select|Start|Up|Down|Left|Right with A at bit 0.

The live button state lives in a single `AtomicU8` so a host input thread
can flip buttons while the emulation thread is inside `tick()`; the latched
snapshot taken on reload is the only value the serial protocol ever shifts.
*/

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Standard pad buttons. The discriminant picks the bit in the state byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    #[inline]
    fn mask(self) -> u8 {
        match self {
            Button::A => 1 << 0,
            Button::B => 1 << 1,
            Button::Select => 1 << 2,
            Button::Start => 1 << 3,
            Button::Up => 1 << 4,
            Button::Down => 1 << 5,
            Button::Left => 1 << 6,
            Button::Right => 1 << 7,
        }
    }
}

/// Bus-facing side of an input device: a serially-read shift register that
/// can be told to latch the live state.
pub trait Controller {
    /// Clock out the next bit (0 or 1 in bit 0).
    fn read(&mut self) -> u8;

    /// Copy the live input state into the shift buffer.
    fn reload(&mut self);
}

/// Host-side handle to a standard controller's live state. Cloneable and
/// thread-safe; updates are single atomic byte stores.
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    state: Arc<AtomicU8>,
}

impl ControllerHandle {
    pub fn set_button(&self, button: Button, pressed: bool) {
        let mask = button.mask();
        if pressed {
            self.state.fetch_or(mask, Ordering::Relaxed);
        } else {
            self.state.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    /// Replace the entire button state with the provided mask.
    pub fn set_state_mask(&self, mask: u8) {
        self.state.store(mask, Ordering::Relaxed);
    }

    pub fn state_mask(&self) -> u8 {
        self.state.load(Ordering::Relaxed)
    }
}

/// The standard NES pad: an 8-bit state latched into a shift buffer and
/// clocked out MSB-first.
#[derive(Debug)]
pub struct StandardController {
    state: Arc<AtomicU8>,
    buffer: u8,
    remaining: u8,
}

impl Default for StandardController {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardController {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(0)),
            buffer: 0,
            remaining: 0,
        }
    }

    /// Host-side handle for updating the live button state.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Convenience for hosts that own the device directly.
    pub fn set_button(&self, button: Button, pressed: bool) {
        self.handle().set_button(button, pressed);
    }
}

impl Controller for StandardController {
    fn read(&mut self) -> u8 {
        if self.remaining == 0 {
            return 0x01;
        }
        let bit = (self.buffer & 0x80) >> 7;
        self.buffer <<= 1;
        self.remaining -= 1;
        bit
    }

    fn reload(&mut self) {
        self.buffer = self.state.load(Ordering::Relaxed);
        self.remaining = 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_shift_msb_first() {
        let mut pad = StandardController::new();
        // Press Right (bit 7) and A (bit 0).
        pad.set_button(Button::Right, true);
        pad.set_button(Button::A, true);
        pad.reload();

        // MSB-first: Right comes out on the first read, A on the last.
        let expected = [1, 0, 0, 0, 0, 0, 0, 1];
        for &e in &expected {
            assert_eq!(pad.read(), e);
        }

        // Exhausted register reports 1.
        assert_eq!(pad.read(), 1);
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn reload_resnapshots_live_state() {
        let mut pad = StandardController::new();
        let handle = pad.handle();

        handle.set_button(Button::Start, true);
        pad.reload();
        // Changing live state after the latch does not affect the buffer.
        handle.set_button(Button::Start, false);

        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits[4], 1); // Start is bit 3, read 5th from the top

        pad.reload();
        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits, vec![0; 8]);
    }

    #[test]
    fn handle_mask_updates() {
        let pad = StandardController::new();
        let handle = pad.handle();
        handle.set_state_mask(0xC3);
        assert_eq!(handle.state_mask(), 0xC3);
        handle.set_button(Button::B, false);
        assert_eq!(handle.state_mask(), 0xC1);
    }
}
