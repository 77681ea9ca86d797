/*!
The 256-entry opcode table.

Each entry carries the addressing mode, the operation and the base cycle
count; both the mode and the operation are resolved with exhaustive `match`
in the dispatcher, so lookups stay static with no indirect calls.

Cycle accounting:
- `page_penalty` marks read-type indexed opcodes that pay one extra cycle
  when the effective address crosses a page.
- Branches add their own +1 taken / +2 taken-across-pages on top of the base
  count.
- RMW and store opcodes carry fixed counts; they never take the oops cycle.

Every opcode not explicitly listed is a KIL/JAM slot ($02, $12, $22, $32,
$42, $52, $62, $72, $92, $B2, $D2, $F2) and halts the CPU.
*/

use crate::cpu::addressing::AddrMode;

/// Operation selector, covering the 56 official mnemonics, the documented
/// unofficial opcodes, the unstable ones (stubbed), and KIL.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    // Official
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Documented unofficial
    Lax,
    Sax,
    Dcp,
    Isc,
    Slo,
    Rla,
    Sre,
    Rra,
    Alr,
    Anc,
    Arr,
    Axs,
    // Unstable (stubbed as NOPs of the documented shape)
    Ahx,
    Shx,
    Shy,
    Tas,
    Xaa,
    Las,
    // Halt
    Kil,
}

#[derive(Copy, Clone, Debug)]
pub struct OpInfo {
    pub mode: AddrMode,
    pub op: Op,
    pub cycles: u8,
    pub page_penalty: bool,
}

impl OpInfo {
    const fn new(mode: AddrMode, op: Op, cycles: u8) -> Self {
        Self {
            mode,
            op,
            cycles,
            page_penalty: false,
        }
    }

    // Read-type indexed entry: +1 cycle on page cross.
    const fn pc(mode: AddrMode, op: Op, cycles: u8) -> Self {
        Self {
            mode,
            op,
            cycles,
            page_penalty: true,
        }
    }
}

pub static OPCODES: [OpInfo; 256] = {
    use AddrMode::*;
    use Op::*;

    // Unlisted slots are the twelve KIL opcodes.
    let mut t = [OpInfo::new(Implied, Kil, 2); 256];

    // ---- Official opcodes ----

    // ADC
    t[0x69] = OpInfo::new(Immediate, Adc, 2);
    t[0x65] = OpInfo::new(ZeroPage, Adc, 3);
    t[0x75] = OpInfo::new(ZeroPageX, Adc, 4);
    t[0x6D] = OpInfo::new(Absolute, Adc, 4);
    t[0x7D] = OpInfo::pc(AbsoluteX, Adc, 4);
    t[0x79] = OpInfo::pc(AbsoluteY, Adc, 4);
    t[0x61] = OpInfo::new(IndirectX, Adc, 6);
    t[0x71] = OpInfo::pc(IndirectY, Adc, 5);

    // AND
    t[0x29] = OpInfo::new(Immediate, And, 2);
    t[0x25] = OpInfo::new(ZeroPage, And, 3);
    t[0x35] = OpInfo::new(ZeroPageX, And, 4);
    t[0x2D] = OpInfo::new(Absolute, And, 4);
    t[0x3D] = OpInfo::pc(AbsoluteX, And, 4);
    t[0x39] = OpInfo::pc(AbsoluteY, And, 4);
    t[0x21] = OpInfo::new(IndirectX, And, 6);
    t[0x31] = OpInfo::pc(IndirectY, And, 5);

    // ASL
    t[0x0A] = OpInfo::new(Accumulator, Asl, 2);
    t[0x06] = OpInfo::new(ZeroPage, Asl, 5);
    t[0x16] = OpInfo::new(ZeroPageX, Asl, 6);
    t[0x0E] = OpInfo::new(Absolute, Asl, 6);
    t[0x1E] = OpInfo::new(AbsoluteX, Asl, 7);

    // Branches
    t[0x90] = OpInfo::new(Relative, Bcc, 2);
    t[0xB0] = OpInfo::new(Relative, Bcs, 2);
    t[0xF0] = OpInfo::new(Relative, Beq, 2);
    t[0x30] = OpInfo::new(Relative, Bmi, 2);
    t[0xD0] = OpInfo::new(Relative, Bne, 2);
    t[0x10] = OpInfo::new(Relative, Bpl, 2);
    t[0x50] = OpInfo::new(Relative, Bvc, 2);
    t[0x70] = OpInfo::new(Relative, Bvs, 2);

    // BIT
    t[0x24] = OpInfo::new(ZeroPage, Bit, 3);
    t[0x2C] = OpInfo::new(Absolute, Bit, 4);

    // BRK
    t[0x00] = OpInfo::new(Implied, Brk, 7);

    // Flag clears/sets
    t[0x18] = OpInfo::new(Implied, Clc, 2);
    t[0xD8] = OpInfo::new(Implied, Cld, 2);
    t[0x58] = OpInfo::new(Implied, Cli, 2);
    t[0xB8] = OpInfo::new(Implied, Clv, 2);
    t[0x38] = OpInfo::new(Implied, Sec, 2);
    t[0xF8] = OpInfo::new(Implied, Sed, 2);
    t[0x78] = OpInfo::new(Implied, Sei, 2);

    // CMP / CPX / CPY
    t[0xC9] = OpInfo::new(Immediate, Cmp, 2);
    t[0xC5] = OpInfo::new(ZeroPage, Cmp, 3);
    t[0xD5] = OpInfo::new(ZeroPageX, Cmp, 4);
    t[0xCD] = OpInfo::new(Absolute, Cmp, 4);
    t[0xDD] = OpInfo::pc(AbsoluteX, Cmp, 4);
    t[0xD9] = OpInfo::pc(AbsoluteY, Cmp, 4);
    t[0xC1] = OpInfo::new(IndirectX, Cmp, 6);
    t[0xD1] = OpInfo::pc(IndirectY, Cmp, 5);
    t[0xE0] = OpInfo::new(Immediate, Cpx, 2);
    t[0xE4] = OpInfo::new(ZeroPage, Cpx, 3);
    t[0xEC] = OpInfo::new(Absolute, Cpx, 4);
    t[0xC0] = OpInfo::new(Immediate, Cpy, 2);
    t[0xC4] = OpInfo::new(ZeroPage, Cpy, 3);
    t[0xCC] = OpInfo::new(Absolute, Cpy, 4);

    // DEC / DEX / DEY
    t[0xC6] = OpInfo::new(ZeroPage, Dec, 5);
    t[0xD6] = OpInfo::new(ZeroPageX, Dec, 6);
    t[0xCE] = OpInfo::new(Absolute, Dec, 6);
    t[0xDE] = OpInfo::new(AbsoluteX, Dec, 7);
    t[0xCA] = OpInfo::new(Implied, Dex, 2);
    t[0x88] = OpInfo::new(Implied, Dey, 2);

    // EOR
    t[0x49] = OpInfo::new(Immediate, Eor, 2);
    t[0x45] = OpInfo::new(ZeroPage, Eor, 3);
    t[0x55] = OpInfo::new(ZeroPageX, Eor, 4);
    t[0x4D] = OpInfo::new(Absolute, Eor, 4);
    t[0x5D] = OpInfo::pc(AbsoluteX, Eor, 4);
    t[0x59] = OpInfo::pc(AbsoluteY, Eor, 4);
    t[0x41] = OpInfo::new(IndirectX, Eor, 6);
    t[0x51] = OpInfo::pc(IndirectY, Eor, 5);

    // INC / INX / INY
    t[0xE6] = OpInfo::new(ZeroPage, Inc, 5);
    t[0xF6] = OpInfo::new(ZeroPageX, Inc, 6);
    t[0xEE] = OpInfo::new(Absolute, Inc, 6);
    t[0xFE] = OpInfo::new(AbsoluteX, Inc, 7);
    t[0xE8] = OpInfo::new(Implied, Inx, 2);
    t[0xC8] = OpInfo::new(Implied, Iny, 2);

    // JMP / JSR
    t[0x4C] = OpInfo::new(Absolute, Jmp, 3);
    t[0x6C] = OpInfo::new(Indirect, Jmp, 5);
    t[0x20] = OpInfo::new(Absolute, Jsr, 6);

    // LDA
    t[0xA9] = OpInfo::new(Immediate, Lda, 2);
    t[0xA5] = OpInfo::new(ZeroPage, Lda, 3);
    t[0xB5] = OpInfo::new(ZeroPageX, Lda, 4);
    t[0xAD] = OpInfo::new(Absolute, Lda, 4);
    t[0xBD] = OpInfo::pc(AbsoluteX, Lda, 4);
    t[0xB9] = OpInfo::pc(AbsoluteY, Lda, 4);
    t[0xA1] = OpInfo::new(IndirectX, Lda, 6);
    t[0xB1] = OpInfo::pc(IndirectY, Lda, 5);

    // LDX / LDY
    t[0xA2] = OpInfo::new(Immediate, Ldx, 2);
    t[0xA6] = OpInfo::new(ZeroPage, Ldx, 3);
    t[0xB6] = OpInfo::new(ZeroPageY, Ldx, 4);
    t[0xAE] = OpInfo::new(Absolute, Ldx, 4);
    t[0xBE] = OpInfo::pc(AbsoluteY, Ldx, 4);
    t[0xA0] = OpInfo::new(Immediate, Ldy, 2);
    t[0xA4] = OpInfo::new(ZeroPage, Ldy, 3);
    t[0xB4] = OpInfo::new(ZeroPageX, Ldy, 4);
    t[0xAC] = OpInfo::new(Absolute, Ldy, 4);
    t[0xBC] = OpInfo::pc(AbsoluteX, Ldy, 4);

    // LSR
    t[0x4A] = OpInfo::new(Accumulator, Lsr, 2);
    t[0x46] = OpInfo::new(ZeroPage, Lsr, 5);
    t[0x56] = OpInfo::new(ZeroPageX, Lsr, 6);
    t[0x4E] = OpInfo::new(Absolute, Lsr, 6);
    t[0x5E] = OpInfo::new(AbsoluteX, Lsr, 7);

    // NOP
    t[0xEA] = OpInfo::new(Implied, Nop, 2);

    // ORA
    t[0x09] = OpInfo::new(Immediate, Ora, 2);
    t[0x05] = OpInfo::new(ZeroPage, Ora, 3);
    t[0x15] = OpInfo::new(ZeroPageX, Ora, 4);
    t[0x0D] = OpInfo::new(Absolute, Ora, 4);
    t[0x1D] = OpInfo::pc(AbsoluteX, Ora, 4);
    t[0x19] = OpInfo::pc(AbsoluteY, Ora, 4);
    t[0x01] = OpInfo::new(IndirectX, Ora, 6);
    t[0x11] = OpInfo::pc(IndirectY, Ora, 5);

    // Stack
    t[0x48] = OpInfo::new(Implied, Pha, 3);
    t[0x08] = OpInfo::new(Implied, Php, 3);
    t[0x68] = OpInfo::new(Implied, Pla, 4);
    t[0x28] = OpInfo::new(Implied, Plp, 4);

    // ROL / ROR
    t[0x2A] = OpInfo::new(Accumulator, Rol, 2);
    t[0x26] = OpInfo::new(ZeroPage, Rol, 5);
    t[0x36] = OpInfo::new(ZeroPageX, Rol, 6);
    t[0x2E] = OpInfo::new(Absolute, Rol, 6);
    t[0x3E] = OpInfo::new(AbsoluteX, Rol, 7);
    t[0x6A] = OpInfo::new(Accumulator, Ror, 2);
    t[0x66] = OpInfo::new(ZeroPage, Ror, 5);
    t[0x76] = OpInfo::new(ZeroPageX, Ror, 6);
    t[0x6E] = OpInfo::new(Absolute, Ror, 6);
    t[0x7E] = OpInfo::new(AbsoluteX, Ror, 7);

    // RTI / RTS
    t[0x40] = OpInfo::new(Implied, Rti, 6);
    t[0x60] = OpInfo::new(Implied, Rts, 6);

    // SBC
    t[0xE9] = OpInfo::new(Immediate, Sbc, 2);
    t[0xE5] = OpInfo::new(ZeroPage, Sbc, 3);
    t[0xF5] = OpInfo::new(ZeroPageX, Sbc, 4);
    t[0xED] = OpInfo::new(Absolute, Sbc, 4);
    t[0xFD] = OpInfo::pc(AbsoluteX, Sbc, 4);
    t[0xF9] = OpInfo::pc(AbsoluteY, Sbc, 4);
    t[0xE1] = OpInfo::new(IndirectX, Sbc, 6);
    t[0xF1] = OpInfo::pc(IndirectY, Sbc, 5);

    // STA / STX / STY (stores never take the oops cycle)
    t[0x85] = OpInfo::new(ZeroPage, Sta, 3);
    t[0x95] = OpInfo::new(ZeroPageX, Sta, 4);
    t[0x8D] = OpInfo::new(Absolute, Sta, 4);
    t[0x9D] = OpInfo::new(AbsoluteX, Sta, 5);
    t[0x99] = OpInfo::new(AbsoluteY, Sta, 5);
    t[0x81] = OpInfo::new(IndirectX, Sta, 6);
    t[0x91] = OpInfo::new(IndirectY, Sta, 6);
    t[0x86] = OpInfo::new(ZeroPage, Stx, 3);
    t[0x96] = OpInfo::new(ZeroPageY, Stx, 4);
    t[0x8E] = OpInfo::new(Absolute, Stx, 4);
    t[0x84] = OpInfo::new(ZeroPage, Sty, 3);
    t[0x94] = OpInfo::new(ZeroPageX, Sty, 4);
    t[0x8C] = OpInfo::new(Absolute, Sty, 4);

    // Transfers
    t[0xAA] = OpInfo::new(Implied, Tax, 2);
    t[0xA8] = OpInfo::new(Implied, Tay, 2);
    t[0xBA] = OpInfo::new(Implied, Tsx, 2);
    t[0x8A] = OpInfo::new(Implied, Txa, 2);
    t[0x9A] = OpInfo::new(Implied, Txs, 2);
    t[0x98] = OpInfo::new(Implied, Tya, 2);

    // ---- Documented unofficial opcodes ----

    // NOP variants
    t[0x1A] = OpInfo::new(Implied, Nop, 2);
    t[0x3A] = OpInfo::new(Implied, Nop, 2);
    t[0x5A] = OpInfo::new(Implied, Nop, 2);
    t[0x7A] = OpInfo::new(Implied, Nop, 2);
    t[0xDA] = OpInfo::new(Implied, Nop, 2);
    t[0xFA] = OpInfo::new(Implied, Nop, 2);
    t[0x80] = OpInfo::new(Immediate, Nop, 2);
    t[0x82] = OpInfo::new(Immediate, Nop, 2);
    t[0x89] = OpInfo::new(Immediate, Nop, 2);
    t[0xC2] = OpInfo::new(Immediate, Nop, 2);
    t[0xE2] = OpInfo::new(Immediate, Nop, 2);
    t[0x04] = OpInfo::new(ZeroPage, Nop, 3);
    t[0x44] = OpInfo::new(ZeroPage, Nop, 3);
    t[0x64] = OpInfo::new(ZeroPage, Nop, 3);
    t[0x14] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0x34] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0x54] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0x74] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0xD4] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0xF4] = OpInfo::new(ZeroPageX, Nop, 4);
    t[0x0C] = OpInfo::new(Absolute, Nop, 4);
    t[0x1C] = OpInfo::pc(AbsoluteX, Nop, 4);
    t[0x3C] = OpInfo::pc(AbsoluteX, Nop, 4);
    t[0x5C] = OpInfo::pc(AbsoluteX, Nop, 4);
    t[0x7C] = OpInfo::pc(AbsoluteX, Nop, 4);
    t[0xDC] = OpInfo::pc(AbsoluteX, Nop, 4);
    t[0xFC] = OpInfo::pc(AbsoluteX, Nop, 4);

    // LAX (LDA + LDX)
    t[0xA7] = OpInfo::new(ZeroPage, Lax, 3);
    t[0xB7] = OpInfo::new(ZeroPageY, Lax, 4);
    t[0xAF] = OpInfo::new(Absolute, Lax, 4);
    t[0xBF] = OpInfo::pc(AbsoluteY, Lax, 4);
    t[0xA3] = OpInfo::new(IndirectX, Lax, 6);
    t[0xB3] = OpInfo::pc(IndirectY, Lax, 5);
    t[0xAB] = OpInfo::new(Immediate, Lax, 2);

    // SAX (store A & X)
    t[0x87] = OpInfo::new(ZeroPage, Sax, 3);
    t[0x97] = OpInfo::new(ZeroPageY, Sax, 4);
    t[0x8F] = OpInfo::new(Absolute, Sax, 4);
    t[0x83] = OpInfo::new(IndirectX, Sax, 6);

    // DCP (DEC + CMP)
    t[0xC7] = OpInfo::new(ZeroPage, Dcp, 5);
    t[0xD7] = OpInfo::new(ZeroPageX, Dcp, 6);
    t[0xCF] = OpInfo::new(Absolute, Dcp, 6);
    t[0xDF] = OpInfo::new(AbsoluteX, Dcp, 7);
    t[0xDB] = OpInfo::new(AbsoluteY, Dcp, 7);
    t[0xC3] = OpInfo::new(IndirectX, Dcp, 8);
    t[0xD3] = OpInfo::new(IndirectY, Dcp, 8);

    // ISC (INC + SBC)
    t[0xE7] = OpInfo::new(ZeroPage, Isc, 5);
    t[0xF7] = OpInfo::new(ZeroPageX, Isc, 6);
    t[0xEF] = OpInfo::new(Absolute, Isc, 6);
    t[0xFF] = OpInfo::new(AbsoluteX, Isc, 7);
    t[0xFB] = OpInfo::new(AbsoluteY, Isc, 7);
    t[0xE3] = OpInfo::new(IndirectX, Isc, 8);
    t[0xF3] = OpInfo::new(IndirectY, Isc, 8);

    // SLO (ASL + ORA)
    t[0x07] = OpInfo::new(ZeroPage, Slo, 5);
    t[0x17] = OpInfo::new(ZeroPageX, Slo, 6);
    t[0x0F] = OpInfo::new(Absolute, Slo, 6);
    t[0x1F] = OpInfo::new(AbsoluteX, Slo, 7);
    t[0x1B] = OpInfo::new(AbsoluteY, Slo, 7);
    t[0x03] = OpInfo::new(IndirectX, Slo, 8);
    t[0x13] = OpInfo::new(IndirectY, Slo, 8);

    // RLA (ROL + AND)
    t[0x27] = OpInfo::new(ZeroPage, Rla, 5);
    t[0x37] = OpInfo::new(ZeroPageX, Rla, 6);
    t[0x2F] = OpInfo::new(Absolute, Rla, 6);
    t[0x3F] = OpInfo::new(AbsoluteX, Rla, 7);
    t[0x3B] = OpInfo::new(AbsoluteY, Rla, 7);
    t[0x23] = OpInfo::new(IndirectX, Rla, 8);
    t[0x33] = OpInfo::new(IndirectY, Rla, 8);

    // SRE (LSR + EOR)
    t[0x47] = OpInfo::new(ZeroPage, Sre, 5);
    t[0x57] = OpInfo::new(ZeroPageX, Sre, 6);
    t[0x4F] = OpInfo::new(Absolute, Sre, 6);
    t[0x5F] = OpInfo::new(AbsoluteX, Sre, 7);
    t[0x5B] = OpInfo::new(AbsoluteY, Sre, 7);
    t[0x43] = OpInfo::new(IndirectX, Sre, 8);
    t[0x53] = OpInfo::new(IndirectY, Sre, 8);

    // RRA (ROR + ADC)
    t[0x67] = OpInfo::new(ZeroPage, Rra, 5);
    t[0x77] = OpInfo::new(ZeroPageX, Rra, 6);
    t[0x6F] = OpInfo::new(Absolute, Rra, 6);
    t[0x7F] = OpInfo::new(AbsoluteX, Rra, 7);
    t[0x7B] = OpInfo::new(AbsoluteY, Rra, 7);
    t[0x63] = OpInfo::new(IndirectX, Rra, 8);
    t[0x73] = OpInfo::new(IndirectY, Rra, 8);

    // Immediate combinations
    t[0x4B] = OpInfo::new(Immediate, Alr, 2);
    t[0x0B] = OpInfo::new(Immediate, Anc, 2);
    t[0x2B] = OpInfo::new(Immediate, Anc, 2);
    t[0x6B] = OpInfo::new(Immediate, Arr, 2);
    t[0xCB] = OpInfo::new(Immediate, Axs, 2);
    t[0xEB] = OpInfo::new(Immediate, Sbc, 2); // SBC mirror

    // ---- Unstable opcodes (stubbed) ----
    t[0x93] = OpInfo::new(IndirectY, Ahx, 6);
    t[0x9F] = OpInfo::new(AbsoluteY, Ahx, 5);
    t[0x9C] = OpInfo::new(AbsoluteX, Shy, 5);
    t[0x9E] = OpInfo::new(AbsoluteY, Shx, 5);
    t[0x9B] = OpInfo::new(AbsoluteY, Tas, 5);
    t[0x8B] = OpInfo::new(Immediate, Xaa, 2);
    t[0xBB] = OpInfo::pc(AbsoluteY, Las, 4);

    t
};
