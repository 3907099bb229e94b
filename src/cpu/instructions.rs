// Instruction dispatch and execution
//
// One match arm per opcode, each delegating to a small helper that
// performs the operation and returns the instruction's total cycle
// count (including the page-cross penalty where the hardware charges
// one). The stable unofficial opcodes exercised by nestest are included;
// anything else is treated as a two-cycle NOP rather than halting.

use super::addressing::{page_crossed, Mode};
use super::{flags, vectors, Cpu};
use crate::bus::Bus;

impl Cpu {
    /// Fetch, decode, and execute one instruction; returns its cycles
    pub(super) fn execute_instruction(&mut self, bus: &mut Bus) -> u32 {
        let opcode = self.fetch_byte(bus);

        match opcode {
            // ---- Loads ----
            0xA9 => self.lda(bus, Mode::Immediate, 2),
            0xA5 => self.lda(bus, Mode::ZeroPage, 3),
            0xB5 => self.lda(bus, Mode::ZeroPageX, 4),
            0xAD => self.lda(bus, Mode::Absolute, 4),
            0xBD => self.lda(bus, Mode::AbsoluteX, 4),
            0xB9 => self.lda(bus, Mode::AbsoluteY, 4),
            0xA1 => self.lda(bus, Mode::IndirectX, 6),
            0xB1 => self.lda(bus, Mode::IndirectY, 5),

            0xA2 => self.ldx(bus, Mode::Immediate, 2),
            0xA6 => self.ldx(bus, Mode::ZeroPage, 3),
            0xB6 => self.ldx(bus, Mode::ZeroPageY, 4),
            0xAE => self.ldx(bus, Mode::Absolute, 4),
            0xBE => self.ldx(bus, Mode::AbsoluteY, 4),

            0xA0 => self.ldy(bus, Mode::Immediate, 2),
            0xA4 => self.ldy(bus, Mode::ZeroPage, 3),
            0xB4 => self.ldy(bus, Mode::ZeroPageX, 4),
            0xAC => self.ldy(bus, Mode::Absolute, 4),
            0xBC => self.ldy(bus, Mode::AbsoluteX, 4),

            // ---- Stores ----
            0x85 => self.sta(bus, Mode::ZeroPage, 3),
            0x95 => self.sta(bus, Mode::ZeroPageX, 4),
            0x8D => self.sta(bus, Mode::Absolute, 4),
            0x9D => self.sta(bus, Mode::AbsoluteX, 5),
            0x99 => self.sta(bus, Mode::AbsoluteY, 5),
            0x81 => self.sta(bus, Mode::IndirectX, 6),
            0x91 => self.sta(bus, Mode::IndirectY, 6),

            0x86 => self.stx(bus, Mode::ZeroPage, 3),
            0x96 => self.stx(bus, Mode::ZeroPageY, 4),
            0x8E => self.stx(bus, Mode::Absolute, 4),

            0x84 => self.sty(bus, Mode::ZeroPage, 3),
            0x94 => self.sty(bus, Mode::ZeroPageX, 4),
            0x8C => self.sty(bus, Mode::Absolute, 4),

            // ---- Transfers ----
            0xAA => {
                self.x = self.a;
                self.update_zero_negative(self.x);
                2
            }
            0xA8 => {
                self.y = self.a;
                self.update_zero_negative(self.y);
                2
            }
            0x8A => {
                self.a = self.x;
                self.update_zero_negative(self.a);
                2
            }
            0x98 => {
                self.a = self.y;
                self.update_zero_negative(self.a);
                2
            }
            0xBA => {
                self.x = self.sp;
                self.update_zero_negative(self.x);
                2
            }
            0x9A => {
                // TXS does not touch the flags
                self.sp = self.x;
                2
            }

            // ---- Stack ----
            0x48 => {
                self.stack_push(bus, self.a);
                3
            }
            0x08 => {
                // PHP pushes with B and the unused bit set
                self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
                3
            }
            0x68 => {
                self.a = self.stack_pop(bus);
                self.update_zero_negative(self.a);
                4
            }
            0x28 => {
                let value = self.stack_pop(bus);
                self.status = (value & !flags::BREAK) | flags::UNUSED;
                4
            }

            // ---- Logic ----
            0x29 => self.and(bus, Mode::Immediate, 2),
            0x25 => self.and(bus, Mode::ZeroPage, 3),
            0x35 => self.and(bus, Mode::ZeroPageX, 4),
            0x2D => self.and(bus, Mode::Absolute, 4),
            0x3D => self.and(bus, Mode::AbsoluteX, 4),
            0x39 => self.and(bus, Mode::AbsoluteY, 4),
            0x21 => self.and(bus, Mode::IndirectX, 6),
            0x31 => self.and(bus, Mode::IndirectY, 5),

            0x09 => self.ora(bus, Mode::Immediate, 2),
            0x05 => self.ora(bus, Mode::ZeroPage, 3),
            0x15 => self.ora(bus, Mode::ZeroPageX, 4),
            0x0D => self.ora(bus, Mode::Absolute, 4),
            0x1D => self.ora(bus, Mode::AbsoluteX, 4),
            0x19 => self.ora(bus, Mode::AbsoluteY, 4),
            0x01 => self.ora(bus, Mode::IndirectX, 6),
            0x11 => self.ora(bus, Mode::IndirectY, 5),

            0x49 => self.eor(bus, Mode::Immediate, 2),
            0x45 => self.eor(bus, Mode::ZeroPage, 3),
            0x55 => self.eor(bus, Mode::ZeroPageX, 4),
            0x4D => self.eor(bus, Mode::Absolute, 4),
            0x5D => self.eor(bus, Mode::AbsoluteX, 4),
            0x59 => self.eor(bus, Mode::AbsoluteY, 4),
            0x41 => self.eor(bus, Mode::IndirectX, 6),
            0x51 => self.eor(bus, Mode::IndirectY, 5),

            0x24 => self.bit(bus, Mode::ZeroPage, 3),
            0x2C => self.bit(bus, Mode::Absolute, 4),

            // ---- Arithmetic ----
            0x69 => self.adc(bus, Mode::Immediate, 2),
            0x65 => self.adc(bus, Mode::ZeroPage, 3),
            0x75 => self.adc(bus, Mode::ZeroPageX, 4),
            0x6D => self.adc(bus, Mode::Absolute, 4),
            0x7D => self.adc(bus, Mode::AbsoluteX, 4),
            0x79 => self.adc(bus, Mode::AbsoluteY, 4),
            0x61 => self.adc(bus, Mode::IndirectX, 6),
            0x71 => self.adc(bus, Mode::IndirectY, 5),

            0xE9 | 0xEB => self.sbc(bus, Mode::Immediate, 2),
            0xE5 => self.sbc(bus, Mode::ZeroPage, 3),
            0xF5 => self.sbc(bus, Mode::ZeroPageX, 4),
            0xED => self.sbc(bus, Mode::Absolute, 4),
            0xFD => self.sbc(bus, Mode::AbsoluteX, 4),
            0xF9 => self.sbc(bus, Mode::AbsoluteY, 4),
            0xE1 => self.sbc(bus, Mode::IndirectX, 6),
            0xF1 => self.sbc(bus, Mode::IndirectY, 5),

            // ---- Comparisons ----
            0xC9 => self.cmp_reg(bus, Mode::Immediate, 2, RegisterSelect::A),
            0xC5 => self.cmp_reg(bus, Mode::ZeroPage, 3, RegisterSelect::A),
            0xD5 => self.cmp_reg(bus, Mode::ZeroPageX, 4, RegisterSelect::A),
            0xCD => self.cmp_reg(bus, Mode::Absolute, 4, RegisterSelect::A),
            0xDD => self.cmp_reg(bus, Mode::AbsoluteX, 4, RegisterSelect::A),
            0xD9 => self.cmp_reg(bus, Mode::AbsoluteY, 4, RegisterSelect::A),
            0xC1 => self.cmp_reg(bus, Mode::IndirectX, 6, RegisterSelect::A),
            0xD1 => self.cmp_reg(bus, Mode::IndirectY, 5, RegisterSelect::A),

            0xE0 => self.cmp_reg(bus, Mode::Immediate, 2, RegisterSelect::X),
            0xE4 => self.cmp_reg(bus, Mode::ZeroPage, 3, RegisterSelect::X),
            0xEC => self.cmp_reg(bus, Mode::Absolute, 4, RegisterSelect::X),

            0xC0 => self.cmp_reg(bus, Mode::Immediate, 2, RegisterSelect::Y),
            0xC4 => self.cmp_reg(bus, Mode::ZeroPage, 3, RegisterSelect::Y),
            0xCC => self.cmp_reg(bus, Mode::Absolute, 4, RegisterSelect::Y),

            // ---- Increments / decrements ----
            0xE6 => self.inc(bus, Mode::ZeroPage, 5),
            0xF6 => self.inc(bus, Mode::ZeroPageX, 6),
            0xEE => self.inc(bus, Mode::Absolute, 6),
            0xFE => self.inc(bus, Mode::AbsoluteX, 7),
            0xC6 => self.dec(bus, Mode::ZeroPage, 5),
            0xD6 => self.dec(bus, Mode::ZeroPageX, 6),
            0xCE => self.dec(bus, Mode::Absolute, 6),
            0xDE => self.dec(bus, Mode::AbsoluteX, 7),

            0xE8 => {
                self.x = self.x.wrapping_add(1);
                self.update_zero_negative(self.x);
                2
            }
            0xC8 => {
                self.y = self.y.wrapping_add(1);
                self.update_zero_negative(self.y);
                2
            }
            0xCA => {
                self.x = self.x.wrapping_sub(1);
                self.update_zero_negative(self.x);
                2
            }
            0x88 => {
                self.y = self.y.wrapping_sub(1);
                self.update_zero_negative(self.y);
                2
            }

            // ---- Shifts / rotates ----
            0x0A => {
                self.a = self.asl_value(self.a);
                2
            }
            0x06 => self.rmw(bus, Mode::ZeroPage, 5, Cpu::asl_value),
            0x16 => self.rmw(bus, Mode::ZeroPageX, 6, Cpu::asl_value),
            0x0E => self.rmw(bus, Mode::Absolute, 6, Cpu::asl_value),
            0x1E => self.rmw(bus, Mode::AbsoluteX, 7, Cpu::asl_value),

            0x4A => {
                self.a = self.lsr_value(self.a);
                2
            }
            0x46 => self.rmw(bus, Mode::ZeroPage, 5, Cpu::lsr_value),
            0x56 => self.rmw(bus, Mode::ZeroPageX, 6, Cpu::lsr_value),
            0x4E => self.rmw(bus, Mode::Absolute, 6, Cpu::lsr_value),
            0x5E => self.rmw(bus, Mode::AbsoluteX, 7, Cpu::lsr_value),

            0x2A => {
                self.a = self.rol_value(self.a);
                2
            }
            0x26 => self.rmw(bus, Mode::ZeroPage, 5, Cpu::rol_value),
            0x36 => self.rmw(bus, Mode::ZeroPageX, 6, Cpu::rol_value),
            0x2E => self.rmw(bus, Mode::Absolute, 6, Cpu::rol_value),
            0x3E => self.rmw(bus, Mode::AbsoluteX, 7, Cpu::rol_value),

            0x6A => {
                self.a = self.ror_value(self.a);
                2
            }
            0x66 => self.rmw(bus, Mode::ZeroPage, 5, Cpu::ror_value),
            0x76 => self.rmw(bus, Mode::ZeroPageX, 6, Cpu::ror_value),
            0x6E => self.rmw(bus, Mode::Absolute, 6, Cpu::ror_value),
            0x7E => self.rmw(bus, Mode::AbsoluteX, 7, Cpu::ror_value),

            // ---- Jumps / subroutines ----
            0x4C => {
                self.pc = self.fetch_word(bus);
                3
            }
            0x6C => {
                let pointer = self.fetch_word(bus);
                self.pc = self.read_indirect_target(bus, pointer);
                5
            }
            0x20 => {
                let target = self.fetch_word(bus);
                // Push the address of the last byte of this instruction
                self.stack_push_u16(bus, self.pc.wrapping_sub(1));
                self.pc = target;
                6
            }
            0x60 => {
                self.pc = self.stack_pop_u16(bus).wrapping_add(1);
                6
            }
            0x40 => {
                let status = self.stack_pop(bus);
                self.status = (status & !flags::BREAK) | flags::UNUSED;
                self.pc = self.stack_pop_u16(bus);
                6
            }
            0x00 => {
                // BRK pushes PC+1 (skipping the padding byte) with B set
                self.pc = self.pc.wrapping_add(1);
                self.stack_push_u16(bus, self.pc);
                self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
                self.set_flag_value(flags::INTERRUPT_DISABLE, true);
                let lo = bus.read(vectors::IRQ) as u16;
                let hi = bus.read(vectors::IRQ.wrapping_add(1)) as u16;
                self.pc = (hi << 8) | lo;
                7
            }

            // ---- Branches ----
            0x10 => self.branch(bus, !self.get_flag(flags::NEGATIVE)),
            0x30 => self.branch(bus, self.get_flag(flags::NEGATIVE)),
            0x50 => self.branch(bus, !self.get_flag(flags::OVERFLOW)),
            0x70 => self.branch(bus, self.get_flag(flags::OVERFLOW)),
            0x90 => self.branch(bus, !self.get_flag(flags::CARRY)),
            0xB0 => self.branch(bus, self.get_flag(flags::CARRY)),
            0xD0 => self.branch(bus, !self.get_flag(flags::ZERO)),
            0xF0 => self.branch(bus, self.get_flag(flags::ZERO)),

            // ---- Flag operations ----
            0x18 => {
                self.set_flag_value(flags::CARRY, false);
                2
            }
            0x38 => {
                self.set_flag_value(flags::CARRY, true);
                2
            }
            0x58 => {
                self.set_flag_value(flags::INTERRUPT_DISABLE, false);
                2
            }
            0x78 => {
                self.set_flag_value(flags::INTERRUPT_DISABLE, true);
                2
            }
            0xB8 => {
                self.set_flag_value(flags::OVERFLOW, false);
                2
            }
            0xD8 => {
                self.set_flag_value(flags::DECIMAL, false);
                2
            }
            0xF8 => {
                self.set_flag_value(flags::DECIMAL, true);
                2
            }

            // ---- NOPs (official and unofficial encodings) ----
            0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => 2,
            0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => self.nop_read(bus, Mode::Immediate, 2),
            0x04 | 0x44 | 0x64 => self.nop_read(bus, Mode::ZeroPage, 3),
            0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => self.nop_read(bus, Mode::ZeroPageX, 4),
            0x0C => self.nop_read(bus, Mode::Absolute, 4),
            0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => self.nop_read(bus, Mode::AbsoluteX, 4),

            // ---- Unofficial load/store combos ----
            0xA7 => self.lax(bus, Mode::ZeroPage, 3),
            0xB7 => self.lax(bus, Mode::ZeroPageY, 4),
            0xAF => self.lax(bus, Mode::Absolute, 4),
            0xBF => self.lax(bus, Mode::AbsoluteY, 4),
            0xA3 => self.lax(bus, Mode::IndirectX, 6),
            0xB3 => self.lax(bus, Mode::IndirectY, 5),

            0x87 => self.sax(bus, Mode::ZeroPage, 3),
            0x97 => self.sax(bus, Mode::ZeroPageY, 4),
            0x8F => self.sax(bus, Mode::Absolute, 4),
            0x83 => self.sax(bus, Mode::IndirectX, 6),

            // ---- Unofficial RMW combos ----
            0xC7 => self.dcp(bus, Mode::ZeroPage, 5),
            0xD7 => self.dcp(bus, Mode::ZeroPageX, 6),
            0xCF => self.dcp(bus, Mode::Absolute, 6),
            0xDF => self.dcp(bus, Mode::AbsoluteX, 7),
            0xDB => self.dcp(bus, Mode::AbsoluteY, 7),
            0xC3 => self.dcp(bus, Mode::IndirectX, 8),
            0xD3 => self.dcp(bus, Mode::IndirectY, 8),

            0xE7 => self.isb(bus, Mode::ZeroPage, 5),
            0xF7 => self.isb(bus, Mode::ZeroPageX, 6),
            0xEF => self.isb(bus, Mode::Absolute, 6),
            0xFF => self.isb(bus, Mode::AbsoluteX, 7),
            0xFB => self.isb(bus, Mode::AbsoluteY, 7),
            0xE3 => self.isb(bus, Mode::IndirectX, 8),
            0xF3 => self.isb(bus, Mode::IndirectY, 8),

            0x07 => self.slo(bus, Mode::ZeroPage, 5),
            0x17 => self.slo(bus, Mode::ZeroPageX, 6),
            0x0F => self.slo(bus, Mode::Absolute, 6),
            0x1F => self.slo(bus, Mode::AbsoluteX, 7),
            0x1B => self.slo(bus, Mode::AbsoluteY, 7),
            0x03 => self.slo(bus, Mode::IndirectX, 8),
            0x13 => self.slo(bus, Mode::IndirectY, 8),

            0x27 => self.rla(bus, Mode::ZeroPage, 5),
            0x37 => self.rla(bus, Mode::ZeroPageX, 6),
            0x2F => self.rla(bus, Mode::Absolute, 6),
            0x3F => self.rla(bus, Mode::AbsoluteX, 7),
            0x3B => self.rla(bus, Mode::AbsoluteY, 7),
            0x23 => self.rla(bus, Mode::IndirectX, 8),
            0x33 => self.rla(bus, Mode::IndirectY, 8),

            0x47 => self.sre(bus, Mode::ZeroPage, 5),
            0x57 => self.sre(bus, Mode::ZeroPageX, 6),
            0x4F => self.sre(bus, Mode::Absolute, 6),
            0x5F => self.sre(bus, Mode::AbsoluteX, 7),
            0x5B => self.sre(bus, Mode::AbsoluteY, 7),
            0x43 => self.sre(bus, Mode::IndirectX, 8),
            0x53 => self.sre(bus, Mode::IndirectY, 8),

            0x67 => self.rra(bus, Mode::ZeroPage, 5),
            0x77 => self.rra(bus, Mode::ZeroPageX, 6),
            0x6F => self.rra(bus, Mode::Absolute, 6),
            0x7F => self.rra(bus, Mode::AbsoluteX, 7),
            0x7B => self.rra(bus, Mode::AbsoluteY, 7),
            0x63 => self.rra(bus, Mode::IndirectX, 8),
            0x73 => self.rra(bus, Mode::IndirectY, 8),

            // Remaining unofficial opcodes behave as NOPs; the core
            // never halts on malformed code (see error handling design)
            _ => 2,
        }
    }

    // ========================================
    // Operand helpers
    // ========================================

    /// Read an operand; returns the value and the page-cross flag
    fn read_operand(&mut self, bus: &mut Bus, mode: Mode) -> (u8, bool) {
        let (addr, crossed) = self.operand_address(bus, mode);
        (bus.read(addr), crossed)
    }

    /// Cycle count with the read-instruction page-cross penalty
    #[inline]
    fn penalized(base: u32, crossed: bool) -> u32 {
        base + crossed as u32
    }

    // ========================================
    // Loads and stores
    // ========================================

    fn lda(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.a = value;
        self.update_zero_negative(value);
        Self::penalized(base, crossed)
    }

    fn ldx(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.x = value;
        self.update_zero_negative(value);
        Self::penalized(base, crossed)
    }

    fn ldy(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.y = value;
        self.update_zero_negative(value);
        Self::penalized(base, crossed)
    }

    fn sta(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        bus.write(addr, self.a);
        cycles
    }

    fn stx(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        bus.write(addr, self.x);
        cycles
    }

    fn sty(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        bus.write(addr, self.y);
        cycles
    }

    // ========================================
    // Logic
    // ========================================

    fn and(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.a &= value;
        self.update_zero_negative(self.a);
        Self::penalized(base, crossed)
    }

    fn ora(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.a |= value;
        self.update_zero_negative(self.a);
        Self::penalized(base, crossed)
    }

    fn eor(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.a ^= value;
        self.update_zero_negative(self.a);
        Self::penalized(base, crossed)
    }

    /// BIT: Z from A & M, N and V copied from the operand
    fn bit(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (value, _) = self.read_operand(bus, mode);
        self.set_flag_value(flags::ZERO, self.a & value == 0);
        self.set_flag_value(flags::NEGATIVE, value & 0x80 != 0);
        self.set_flag_value(flags::OVERFLOW, value & 0x40 != 0);
        cycles
    }

    // ========================================
    // Arithmetic
    // ========================================

    /// Add with carry, setting C, V, Z, N
    fn adc_value(&mut self, value: u8) {
        let carry = self.get_flag(flags::CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = sum as u8;

        self.set_flag_value(flags::CARRY, sum > 0xFF);
        // Overflow: both operands share a sign the result does not
        self.set_flag_value(
            flags::OVERFLOW,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );
        self.a = result;
        self.update_zero_negative(result);
    }

    fn adc(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.adc_value(value);
        Self::penalized(base, crossed)
    }

    fn sbc(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        // SBC is ADC of the complement; borrow is the inverted carry
        self.adc_value(!value);
        Self::penalized(base, crossed)
    }

    fn compare_value(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_flag_value(flags::CARRY, register >= value);
        self.update_zero_negative(result);
    }

    fn cmp_reg(&mut self, bus: &mut Bus, mode: Mode, base: u32, select: RegisterSelect) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        let register = match select {
            RegisterSelect::A => self.a,
            RegisterSelect::X => self.x,
            RegisterSelect::Y => self.y,
        };
        self.compare_value(register, value);
        Self::penalized(base, crossed)
    }

    // ========================================
    // Read-modify-write
    // ========================================

    /// Generic RMW: read, transform, write back; fixed cycle cost
    fn rmw(&mut self, bus: &mut Bus, mode: Mode, cycles: u32, op: fn(&mut Cpu, u8) -> u8) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr);
        let result = op(self, value);
        bus.write(addr, result);
        cycles
    }

    fn inc(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        self.rmw(bus, mode, cycles, |cpu, value| {
            let result = value.wrapping_add(1);
            cpu.update_zero_negative(result);
            result
        })
    }

    fn dec(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        self.rmw(bus, mode, cycles, |cpu, value| {
            let result = value.wrapping_sub(1);
            cpu.update_zero_negative(result);
            result
        })
    }

    fn asl_value(&mut self, value: u8) -> u8 {
        self.set_flag_value(flags::CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.update_zero_negative(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.set_flag_value(flags::CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.update_zero_negative(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = self.get_flag(flags::CARRY) as u8;
        self.set_flag_value(flags::CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.update_zero_negative(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = (self.get_flag(flags::CARRY) as u8) << 7;
        self.set_flag_value(flags::CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.update_zero_negative(result);
        result
    }

    // ========================================
    // Branches
    // ========================================

    /// Relative branch: 2 cycles, +1 taken, +1 more crossing a page
    fn branch(&mut self, bus: &mut Bus, condition: bool) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        if !condition {
            return 2;
        }
        let origin = self.pc;
        self.pc = self.pc.wrapping_add(offset as u16);
        3 + page_crossed(origin, self.pc) as u32
    }

    // ========================================
    // Unofficial opcodes
    // ========================================

    /// Discarded read used by the multi-byte NOP encodings
    fn nop_read(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (_, crossed) = self.read_operand(bus, mode);
        Self::penalized(base, crossed)
    }

    /// LAX: load A and X together
    fn lax(&mut self, bus: &mut Bus, mode: Mode, base: u32) -> u32 {
        let (value, crossed) = self.read_operand(bus, mode);
        self.a = value;
        self.x = value;
        self.update_zero_negative(value);
        Self::penalized(base, crossed)
    }

    /// SAX: store A & X, flags untouched
    fn sax(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        bus.write(addr, self.a & self.x);
        cycles
    }

    /// DCP: DEC memory then CMP
    fn dcp(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr).wrapping_sub(1);
        bus.write(addr, value);
        self.compare_value(self.a, value);
        cycles
    }

    /// ISB: INC memory then SBC
    fn isb(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr).wrapping_add(1);
        bus.write(addr, value);
        self.adc_value(!value);
        cycles
    }

    /// SLO: ASL memory then ORA
    fn slo(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr);
        let shifted = self.asl_value(value);
        bus.write(addr, shifted);
        self.a |= shifted;
        self.update_zero_negative(self.a);
        cycles
    }

    /// RLA: ROL memory then AND
    fn rla(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr);
        let rotated = self.rol_value(value);
        bus.write(addr, rotated);
        self.a &= rotated;
        self.update_zero_negative(self.a);
        cycles
    }

    /// SRE: LSR memory then EOR
    fn sre(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr);
        let shifted = self.lsr_value(value);
        bus.write(addr, shifted);
        self.a ^= shifted;
        self.update_zero_negative(self.a);
        cycles
    }

    /// RRA: ROR memory then ADC
    fn rra(&mut self, bus: &mut Bus, mode: Mode, cycles: u32) -> u32 {
        let (addr, _) = self.operand_address(bus, mode);
        let value = bus.read(addr);
        let rotated = self.ror_value(value);
        bus.write(addr, rotated);
        self.adc_value(rotated);
        cycles
    }
}

/// Register selector for the shared compare helper
#[derive(Debug, Clone, Copy)]
enum RegisterSelect {
    A,
    X,
    Y,
}
