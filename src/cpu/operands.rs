//! To avoid repetitive code in [`super::execute`], this module provides the
//! [`Src8`] and [`Dst8`] traits, which generalize over every place an 8-bit
//! instruction can read or write a value: a register, an immediate byte, or
//! one of the several indirect-through-memory addressing modes.
//!
//! Every read/write also returns an [`Operand`] describing what happened, so
//! `step()` can render a mnemonic without re-reading memory or re-decoding
//! the opcode later.

use super::registers::{R16, R8};
use super::Cpu;
use crate::error::Result;
use crate::memory::Memory;

/// Describes which operand a [`Src8`]/[`Dst8`] access touched, for mnemonic
/// rendering. Carries no information beyond what's needed to print it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(R8),
    Pair(R16),
    Imm8(u8),
    Imm16(u16),
    Indirect(R16),
    IndirectHlInc,
    IndirectHlDec,
    IndirectImm16(u16),
    HighImm8(u8),
    HighC,
}

/// Reads an 8-bit value from a register or through memory.
pub trait Src8 {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)>;
}

/// Writes an 8-bit value to a register or through memory.
pub trait Dst8 {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand>;
}

/// Reads an immediate byte at `(PC)`, then advances PC past it.
#[derive(Copy, Clone)]
pub struct Imm8;

impl Src8 for Imm8 {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        let val = cpu.fetch8(mem)?;
        Ok((val, Operand::Imm8(val)))
    }
}

/// Indirect access through a 16-bit register pair, e.g. `(BC)`, `(DE)`, `(HL)`.
#[derive(Copy, Clone)]
pub struct Indirect(pub R16);

impl Src8 for Indirect {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        let addr = cpu.reg.get_r16(self.0);
        Ok((mem.read_byte(addr)?, Operand::Indirect(self.0)))
    }
}

impl Dst8 for Indirect {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand> {
        let addr = cpu.reg.get_r16(self.0);
        mem.write_byte(addr, val)?;
        Ok(Operand::Indirect(self.0))
    }
}

/// The HL register offers "free" INC/DEC on HL once `(HL)` is resolved.
pub enum HlOperand {
    /// `(HL+)`: read/write through HL, then HL += 1.
    HLi,
    /// `(HL-)`: read/write through HL, then HL -= 1.
    HLd,
}

impl Src8 for HlOperand {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        let val = mem.read_byte(cpu.reg.hl())?;
        match self {
            HlOperand::HLi => {
                cpu.reg.set_hl(cpu.reg.hl().wrapping_add(1));
                Ok((val, Operand::IndirectHlInc))
            }
            HlOperand::HLd => {
                cpu.reg.set_hl(cpu.reg.hl().wrapping_sub(1));
                Ok((val, Operand::IndirectHlDec))
            }
        }
    }
}

impl Dst8 for HlOperand {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand> {
        mem.write_byte(cpu.reg.hl(), val)?;
        match self {
            HlOperand::HLi => {
                cpu.reg.set_hl(cpu.reg.hl().wrapping_add(1));
                Ok(Operand::IndirectHlInc)
            }
            HlOperand::HLd => {
                cpu.reg.set_hl(cpu.reg.hl().wrapping_sub(1));
                Ok(Operand::IndirectHlDec)
            }
        }
    }
}

/// Some instructions assume the upper byte of the address is `0xFF`
/// (`0xFF00 + offset`), with the offset provided either as an immediate byte
/// or via register C.
pub enum HighRamOperand {
    Imm8,
    C,
}

impl Src8 for HighRamOperand {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        match self {
            HighRamOperand::Imm8 => {
                let offset = cpu.fetch8(mem)?;
                Ok((
                    mem.read_byte(0xFF00u16.wrapping_add(offset as u16))?,
                    Operand::HighImm8(offset),
                ))
            }
            HighRamOperand::C => {
                let offset = cpu.reg.get_r8(R8::C);
                Ok((
                    mem.read_byte(0xFF00u16.wrapping_add(offset as u16))?,
                    Operand::HighC,
                ))
            }
        }
    }
}

impl Dst8 for HighRamOperand {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand> {
        match self {
            HighRamOperand::Imm8 => {
                let offset = cpu.fetch8(mem)?;
                mem.write_byte(0xFF00u16.wrapping_add(offset as u16), val)?;
                Ok(Operand::HighImm8(offset))
            }
            HighRamOperand::C => {
                let offset = cpu.reg.get_r8(R8::C);
                mem.write_byte(0xFF00u16.wrapping_add(offset as u16), val)?;
                Ok(Operand::HighC)
            }
        }
    }
}

impl Src8 for R8 {
    fn read(self, cpu: &mut Cpu, _mem: &mut Memory) -> Result<(u8, Operand)> {
        Ok((cpu.reg.get_r8(self), Operand::Reg(self)))
    }
}

impl Dst8 for R8 {
    fn write(self, cpu: &mut Cpu, _mem: &mut Memory, val: u8) -> Result<Operand> {
        cpu.reg.set_r8(self, val);
        Ok(Operand::Reg(self))
    }
}

/// Indirect access through an immediate 16-bit address, e.g. `(imm16)`.
pub struct ImmAddr;

impl Src8 for ImmAddr {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        let addr = cpu.fetch16(mem)?;
        Ok((mem.read_byte(addr)?, Operand::IndirectImm16(addr)))
    }
}

impl Dst8 for ImmAddr {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand> {
        let addr = cpu.fetch16(mem)?;
        mem.write_byte(addr, val)?;
        Ok(Operand::IndirectImm16(addr))
    }
}

/// The `rrr`/`ddd` 3-bit register field used throughout the opcode space
/// (`B C D E H L (HL) A`), unified into a single `Src8`/`Dst8` type so the
/// dispatch tables can decode it once and stay data-driven.
#[derive(Copy, Clone)]
pub enum RegOrHl {
    Reg(R8),
    Hl,
}

/// Decodes the standard 3-bit register field: `0=B 1=C 2=D 3=E 4=H 5=L
/// 6=(HL) 7=A`.
pub fn decode_r8(idx: u8) -> RegOrHl {
    match idx & 0b111 {
        0 => RegOrHl::Reg(R8::B),
        1 => RegOrHl::Reg(R8::C),
        2 => RegOrHl::Reg(R8::D),
        3 => RegOrHl::Reg(R8::E),
        4 => RegOrHl::Reg(R8::H),
        5 => RegOrHl::Reg(R8::L),
        6 => RegOrHl::Hl,
        7 => RegOrHl::Reg(R8::A),
        _ => unreachable!(),
    }
}

impl Src8 for RegOrHl {
    fn read(self, cpu: &mut Cpu, mem: &mut Memory) -> Result<(u8, Operand)> {
        match self {
            RegOrHl::Reg(r) => r.read(cpu, mem),
            RegOrHl::Hl => Indirect(R16::HL).read(cpu, mem),
        }
    }
}

impl Dst8 for RegOrHl {
    fn write(self, cpu: &mut Cpu, mem: &mut Memory, val: u8) -> Result<Operand> {
        match self {
            RegOrHl::Reg(r) => r.write(cpu, mem, val),
            RegOrHl::Hl => Indirect(R16::HL).write(cpu, mem, val),
        }
    }
}
