//! The primary 256-entry opcode dispatch table, expressed as a `match` on
//! the fetched opcode byte rather than a table of boxed closures. Each arm
//! names the instruction primitive it reaches for in [`crate::cpu::execute`]
//! and the cycle cost the opcode declares.

use crate::cpu::execute;
use crate::cpu::operands::{decode_r8, Imm8, ImmAddr, Indirect, Operand, RegOrHl};
use crate::cpu::{Cpu, R16, R8};
use crate::effect::{pair_name, render_operand, Effect};
use crate::error::{CoreError, Result};
use crate::memory::Memory;
use crate::opcodes_cb;

fn cost_r8(r: RegOrHl) -> u32 {
    match r {
        RegOrHl::Hl => 8,
        RegOrHl::Reg(_) => 4,
    }
}

fn decode_pair_bc_de_hl_sp(bits: u8) -> R16 {
    match bits & 0b11 {
        0 => R16::BC,
        1 => R16::DE,
        2 => R16::HL,
        3 => R16::SP,
        _ => unreachable!(),
    }
}

fn mnemonic(debug: bool, f: impl FnOnce() -> String) -> Option<String> {
    if debug {
        Some(f())
    } else {
        None
    }
}

fn ld_mnemonic(debug: bool, dst: Operand, src: Operand) -> Option<String> {
    mnemonic(debug, || {
        format!("LD {},{}", render_operand(dst), render_operand(src))
    })
}

/// Fetches and executes one instruction starting at `cpu.reg.pc()`.
pub fn step(cpu: &mut Cpu, mem: &mut Memory, debug: bool) -> Result<Effect> {
    let pc_before = cpu.reg.pc();
    let opcode = cpu.fetch8(mem)?;

    let (cycles, text) = match dispatch(cpu, mem, opcode, debug) {
        Ok(result) => result,
        Err(err) => {
            log::warn!("step failed at {:#06X}: {}", pc_before, err);
            return Err(err);
        }
    };

    cpu.reg.record_step(cycles);

    let bytes_consumed = cpu.reg.pc().wrapping_sub(pc_before);
    Ok(Effect {
        pc_before,
        bytes_consumed,
        mnemonic: text,
        cycles,
    })
}

fn dispatch(cpu: &mut Cpu, mem: &mut Memory, opcode: u8, debug: bool) -> Result<(u32, Option<String>)> {
    use R16::*;
    use R8::*;

    match opcode {
        0x00 => Ok((4, mnemonic(debug, || "NOP".into()))),

        // LD rr,d16
        0x01 | 0x11 | 0x21 | 0x31 => {
            let rr = decode_pair_bc_de_hl_sp(opcode >> 4);
            let v = execute::ld_rr_d16(cpu, mem, rr)?;
            Ok((12, ld_mnemonic(debug, Operand::Pair(rr), Operand::Imm16(v))))
        }

        // LD (BC/DE/HL+/HL-),A and LD (HL),A
        0x02 => {
            let (d, s) = execute::ld8(cpu, mem, Indirect(BC), A)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x12 => {
            let (d, s) = execute::ld8(cpu, mem, Indirect(DE), A)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x22 => {
            use crate::cpu::operands::HlOperand;
            let (d, s) = execute::ld8(cpu, mem, HlOperand::HLi, A)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x32 => {
            use crate::cpu::operands::HlOperand;
            let (d, s) = execute::ld8(cpu, mem, HlOperand::HLd, A)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }

        // LD A,(BC/DE/HL+/HL-)
        0x0A => {
            let (d, s) = execute::ld8(cpu, mem, A, Indirect(BC))?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x1A => {
            let (d, s) = execute::ld8(cpu, mem, A, Indirect(DE))?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x2A => {
            use crate::cpu::operands::HlOperand;
            let (d, s) = execute::ld8(cpu, mem, A, HlOperand::HLi)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }
        0x3A => {
            use crate::cpu::operands::HlOperand;
            let (d, s) = execute::ld8(cpu, mem, A, HlOperand::HLd)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }

        // LD r,d8 / LD (HL),d8
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            let dst = decode_r8((opcode >> 3) & 7);
            let (d, s) = execute::ld8(cpu, mem, dst, Imm8)?;
            Ok((if matches!(dst, RegOrHl::Hl) { 12 } else { 8 }, ld_mnemonic(debug, d, s)))
        }

        // LD A,(a16) / LD A,(FF00+d8)
        0xFA => {
            let (d, s) = execute::ld8(cpu, mem, A, ImmAddr)?;
            Ok((16, ld_mnemonic(debug, d, s)))
        }
        0xF0 => {
            use crate::cpu::operands::HighRamOperand;
            let (d, s) = execute::ld8(cpu, mem, A, HighRamOperand::Imm8)?;
            Ok((12, ld_mnemonic(debug, d, s)))
        }
        0xF2 => {
            use crate::cpu::operands::HighRamOperand;
            let (d, s) = execute::ld8(cpu, mem, A, HighRamOperand::C)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }

        // LD (a16),A / LD (FF00+d8),A / LD (FF00+C),A
        0xEA => {
            let (d, s) = execute::ld8(cpu, mem, ImmAddr, A)?;
            Ok((16, ld_mnemonic(debug, d, s)))
        }
        0xE0 => {
            use crate::cpu::operands::HighRamOperand;
            let (d, s) = execute::ld8(cpu, mem, HighRamOperand::Imm8, A)?;
            Ok((12, ld_mnemonic(debug, d, s)))
        }
        0xE2 => {
            use crate::cpu::operands::HighRamOperand;
            let (d, s) = execute::ld8(cpu, mem, HighRamOperand::C, A)?;
            Ok((8, ld_mnemonic(debug, d, s)))
        }

        // LD (a16),SP
        0x08 => {
            let addr = execute::ld_a16_sp(cpu, mem)?;
            Ok((20, mnemonic(debug, || format!("LD (${:04X}),SP", addr))))
        }

        // HALT placeholder (no interrupt semantics)
        0x76 => Ok((4, mnemonic(debug, || "HALT".into()))),

        // LD r,r' / LD (HL),r / LD r,(HL)
        0x40..=0x7F => {
            let dst = decode_r8((opcode >> 3) & 7);
            let src = decode_r8(opcode & 7);
            let cost = if matches!(dst, RegOrHl::Hl) || matches!(src, RegOrHl::Hl) { 8 } else { 4 };
            let (d, s) = execute::ld8(cpu, mem, dst, src)?;
            Ok((cost, ld_mnemonic(debug, d, s)))
        }

        // ALU: ADD/ADC/SUB/SBC/AND/XOR/OR/CP, register/(HL)/immediate forms
        0x80..=0xBF => {
            let src = decode_r8(opcode & 7);
            let cost = cost_r8(src);
            alu_dispatch(cpu, mem, (opcode >> 3) & 7, src, cost, debug)
        }
        0xC6 => alu_dispatch(cpu, mem, 0, Imm8, 8, debug),
        0xCE => alu_dispatch(cpu, mem, 1, Imm8, 8, debug),
        0xD6 => alu_dispatch(cpu, mem, 2, Imm8, 8, debug),
        0xDE => alu_dispatch(cpu, mem, 3, Imm8, 8, debug),
        0xE6 => alu_dispatch(cpu, mem, 4, Imm8, 8, debug),
        0xEE => alu_dispatch(cpu, mem, 5, Imm8, 8, debug),
        0xF6 => alu_dispatch(cpu, mem, 6, Imm8, 8, debug),
        0xFE => alu_dispatch(cpu, mem, 7, Imm8, 8, debug),

        // INC/DEC r / (HL)
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            let t = decode_r8((opcode >> 3) & 7);
            let cost = if matches!(t, RegOrHl::Hl) { 12 } else { 4 };
            let d = execute::inc8(cpu, mem, t)?;
            Ok((cost, mnemonic(debug, || format!("INC {}", render_operand(d)))))
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            let t = decode_r8((opcode >> 3) & 7);
            let cost = if matches!(t, RegOrHl::Hl) { 12 } else { 4 };
            let d = execute::dec8(cpu, mem, t)?;
            Ok((cost, mnemonic(debug, || format!("DEC {}", render_operand(d)))))
        }

        // INC/DEC rr
        0x03 | 0x13 | 0x23 | 0x33 => {
            let rr = decode_pair_bc_de_hl_sp(opcode >> 4);
            execute::inc_rr(cpu, rr);
            Ok((8, mnemonic(debug, || format!("INC {}", pair_name(rr)))))
        }
        0x0B | 0x1B | 0x2B | 0x3B => {
            let rr = decode_pair_bc_de_hl_sp(opcode >> 4);
            execute::dec_rr(cpu, rr);
            Ok((8, mnemonic(debug, || format!("DEC {}", pair_name(rr)))))
        }

        // ADD HL,rr
        0x09 | 0x19 | 0x29 | 0x39 => {
            let rr = decode_pair_bc_de_hl_sp(opcode >> 4);
            execute::add_hl_rr(cpu, rr);
            Ok((8, mnemonic(debug, || format!("ADD HL,{}", pair_name(rr)))))
        }

        0x07 => {
            execute::rlca(cpu);
            Ok((4, mnemonic(debug, || "RLCA".into())))
        }
        0x0F => {
            execute::rrca(cpu);
            Ok((4, mnemonic(debug, || "RRCA".into())))
        }
        0x17 => {
            execute::rla(cpu);
            Ok((4, mnemonic(debug, || "RLA".into())))
        }
        0x1F => {
            execute::rra(cpu);
            Ok((4, mnemonic(debug, || "RRA".into())))
        }
        0x27 => {
            execute::daa(cpu);
            Ok((4, mnemonic(debug, || "DAA".into())))
        }
        0x2F => {
            execute::cpl(cpu);
            Ok((4, mnemonic(debug, || "CPL".into())))
        }
        0x37 => {
            execute::scf(cpu);
            Ok((4, mnemonic(debug, || "SCF".into())))
        }
        0x3F => {
            execute::ccf(cpu);
            Ok((4, mnemonic(debug, || "CCF".into())))
        }

        // JR
        0x18 => {
            let offset = execute::jr_cond(cpu, mem, true)?;
            Ok((12, mnemonic(debug, || format!("JR {}", offset))))
        }
        0x20 => jr_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::Z), "NZ", debug),
        0x28 => jr_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::Z), "Z", debug),
        0x30 => jr_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::C), "NC", debug),
        0x38 => jr_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::C), "C", debug),

        // JP
        0xC3 => {
            let target = execute::jp_cond(cpu, mem, true)?;
            Ok((16, mnemonic(debug, || format!("JP ${:04X}", target))))
        }
        0xE9 => {
            execute::jp_hl(cpu);
            Ok((4, mnemonic(debug, || "JP (HL)".into())))
        }
        0xC2 => jp_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::Z), "NZ", debug),
        0xCA => jp_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::Z), "Z", debug),
        0xD2 => jp_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::C), "NC", debug),
        0xDA => jp_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::C), "C", debug),

        // CALL
        0xCD => {
            let target = execute::call_cond(cpu, mem, true)?;
            Ok((24, mnemonic(debug, || format!("CALL ${:04X}", target))))
        }
        0xC4 => call_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::Z), "NZ", debug),
        0xCC => call_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::Z), "Z", debug),
        0xD4 => call_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::C), "NC", debug),
        0xDC => call_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::C), "C", debug),

        // RET
        0xC9 => {
            execute::ret(cpu, mem)?;
            Ok((16, mnemonic(debug, || "RET".into())))
        }
        0xD9 => {
            // RETI: decodes and charges the documented cost; no interrupt
            // semantics since interrupt dispatch is out of scope.
            execute::ret(cpu, mem)?;
            Ok((16, mnemonic(debug, || "RETI".into())))
        }
        0xC0 => ret_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::Z), "NZ", debug),
        0xC8 => ret_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::Z), "Z", debug),
        0xD0 => ret_cc(cpu, mem, !cpu.reg.flags.contains(crate::cpu::Flags::C), "NC", debug),
        0xD8 => ret_cc(cpu, mem, cpu.reg.flags.contains(crate::cpu::Flags::C), "C", debug),

        // RST
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            let target = (opcode & 0b0011_1000) as u16;
            execute::rst(cpu, mem, target)?;
            Ok((16, mnemonic(debug, || format!("RST ${:02X}", target))))
        }

        // POP / PUSH
        0xC1 => {
            execute::pop(cpu, mem, BC)?;
            Ok((12, mnemonic(debug, || "POP BC".into())))
        }
        0xD1 => {
            execute::pop(cpu, mem, DE)?;
            Ok((12, mnemonic(debug, || "POP DE".into())))
        }
        0xE1 => {
            execute::pop(cpu, mem, HL)?;
            Ok((12, mnemonic(debug, || "POP HL".into())))
        }
        0xF1 => {
            execute::pop_af(cpu, mem)?;
            Ok((12, mnemonic(debug, || "POP AF".into())))
        }
        0xC5 => {
            execute::push(cpu, mem, BC)?;
            Ok((16, mnemonic(debug, || "PUSH BC".into())))
        }
        0xD5 => {
            execute::push(cpu, mem, DE)?;
            Ok((16, mnemonic(debug, || "PUSH DE".into())))
        }
        0xE5 => {
            execute::push(cpu, mem, HL)?;
            Ok((16, mnemonic(debug, || "PUSH HL".into())))
        }
        0xF5 => {
            execute::push(cpu, mem, AF)?;
            Ok((16, mnemonic(debug, || "PUSH AF".into())))
        }

        0xE8 => {
            let offset = execute::add_sp_r8(cpu, mem)?;
            Ok((16, mnemonic(debug, || format!("ADD SP,{}", offset))))
        }
        0xF8 => {
            let offset = execute::ld_hl_sp_r8(cpu, mem)?;
            Ok((12, mnemonic(debug, || format!("LD HL,SP+{}", offset))))
        }
        0xF9 => {
            execute::ld_sp_hl(cpu);
            Ok((8, mnemonic(debug, || "LD SP,HL".into())))
        }

        0x10 => {
            // STOP: consumes a second, documented-zero byte.
            let _ = cpu.fetch8(mem)?;
            Ok((4, mnemonic(debug, || "STOP".into())))
        }
        0xF3 => Ok((4, mnemonic(debug, || "DI".into()))),
        0xFB => Ok((4, mnemonic(debug, || "EI".into()))),

        0xCB => {
            let cb_opcode = cpu.fetch8(mem)?;
            opcodes_cb::dispatch(cpu, mem, cb_opcode, debug)
        }

        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
            Err(CoreError::UnknownOpcode(opcode))
        }

        // Every remaining byte is covered by an arm above; this is
        // unreachable but keeps the match exhaustive without a wildcard
        // swallowing future typos.
        _ => Err(CoreError::UnknownOpcode(opcode)),
    }
}

fn alu_dispatch(
    cpu: &mut Cpu,
    mem: &mut Memory,
    op: u8,
    src: impl crate::cpu::operands::Src8 + Copy,
    cost: u32,
    debug: bool,
) -> Result<(u32, Option<String>)> {
    let (name, desc) = match op {
        0 => ("ADD A,", execute::add8(cpu, mem, src)?),
        1 => ("ADC A,", execute::adc8(cpu, mem, src)?),
        2 => ("SUB ", execute::sub8(cpu, mem, src)?),
        3 => ("SBC A,", execute::sbc8(cpu, mem, src)?),
        4 => ("AND ", execute::and8(cpu, mem, src)?),
        5 => ("XOR ", execute::xor8(cpu, mem, src)?),
        6 => ("OR ", execute::or8(cpu, mem, src)?),
        7 => ("CP ", execute::cp(cpu, mem, src)?),
        _ => unreachable!(),
    };
    Ok((cost, mnemonic(debug, || format!("{}{}", name, render_operand(desc)))))
}

fn jr_cc(cpu: &mut Cpu, mem: &mut Memory, cond: bool, name: &'static str, debug: bool) -> Result<(u32, Option<String>)> {
    let offset = execute::jr_cond(cpu, mem, cond)?;
    Ok((
        if cond { 12 } else { 8 },
        mnemonic(debug, || format!("JR {},{}", name, offset)),
    ))
}

fn jp_cc(cpu: &mut Cpu, mem: &mut Memory, cond: bool, name: &'static str, debug: bool) -> Result<(u32, Option<String>)> {
    let target = execute::jp_cond(cpu, mem, cond)?;
    Ok((
        if cond { 16 } else { 12 },
        mnemonic(debug, || format!("JP {},${:04X}", name, target)),
    ))
}

fn call_cc(cpu: &mut Cpu, mem: &mut Memory, cond: bool, name: &'static str, debug: bool) -> Result<(u32, Option<String>)> {
    let target = execute::call_cond(cpu, mem, cond)?;
    Ok((
        if cond { 24 } else { 12 },
        mnemonic(debug, || format!("CALL {},${:04X}", name, target)),
    ))
}

fn ret_cc(cpu: &mut Cpu, mem: &mut Memory, cond: bool, name: &'static str, debug: bool) -> Result<(u32, Option<String>)> {
    execute::ret_cond(cpu, mem, cond)?;
    Ok((if cond { 20 } else { 8 }, mnemonic(debug, || format!("RET {}", name))))
}
