//! The CB-prefixed 256-entry opcode table: rotates/shifts, `BIT`/`RES`/`SET`.
//! Total over all 256 values — there is no `UnknownCBOpcode` in practice,
//! though the error variant stays part of the closed error set.

use crate::cpu::execute;
use crate::cpu::operands::{decode_r8, RegOrHl};
use crate::cpu::Cpu;
use crate::effect::render_operand;
use crate::error::Result;
use crate::memory::Memory;

pub fn dispatch(cpu: &mut Cpu, mem: &mut Memory, opcode: u8, debug: bool) -> Result<(u32, Option<String>)> {
    let reg = decode_r8(opcode & 7);
    let hl = matches!(reg, RegOrHl::Hl);
    let group = opcode >> 3;

    let (name, desc, cost) = match group {
        0x00 => ("RLC ", execute::rlc(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x01 => ("RRC ", execute::rrc(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x02 => ("RL ", execute::rl(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x03 => ("RR ", execute::rr(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x04 => ("SLA ", execute::sla(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x05 => ("SRA ", execute::sra(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x06 => ("SWAP ", execute::swap(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x07 => ("SRL ", execute::srl(cpu, mem, reg)?, if hl { 16 } else { 8 }),
        0x08..=0x0F => {
            let n = group & 7;
            let desc = execute::bit(cpu, mem, n, reg)?;
            let text = mnemonic(debug, || format!("BIT {},{}", n, render_operand(desc)));
            return Ok((if hl { 16 } else { 8 }, text));
        }
        0x10..=0x17 => {
            let n = group & 7;
            let desc = execute::res(cpu, mem, n, reg)?;
            let text = mnemonic(debug, || format!("RES {},{}", n, render_operand(desc)));
            return Ok((if hl { 16 } else { 8 }, text));
        }
        0x18..=0x1F => {
            let n = group & 7;
            let desc = execute::set(cpu, mem, n, reg)?;
            let text = mnemonic(debug, || format!("SET {},{}", n, render_operand(desc)));
            return Ok((if hl { 16 } else { 8 }, text));
        }
        _ => unreachable!("CB group is a 5-bit value in 0..0x20"),
    };

    Ok((cost, mnemonic(debug, || format!("{}{}", name, render_operand(desc)))))
}

fn mnemonic(debug: bool, f: impl FnOnce() -> String) -> Option<String> {
    if debug {
        Some(f())
    } else {
        None
    }
}
