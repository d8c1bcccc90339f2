//! What `Core::step` hands back for logging and tests: how many bytes and
//! cycles an instruction consumed, and (when [`crate::CoreConfig::debug`] is
//! set) a rendered mnemonic.

use crate::cpu::operands::Operand;
use crate::cpu::{R16, R8};

/// The outcome of a single `Core::step()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub pc_before: u16,
    pub bytes_consumed: u16,
    pub mnemonic: Option<String>,
    pub cycles: u32,
}

pub(crate) fn reg_name(r: R8) -> &'static str {
    match r {
        R8::A => "A",
        R8::B => "B",
        R8::C => "C",
        R8::D => "D",
        R8::E => "E",
        R8::H => "H",
        R8::L => "L",
    }
}

pub(crate) fn pair_name(rr: R16) -> &'static str {
    match rr {
        R16::AF => "AF",
        R16::BC => "BC",
        R16::DE => "DE",
        R16::HL => "HL",
        R16::SP => "SP",
        R16::PC => "PC",
    }
}

pub(crate) fn render_operand(op: Operand) -> String {
    match op {
        Operand::Reg(r) => reg_name(r).to_string(),
        Operand::Pair(rr) => pair_name(rr).to_string(),
        Operand::Imm8(v) => format!("${:02X}", v),
        Operand::Imm16(v) => format!("${:04X}", v),
        Operand::Indirect(rr) => format!("({})", pair_name(rr)),
        Operand::IndirectHlInc => "(HL+)".to_string(),
        Operand::IndirectHlDec => "(HL-)".to_string(),
        Operand::IndirectImm16(v) => format!("(${:04X})", v),
        Operand::HighImm8(v) => format!("($ff00+${:02X})", v),
        Operand::HighC => "($ff00+C)".to_string(),
    }
}
