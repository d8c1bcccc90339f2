//! A Sharp LR35902 (DMG) instruction interpreter and memory-mapped address
//! space, with a timing-only PPU placeholder. Cartridge mapper logic,
//! interrupt dispatch, audio synthesis, serial I/O, and every user-facing
//! surface (CLI, debugger, window) are the host's responsibility — this
//! crate only steps the CPU and keeps memory consistent.

mod address;
mod config;
mod cpu;
mod effect;
mod error;
mod memory;
mod opcodes;
mod opcodes_cb;
mod ppu;
mod util;

pub use config::CoreConfig;
pub use cpu::{Flags, Registers, R16, R8};
pub use effect::Effect;
pub use error::CoreError;
pub use memory::Memory;
pub use ppu::{Ppu, PpuMode};

use cpu::Cpu;
use error::Result;

/// A snapshot of the CPU register file, for inspection (a debugger's
/// register pane, a test assertion) without handing out a live reference
/// into [`Core`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    /// Running total of cycles charged since power-on. Never decreases.
    pub cycles: u64,
    /// Count of instructions executed since power-on.
    pub instructions: u64,
}

/// The CPU-and-memory core: the fetch-decode-execute loop, the mapped
/// address space, and the PPU's timing state machine.
pub struct Core {
    cpu: Cpu,
    mem: Memory,
    ppu: Ppu,
    config: CoreConfig,
}

impl Core {
    /// Powers on with `cart_bytes` mapped as cartridge ROM (zero-padded to
    /// 32 KiB) and `boot_bytes` as the boot ROM overlay. Every register
    /// starts at zero, the boot overlay is enabled, and the PPU starts in
    /// OAM mode with `LY = 0`.
    pub fn power_on(cart_bytes: &[u8], boot_bytes: &[u8; 256], config: CoreConfig) -> Core {
        Core {
            cpu: Cpu::power_on(),
            mem: Memory::new(cart_bytes, boot_bytes),
            ppu: Ppu::power_on(),
            config,
        }
    }

    /// Executes exactly one instruction, then advances the PPU by the
    /// cycles it consumed.
    pub fn step(&mut self) -> Result<Effect> {
        let effect = opcodes::step(&mut self.cpu, &mut self.mem, self.config.debug)?;
        self.ppu.advance(&mut self.mem.io, effect.cycles);
        Ok(effect)
    }

    /// Advances only the PPU state machine, independent of instruction
    /// dispatch.
    pub fn tick_ppu(&mut self, cycles: u32) {
        self.ppu.advance(&mut self.mem.io, cycles);
    }

    pub fn ppu_mode(&self) -> PpuMode {
        self.ppu.mode()
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.mem.boot_rom_enabled()
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8> {
        self.mem.read_byte(addr)
    }

    pub fn read_short(&self, addr: u16) -> Result<u16> {
        self.mem.read_short(addr)
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) -> Result<()> {
        self.mem.write_byte(addr, val)
    }

    pub fn write_short(&mut self, addr: u16, val: u16) -> Result<()> {
        self.mem.write_short(addr, val)
    }

    pub fn registers(&self) -> RegisterSnapshot {
        let reg = &self.cpu.reg;
        RegisterSnapshot {
            a: reg.get_r8(R8::A),
            f: reg.flags.bits(),
            b: reg.get_r8(R8::B),
            c: reg.get_r8(R8::C),
            d: reg.get_r8(R8::D),
            e: reg.get_r8(R8::E),
            h: reg.get_r8(R8::H),
            l: reg.get_r8(R8::L),
            sp: reg.sp(),
            pc: reg.pc(),
            cycles: reg.cycles(),
            instructions: reg.instructions(),
        }
    }

    #[cfg(test)]
    fn set_pc(&mut self, pc: u16) {
        self.cpu.reg.set_pc(pc);
    }

    #[cfg(test)]
    fn set_sp(&mut self, sp: u16) {
        self.cpu.reg.set_sp(sp);
    }

    #[cfg(test)]
    fn set_hl(&mut self, hl: u16) {
        self.cpu.reg.set_hl(hl);
    }

    #[cfg(test)]
    fn set_r8(&mut self, r: R8, val: u8) {
        self.cpu.reg.set_r8(r, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boot_rom_with(bytes: &[u8]) -> [u8; 256] {
        let mut boot = [0u8; 256];
        boot[..bytes.len()].copy_from_slice(bytes);
        boot
    }

    // S1: boot-ROM LD SP,$FFFE then XOR A.
    #[test]
    fn boot_rom_ld_sp_then_xor_a() {
        let boot = boot_rom_with(&[0x31, 0xFE, 0xFF, 0xAF]);
        let mut core = Core::power_on(&[0u8; 0x8000], &boot, CoreConfig::default());

        let effect = core.step().unwrap();
        assert_eq!(effect.bytes_consumed, 3);
        assert_eq!(effect.cycles, 12);
        assert_eq!(core.registers().sp, 0xFFFE);
        assert_eq!(core.registers().pc, 3);
        assert_eq!(core.registers().cycles, 12);
        assert_eq!(core.registers().instructions, 1);

        let effect = core.step().unwrap();
        assert_eq!(core.registers().a, 0);
        assert_eq!(core.registers().f, 0x80);
        assert_eq!(core.registers().pc, 4);
        assert_eq!(effect.cycles, 4);
        assert_eq!(core.registers().cycles, 16);
        assert_eq!(core.registers().instructions, 2);
    }

    // S2: LDD (HL),A decrements HL after the store.
    #[test]
    fn ldd_hl_a_decrements_hl_after_store() {
        let boot = boot_rom_with(&[0x32]);
        let mut core = Core::power_on(&[0u8; 0x8000], &boot, CoreConfig::default());
        core.set_hl(0x9FFF);
        core.set_r8(R8::A, 0x42);

        core.step().unwrap();

        assert_eq!(core.read_byte(0x9FFF).unwrap(), 0x42);
        assert_eq!(core.registers().h, 0x9F);
        assert_eq!(core.registers().l, 0xFE);
        assert_eq!(core.registers().pc, 1);
    }

    // S3: CB BIT 7,H against a set bit.
    #[test]
    fn cb_bit_7_h() {
        let boot = boot_rom_with(&[0xCB, 0x7C]);
        let mut core = Core::power_on(&[0u8; 0x8000], &boot, CoreConfig::default());
        core.set_r8(R8::H, 0x80);

        core.step().unwrap();

        assert_eq!(core.registers().f & 0x80, 0); // Z cleared: bit was set
        assert_eq!(core.registers().f & 0x40, 0); // N cleared
        assert_eq!(core.registers().f & 0x20, 0x20); // H set
        assert_eq!(core.registers().pc, 2);
    }

    // S4: JR NZ,-5 taken.
    #[test]
    fn jr_nz_taken_advances_pc_by_offset() {
        let mut cart = [0u8; 0x8000];
        cart[0x100] = 0x20;
        cart[0x101] = 0xFB;
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_pc(0x0100);

        let effect = core.step().unwrap();

        assert_eq!(core.registers().pc, 0x00FD);
        assert_eq!(effect.cycles, 12);
    }

    // S4b: JR NZ not taken costs fewer cycles and falls through.
    #[test]
    fn jr_nz_not_taken_falls_through() {
        let mut cart = [0u8; 0x8000];
        cart[0x100] = 0xBF; // CP A,A -> Z set
        cart[0x101] = 0x20; // JR NZ,...
        cart[0x102] = 0xFB;
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_pc(0x0100);

        core.step().unwrap(); // CP A,A
        let effect = core.step().unwrap(); // JR NZ, not taken

        assert_eq!(effect.cycles, 8);
        assert_eq!(core.registers().pc, 0x0103);
    }

    // S5: CALL then RET round-trip.
    #[test]
    fn call_then_ret_round_trip() {
        let mut cart = [0u8; 0x8000];
        cart[0x150] = 0xCD;
        cart[0x151] = 0x00;
        cart[0x152] = 0x20;
        cart[0x2000] = 0xC9;
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_sp(0xFFFE);
        core.set_pc(0x0150);

        let effect = core.step().unwrap();
        assert_eq!(effect.cycles, 24);
        assert_eq!(core.registers().sp, 0xFFFC);
        assert_eq!(core.registers().pc, 0x2000);
        assert_eq!(core.read_byte(0xFFFC).unwrap(), 0x53);
        assert_eq!(core.read_byte(0xFFFD).unwrap(), 0x01);

        core.step().unwrap();
        assert_eq!(core.registers().pc, 0x0153);
        assert_eq!(core.registers().sp, 0xFFFE);
    }

    // S6: PPU mode transitions driven through tick_ppu.
    #[test]
    fn ppu_transitions_through_tick_ppu() {
        let mut core = Core::power_on(&[0u8; 0x8000], &[0u8; 256], CoreConfig::default());
        assert_eq!(core.ppu_mode(), PpuMode::Oam);

        core.tick_ppu(80);
        assert_eq!(core.ppu_mode(), PpuMode::Vram);

        core.tick_ppu(172);
        assert_eq!(core.ppu_mode(), PpuMode::HBlank);

        core.tick_ppu(204);
        assert_eq!(core.ppu_mode(), PpuMode::Oam);
        assert_eq!(core.read_byte(0xFF44).unwrap(), 1);
    }

    #[test]
    fn double_swap_is_identity() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0xCB;
        cart[1] = 0x37; // SWAP A
        cart[2] = 0xCB;
        cart[3] = 0x37; // SWAP A
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_r8(R8::A, 0x42);

        core.step().unwrap();
        core.step().unwrap();

        assert_eq!(core.registers().a, 0x42);
    }

    #[test]
    fn double_xor_a_is_identity() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0xAF; // XOR A
        cart[1] = 0xAF; // XOR A
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_r8(R8::A, 0x99);

        core.step().unwrap();
        assert_eq!(core.registers().a, 0);
        core.step().unwrap();
        assert_eq!(core.registers().a, 0);
    }

    #[test]
    fn inc_dec_round_trip() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0x3C; // INC A
        cart[1] = 0x3D; // DEC A
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();
        core.set_r8(R8::A, 0x41);

        core.step().unwrap();
        assert_eq!(core.registers().a, 0x42);
        core.step().unwrap();
        assert_eq!(core.registers().a, 0x41);
    }

    #[test]
    fn debug_mnemonic_only_rendered_when_requested() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0x00; // NOP

        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig { debug: false });
        core.write_byte(0xFF50, 0x01).unwrap();
        assert_eq!(core.step().unwrap().mnemonic, None);

        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig { debug: true });
        core.write_byte(0xFF50, 0x01).unwrap();
        assert_eq!(core.step().unwrap().mnemonic.as_deref(), Some("NOP"));
    }

    #[test]
    fn unknown_opcode_fails_and_propagates() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0xD3; // documented illegal opcode
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();

        let err = core.step().unwrap_err();
        assert_eq!(err, CoreError::UnknownOpcode(0xD3));
    }

    #[test]
    fn cycle_counter_is_monotone_and_matches_summed_effects() {
        let mut cart = [0u8; 0x8000];
        cart[0] = 0x3C; // INC A
        cart[1] = 0xAF; // XOR A
        cart[2] = 0x00; // NOP
        let mut core = Core::power_on(&cart, &[0u8; 256], CoreConfig::default());
        core.write_byte(0xFF50, 0x01).unwrap();

        let mut expected_cycles = 0u64;
        let mut last_cycles = 0u64;
        for i in 1..=3u64 {
            let effect = core.step().unwrap();
            expected_cycles += u64::from(effect.cycles);
            let snapshot = core.registers();
            assert!(snapshot.cycles >= last_cycles);
            assert_eq!(snapshot.cycles, expected_cycles);
            assert_eq!(snapshot.instructions, i);
            last_cycles = snapshot.cycles;
        }
    }

    #[test]
    fn flags_low_nibble_always_reads_zero() {
        let mut core = Core::power_on(&[0u8; 0x8000], &[0u8; 256], CoreConfig::default());
        core.cpu.reg.flags = Flags::from_bits_truncate(0xFF);
        assert_eq!(core.registers().f & 0x0F, 0);
    }
}
