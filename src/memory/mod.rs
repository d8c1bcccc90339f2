//! Glues the address-space router ([`crate::address`]) to the actual byte
//! containers: cartridge ROM, the boot overlay, VRAM, WRAM, wave RAM, HRAM,
//! and the I/O register bank. This is the core's replacement for a
//! hardware-accurate MMU — it only understands exactly what the CPU loop
//! needs.

mod io_bank;
mod region;

use crate::address::{self, Addr};
use crate::error::{CoreError, Result};

pub use io_bank::IoBank;
pub use region::{RamRegion, RomRegion};

const BOOT_ROM_SIZE: usize = 0x100;
const CART_ROM_SIZE: usize = 0x8000;
const VRAM_SIZE: usize = 0x2000;
const WRAM_SIZE: usize = 0x2000;
const WAVE_RAM_SIZE: usize = 0x10;
const HRAM_SIZE: usize = 0x7F;

/// The unified Game Boy address space: boot overlay, flat cartridge ROM,
/// VRAM, WRAM, wave RAM, HRAM, and the mapped I/O register bank.
pub struct Memory {
    boot_rom: RomRegion,
    cart_rom: RomRegion,
    vram: RamRegion,
    wram: RamRegion,
    wave_ram: RamRegion,
    hram: RamRegion,
    pub io: IoBank,
    boot_rom_enabled: bool,
}

impl Memory {
    /// `cart_bytes` is copied into a flat 32 KiB ROM (zero-padded if
    /// shorter); `boot_bytes` must be exactly 256 bytes.
    pub fn new(cart_bytes: &[u8], boot_bytes: &[u8; BOOT_ROM_SIZE]) -> Memory {
        Memory {
            boot_rom: RomRegion::new(boot_bytes, BOOT_ROM_SIZE),
            cart_rom: RomRegion::new(cart_bytes, CART_ROM_SIZE),
            vram: RamRegion::new(VRAM_SIZE),
            wram: RamRegion::new(WRAM_SIZE),
            wave_ram: RamRegion::new(WAVE_RAM_SIZE),
            hram: RamRegion::new(HRAM_SIZE),
            io: IoBank::new(),
            boot_rom_enabled: true,
        }
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8> {
        match address::resolve(addr, 1, self.boot_rom_enabled)? {
            Addr::BootRom(off) => Ok(self.boot_rom.read8(off)),
            Addr::Rom(off) => Ok(self.cart_rom.read8(off)),
            Addr::VRam(off) => Ok(self.vram.read8(off)),
            Addr::WRam(off) => Ok(self.wram.read8(off)),
            Addr::WaveRam(off) => Ok(self.wave_ram.read8(off)),
            Addr::HRam(off) => Ok(self.hram.read8(off)),
            Addr::IoReg(a) => self.io.read8(a),
            Addr::InterruptEnable => self.io.read8(0xFFFF),
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) -> Result<()> {
        match address::resolve(addr, 1, self.boot_rom_enabled)? {
            Addr::BootRom(_) | Addr::Rom(_) => Err(CoreError::ReadOnly(addr)),
            Addr::VRam(off) => {
                self.vram.write8(off, val);
                Ok(())
            }
            Addr::WRam(off) => {
                self.wram.write8(off, val);
                Ok(())
            }
            Addr::WaveRam(off) => {
                self.wave_ram.write8(off, val);
                Ok(())
            }
            Addr::HRam(off) => {
                self.hram.write8(off, val);
                Ok(())
            }
            Addr::IoReg(0xFF50) => {
                self.io.write8(0xFF50, val)?;
                if self.io.raw(0xFF50) & 0x01 != 0 {
                    log::debug!("boot ROM overlay disabled via FF50 latch");
                    self.boot_rom_enabled = false;
                }
                Ok(())
            }
            Addr::IoReg(a) => self.io.write8(a, val),
            Addr::InterruptEnable => self.io.write8(0xFFFF, val),
        }
    }

    pub fn read_short(&self, addr: u16) -> Result<u16> {
        match address::resolve(addr, 2, self.boot_rom_enabled)? {
            Addr::BootRom(off) => Ok(self.boot_rom.read16(off)),
            Addr::Rom(off) => Ok(self.cart_rom.read16(off)),
            Addr::VRam(off) => Ok(self.vram.read16(off)),
            Addr::WRam(off) => Ok(self.wram.read16(off)),
            Addr::WaveRam(off) => Ok(self.wave_ram.read16(off)),
            Addr::HRam(off) => Ok(self.hram.read16(off)),
            Addr::IoReg(a) => self.io.read16(a),
            Addr::InterruptEnable => {
                unreachable!("resolve() never returns InterruptEnable for a 2-byte access")
            }
        }
    }

    pub fn write_short(&mut self, addr: u16, val: u16) -> Result<()> {
        match address::resolve(addr, 2, self.boot_rom_enabled)? {
            Addr::BootRom(_) | Addr::Rom(_) => Err(CoreError::ReadOnly(addr)),
            Addr::VRam(off) => {
                self.vram.write16(off, val);
                Ok(())
            }
            Addr::WRam(off) => {
                self.wram.write16(off, val);
                Ok(())
            }
            Addr::WaveRam(off) => {
                self.wave_ram.write16(off, val);
                Ok(())
            }
            Addr::HRam(off) => {
                self.hram.write16(off, val);
                Ok(())
            }
            Addr::IoReg(a) => self.io.write16(a, val),
            Addr::InterruptEnable => {
                unreachable!("resolve() never returns InterruptEnable for a 2-byte access")
            }
        }
    }

    /// Decodes one tile row (2 bitplane bytes) into 8 two-bit color indices.
    pub fn tile_row(low_byte: u8, high_byte: u8) -> [u8; 8] {
        let mut row = [0u8; 8];
        for (x, slot) in row.iter_mut().enumerate() {
            let lo = (low_byte >> (7 - x)) & 1;
            let hi = (high_byte >> (7 - x)) & 1;
            *slot = lo | (hi << 1);
        }
        row
    }
}
