//! A timing-only placeholder for the picture processing unit: it advances
//! the OAM/VRAM/HBLANK/VBLANK mode state machine and keeps `LY`/`STAT` in
//! sync, but does not render pixels. Pixel rendering, sprites, and the
//! window/background tile pipeline are out of scope.

use crate::memory::IoBank;

const OAM_CYCLES: u32 = 80;
const VRAM_CYCLES: u32 = 172;
const HBLANK_CYCLES: u32 = 204;
const VBLANK_CYCLES: u32 = 4560;

const LCDC_LINES: u8 = 144;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PpuMode {
    HBlank,
    VBlank,
    Oam,
    Vram,
}

impl PpuMode {
    fn stat_bits(self) -> u8 {
        match self {
            PpuMode::HBlank => 0,
            PpuMode::VBlank => 1,
            PpuMode::Oam => 2,
            PpuMode::Vram => 3,
        }
    }
}

pub struct Ppu {
    mode: PpuMode,
    accumulator: u32,
}

impl Ppu {
    pub fn power_on() -> Ppu {
        Ppu {
            mode: PpuMode::Oam,
            accumulator: 0,
        }
    }

    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    /// Advances the mode state machine by `cycles` CPU cycles, writing the
    /// resulting mode into STAT's low two bits and bumping LY on every
    /// HBLANK→next transition. Transitions happen in address order within a
    /// single call; the accumulator carries any residual into the next call.
    pub fn advance(&mut self, io: &mut IoBank, cycles: u32) {
        self.accumulator += cycles;

        loop {
            let advanced = match self.mode {
                PpuMode::Oam if self.accumulator >= OAM_CYCLES => {
                    self.accumulator -= OAM_CYCLES;
                    self.mode = PpuMode::Vram;
                    log::trace!("PPU: OAM -> VRAM");
                    true
                }
                PpuMode::Vram if self.accumulator >= VRAM_CYCLES => {
                    self.accumulator -= VRAM_CYCLES;
                    self.mode = PpuMode::HBlank;
                    log::trace!("PPU: VRAM -> HBLANK");
                    true
                }
                PpuMode::HBlank if self.accumulator >= HBLANK_CYCLES => {
                    self.accumulator -= HBLANK_CYCLES;
                    let ly = io.raw(0xFF44).wrapping_add(1);
                    io.set_raw(0xFF44, ly);

                    self.mode = if ly >= LCDC_LINES {
                        log::trace!("PPU: HBLANK -> VBLANK");
                        PpuMode::VBlank
                    } else {
                        log::trace!("PPU: HBLANK -> OAM");
                        PpuMode::Oam
                    };
                    true
                }
                PpuMode::VBlank if self.accumulator >= VBLANK_CYCLES => {
                    self.accumulator -= VBLANK_CYCLES;
                    io.set_raw(0xFF44, 0);
                    self.mode = PpuMode::Oam;
                    log::trace!("PPU: VBLANK -> OAM");
                    true
                }
                _ => false,
            };

            if !advanced {
                break;
            }
        }

        let stat = io.raw(0xFF41);
        io.set_raw(0xFF41, (stat & !0b11) | self.mode.stat_bits());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oam_to_vram_to_hblank_to_oam_with_ly_increment() {
        let mut io = IoBank::new();
        let mut ppu = Ppu::power_on();
        assert_eq!(ppu.mode(), PpuMode::Oam);

        ppu.advance(&mut io, 80);
        assert_eq!(ppu.mode(), PpuMode::Vram);
        assert_eq!(ppu.accumulator(), 0);

        ppu.advance(&mut io, 172);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        assert_eq!(ppu.accumulator(), 0);

        ppu.advance(&mut io, 204);
        assert_eq!(ppu.mode(), PpuMode::Oam);
        assert_eq!(io.read8(0xFF44).unwrap(), 1);
        assert_eq!(io.read8(0xFF41).unwrap() & 0b11, 2);
    }

    #[test]
    fn vblank_resets_ly_to_zero() {
        let mut io = IoBank::new();
        let mut ppu = Ppu::power_on();

        for _ in 0..144 {
            ppu.advance(&mut io, OAM_CYCLES);
            ppu.advance(&mut io, VRAM_CYCLES);
            ppu.advance(&mut io, HBLANK_CYCLES);
        }
        assert_eq!(ppu.mode(), PpuMode::VBlank);
        assert_eq!(io.read8(0xFF44).unwrap(), 144);

        ppu.advance(&mut io, VBLANK_CYCLES);
        assert_eq!(ppu.mode(), PpuMode::Oam);
        assert_eq!(io.read8(0xFF44).unwrap(), 0);
    }
}
