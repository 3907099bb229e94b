// Mapper 3 (CNROM) - switchable 8KB CHR bank
//
// Memory layout:
// - CPU $8000-$FFFF: PRG-ROM, fixed (16KB mirrored or 32KB linear)
// - PPU $0000-$1FFF: 8KB CHR-ROM bank selected by the register
//
// Any write to $8000-$FFFF loads the CHR bank register.

use crate::cartridge::{Cartridge, Mirroring};

use super::Mapper;

/// CHR bank size (8KB)
const CHR_BANK_SIZE: usize = 8 * 1024;

/// Mapper 3 implementation (CNROM)
///
/// Used by Arkanoid, Gradius and Solomon's Key. PRG is as fixed as NROM;
/// only the pattern tables swap.
pub struct Mapper3 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    mirroring: Mirroring,

    /// Selected 8KB CHR bank
    chr_bank: usize,
    /// Number of 8KB CHR banks
    chr_banks: usize,
}

impl Mapper3 {
    pub fn new(cartridge: Cartridge) -> Self {
        let chr_banks = (cartridge.chr.len() / CHR_BANK_SIZE).max(1);

        Mapper3 {
            prg_rom: cartridge.prg_rom,
            chr: cartridge.chr,
            mirroring: cartridge.mirroring,
            chr_bank: 0,
            chr_banks,
        }
    }

    fn prg_offset(&self, address: u16) -> usize {
        (address as usize - 0x8000) % self.prg_rom.len()
    }
}

impl Mapper for Mapper3 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x8000..=0xFFFF => self.prg_rom[self.prg_offset(address)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        if let 0x8000..=0xFFFF = address {
            self.chr_bank = value as usize % self.chr_banks;
        }
    }

    fn ppu_read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr[self.chr_bank * CHR_BANK_SIZE + address as usize],
            _ => 0,
        }
    }

    fn ppu_write(&mut self, _address: u16, _value: u8) {
        // CNROM carries CHR-ROM; writes are discarded
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.chr_bank = 0;
    }

    fn poke_prg(&mut self, address: u16, value: u8) {
        if let 0x8000..=0xFFFF = address {
            let offset = self.prg_offset(address);
            self.prg_rom[offset] = value;
        }
    }
}
