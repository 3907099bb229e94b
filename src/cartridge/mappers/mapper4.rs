// Mapper 4 (MMC3) - 8KB PRG / 1-2KB CHR banking with a scanline IRQ
//
// Memory layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (battery-backed on some boards)
// - CPU $8000-$9FFF: 8KB PRG bank, switchable via R6 (or fixed, mode 1)
// - CPU $A000-$BFFF: 8KB PRG bank, always switchable via R7
// - CPU $C000-$DFFF: 8KB PRG bank, fixed second-to-last (or R6, mode 1)
// - CPU $E000-$FFFF: 8KB PRG bank, always fixed to the last bank
// - PPU: two 2KB CHR banks (R0, R1) and four 1KB banks (R2-R5); bit 7 of
//   the bank-select byte swaps which half of the pattern space gets which
//
// Register pairs, dispatched by (address & $E001):
//   $8000 bank select   $8001 bank data
//   $A000 mirroring     $A001 PRG-RAM protect
//   $C000 IRQ latch     $C001 IRQ reload
//   $E000 IRQ disable   $E001 IRQ enable
//
// The IRQ counter is clocked once per scanline by the PPU (A12 rise,
// delivered here as `clock_scanline`): a zero or reload-pending counter
// reloads from the latch, otherwise it decrements; reaching zero with IRQ
// enabled asserts the line until $E000 is written.

use crate::cartridge::{Cartridge, Mirroring};

use super::Mapper;

/// PRG bank size (8KB)
const PRG_BANK_SIZE: usize = 8 * 1024;

/// CHR bank granularity (1KB)
const CHR_BANK_SIZE: usize = 1024;

/// PRG-RAM size (8KB)
const PRG_RAM_SIZE: usize = 8 * 1024;

/// Mapper 4 implementation (MMC3)
///
/// Used by Super Mario Bros. 3, Kirby's Adventure and most of the late
/// first-party catalog; the scanline IRQ drives their status-bar splits.
pub struct Mapper4 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,

    /// Bank select: target register in bits 0-2, PRG mode bit 6, CHR mode bit 7
    bank_select: u8,
    /// Bank registers R0-R7 (R0-R5 CHR, R6-R7 PRG)
    bank_registers: [u8; 8],
    mirroring: Mirroring,
    /// True when the header forced four-screen VRAM (mirroring locked)
    four_screen: bool,
    /// Bit 7 enables PRG-RAM, bit 6 write-protects it
    prg_ram_protect: u8,

    /// IRQ counter reload value
    irq_latch: u8,
    /// IRQ down-counter, clocked per scanline
    irq_counter: u8,
    /// Reload the counter on the next scanline clock
    irq_reload_pending: bool,
    irq_enabled: bool,
    /// Level state of the IRQ line
    irq_pending: bool,

    /// Number of 8KB PRG banks
    prg_banks: usize,
    /// Number of 1KB CHR banks
    chr_banks: usize,
}

impl Mapper4 {
    pub fn new(cartridge: Cartridge) -> Self {
        let prg_banks = cartridge.prg_rom.len() / PRG_BANK_SIZE;
        let chr_banks = (cartridge.chr.len() / CHR_BANK_SIZE).max(1);
        let four_screen = cartridge.mirroring == Mirroring::FourScreen;

        Mapper4 {
            prg_rom: cartridge.prg_rom,
            chr: cartridge.chr,
            chr_is_ram: cartridge.chr_is_ram,
            prg_ram: vec![0; PRG_RAM_SIZE],
            bank_select: 0,
            bank_registers: [0; 8],
            mirroring: cartridge.mirroring,
            four_screen,
            // Enabled and writable until the game says otherwise
            prg_ram_protect: 0x80,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload_pending: false,
            irq_enabled: false,
            irq_pending: false,
            prg_banks,
            chr_banks,
        }
    }

    /// True when $C000 holds the switchable bank and $8000 the fixed one
    fn prg_mode_swapped(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    /// True when the 2KB CHR banks sit at $1000 instead of $0000
    fn chr_mode_inverted(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    fn prg_offset(&self, address: u16) -> usize {
        let r6 = self.bank_registers[6] as usize;
        let r7 = self.bank_registers[7] as usize;
        let bank = match address {
            0x8000..=0x9FFF => {
                if self.prg_mode_swapped() {
                    self.prg_banks - 2
                } else {
                    r6
                }
            }
            0xA000..=0xBFFF => r7,
            0xC000..=0xDFFF => {
                if self.prg_mode_swapped() {
                    r6
                } else {
                    self.prg_banks - 2
                }
            }
            _ => self.prg_banks - 1,
        };
        (bank % self.prg_banks) * PRG_BANK_SIZE + (address as usize & 0x1FFF)
    }

    fn chr_offset(&self, address: u16) -> usize {
        // Fold the inversion away: with bit 7 set the two halves of the
        // pattern space swap roles, which is an XOR on A12.
        let address = if self.chr_mode_inverted() {
            address ^ 0x1000
        } else {
            address
        };

        let slot = (address >> 10) as usize; // 1KB slot 0-7
        let bank = match slot {
            0 => (self.bank_registers[0] & 0xFE) as usize,
            1 => (self.bank_registers[0] | 0x01) as usize,
            2 => (self.bank_registers[1] & 0xFE) as usize,
            3 => (self.bank_registers[1] | 0x01) as usize,
            s => self.bank_registers[s - 2] as usize,
        };
        (bank % self.chr_banks) * CHR_BANK_SIZE + (address as usize & 0x03FF)
    }

    fn prg_ram_enabled(&self) -> bool {
        self.prg_ram_protect & 0x80 != 0
    }

    fn prg_ram_writable(&self) -> bool {
        self.prg_ram_enabled() && self.prg_ram_protect & 0x40 == 0
    }
}

impl Mapper for Mapper4 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled() {
                    self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE]
                } else {
                    0
                }
            }
            0x8000..=0xFFFF => self.prg_rom[self.prg_offset(address)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => {
                if self.prg_ram_writable() {
                    self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE] = value;
                }
            }
            0x8000..=0xFFFF => match address & 0xE001 {
                0x8000 => self.bank_select = value,
                0x8001 => {
                    let target = (self.bank_select & 0x07) as usize;
                    self.bank_registers[target] = value;
                }
                0xA000 => {
                    // Four-screen boards ignore the mirroring register
                    if !self.four_screen {
                        self.mirroring = if value & 0x01 != 0 {
                            Mirroring::Horizontal
                        } else {
                            Mirroring::Vertical
                        };
                    }
                }
                0xA001 => self.prg_ram_protect = value,
                0xC000 => self.irq_latch = value,
                0xC001 => self.irq_reload_pending = true,
                0xE000 => {
                    self.irq_enabled = false;
                    self.irq_pending = false;
                }
                0xE001 => self.irq_enabled = true,
                _ => {}
            },
            _ => {}
        }
    }

    fn ppu_read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr[self.chr_offset(address) % self.chr.len()],
            _ => 0,
        }
    }

    fn ppu_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            if let 0x0000..=0x1FFF = address {
                let offset = self.chr_offset(address) % self.chr.len();
                self.chr[offset] = value;
            }
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn irq_line(&self) -> bool {
        self.irq_pending
    }

    fn clock_scanline(&mut self) {
        if self.irq_counter == 0 || self.irq_reload_pending {
            self.irq_counter = self.irq_latch;
            self.irq_reload_pending = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    fn reset(&mut self) {
        self.bank_select = 0;
        self.bank_registers = [0; 8];
        self.prg_ram_protect = 0x80;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload_pending = false;
        self.irq_enabled = false;
        self.irq_pending = false;
    }

    fn prg_ram(&self) -> Option<&[u8]> {
        Some(&self.prg_ram)
    }

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.prg_ram)
    }

    fn poke_prg(&mut self, address: u16, value: u8) {
        if let 0x8000..=0xFFFF = address {
            let offset = self.prg_offset(address);
            self.prg_rom[offset] = value;
        }
    }
}
