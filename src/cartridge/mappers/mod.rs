// Mappers module - cartridge bank-switching hardware
//
// Each mapper translates CPU accesses in $6000-$FFFF and PPU accesses in
// $0000-$1FFF to offsets inside the PRG/CHR images, advertises the current
// nametable mirroring, and (MMC3) drives a scanline-counted IRQ line.

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;
mod mapper4;

use super::{Cartridge, INesError, Mirroring};

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;
pub use mapper3::Mapper3;
pub use mapper4::Mapper4;

/// Interface implemented by every cartridge mapper
///
/// The bus routes CPU accesses at $4020-$FFFF here; the PPU routes pattern
/// table accesses at $0000-$1FFF here. The PPU additionally calls
/// `clock_scanline` from inside its dot state machine so mappers with
/// scanline counters (MMC3) never need a back-pointer into the PPU.
pub trait Mapper {
    /// Read a byte from CPU address space ($4020-$FFFF)
    fn cpu_read(&self, address: u16) -> u8;

    /// Write a byte to CPU address space (mapper registers, PRG-RAM)
    fn cpu_write(&mut self, address: u16, value: u8);

    /// Read a byte from PPU address space ($0000-$1FFF)
    fn ppu_read(&self, address: u16) -> u8;

    /// Write a byte to PPU address space (CHR-RAM only)
    fn ppu_write(&mut self, address: u16, value: u8);

    /// Current nametable mirroring (may differ from the cartridge header)
    fn mirroring(&self) -> Mirroring;

    /// Level state of the mapper IRQ line
    fn irq_line(&self) -> bool {
        false
    }

    /// Scanline tick, called by the PPU at dot 260 of visible and
    /// pre-render scanlines while rendering is enabled
    fn clock_scanline(&mut self) {}

    /// Return the mapper registers to their power-on state
    ///
    /// PRG/CHR images and PRG-RAM contents are left alone.
    fn reset(&mut self) {}

    /// Battery-backed PRG-RAM block, if the mapper carries one
    fn prg_ram(&self) -> Option<&[u8]> {
        None
    }

    /// Mutable battery-backed PRG-RAM block, if the mapper carries one
    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        None
    }

    /// Overwrite a byte of the PRG image at its currently mapped offset
    ///
    /// Test-only escape hatch used by `Emulator::poke_cpu`; has no
    /// CPU-visible side effects beyond the patched byte.
    fn poke_prg(&mut self, _address: u16, _value: u8) {}
}

/// Create a mapper instance for a parsed cartridge
///
/// # Arguments
/// * `cartridge` - The cartridge to hand over to the mapper
///
/// # Errors
/// Returns `INesError::UnsupportedMapper` for mapper numbers outside the
/// supported set {0, 1, 2, 3, 4}.
pub fn create_mapper(cartridge: Cartridge) -> Result<Box<dyn Mapper>, INesError> {
    match cartridge.mapper {
        0 => Ok(Box::new(Mapper0::new(cartridge))),
        1 => Ok(Box::new(Mapper1::new(cartridge))),
        2 => Ok(Box::new(Mapper2::new(cartridge))),
        3 => Ok(Box::new(Mapper3::new(cartridge))),
        4 => Ok(Box::new(Mapper4::new(cartridge))),
        id => {
            log::warn!("unsupported mapper {}", id);
            Err(INesError::UnsupportedMapper(id))
        }
    }
}

/// Build a cartridge for mapper unit tests
///
/// Every PRG byte holds its 8KB bank number and every CHR byte its 1KB
/// page number, so bank arithmetic mistakes show up as value mismatches.
#[cfg(test)]
pub(crate) fn test_cartridge(
    mapper: u8,
    prg_banks: usize,
    chr_banks: usize,
    mirroring: Mirroring,
) -> Cartridge {
    let prg_rom: Vec<u8> = (0..prg_banks * 16 * 1024)
        .map(|i| (i / (8 * 1024)) as u8)
        .collect();
    let chr_is_ram = chr_banks == 0;
    let chr: Vec<u8> = if chr_is_ram {
        vec![0; 8 * 1024]
    } else {
        (0..chr_banks * 8 * 1024).map(|i| (i / 1024) as u8).collect()
    };

    Cartridge {
        prg_rom,
        chr,
        chr_is_ram,
        mapper,
        mirroring,
        has_battery: false,
    }
}
