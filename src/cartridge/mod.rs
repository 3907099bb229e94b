// Cartridge module - iNES image parsing and mapper access
//
// A cartridge is parsed once from an iNES v1 image and is immutable from
// then on; the mapper created from it owns the PRG/CHR data and any
// PRG-RAM.
//
// # iNES v1 Header Layout
//
// ```text
// Bytes 0-3: "NES\x1A" magic
// Byte 4:    PRG-ROM size in 16KB units
// Byte 5:    CHR-ROM size in 8KB units (0 = cartridge uses 8KB CHR-RAM)
// Byte 6:    Flags: mirroring (bit 0), battery (bit 1), trainer (bit 2),
//            four-screen (bit 3), mapper low nibble (bits 4-7)
// Byte 7:    Flags: console type (bits 0-1), iNES 2.0 tag (bits 2-3),
//            mapper high nibble (bits 4-7)
// Bytes 8-15: Unused by this core
// ```
//
// The header is followed by an optional 512-byte trainer (rejected here),
// then PRG-ROM, then CHR-ROM.

pub mod mappers;

pub use mappers::{create_mapper, Mapper};

use std::fmt;
use std::path::Path;

/// 16-byte iNES header size
const HEADER_SIZE: usize = 16;

/// PRG-ROM bank granularity (16KB)
const PRG_UNIT: usize = 16 * 1024;

/// CHR bank granularity (8KB)
const CHR_UNIT: usize = 8 * 1024;

/// Error type for iNES image loading
///
/// These are the only errors the core can produce; once an `Emulator` is
/// constructed, `run_frame` never fails.
#[derive(Debug)]
pub enum INesError {
    /// The file does not start with the "NES\x1A" magic bytes
    BadMagic,
    /// The file is shorter than the sizes declared in its header
    TruncatedFile,
    /// The image carries a 512-byte trainer, which this core refuses
    TrainerPresent,
    /// The mapper number is not one of the supported five
    UnsupportedMapper(u8),
    /// Underlying I/O failure when loading from a file path
    Io(std::io::Error),
}

impl fmt::Display for INesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            INesError::BadMagic => write!(f, "not an iNES image (bad magic)"),
            INesError::TruncatedFile => write!(f, "iNES image is truncated"),
            INesError::TrainerPresent => write!(f, "iNES trainers are not supported"),
            INesError::UnsupportedMapper(id) => write!(f, "mapper {} is not supported", id),
            INesError::Io(err) => write!(f, "failed to read iNES image: {}", err),
        }
    }
}

impl std::error::Error for INesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            INesError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for INesError {
    fn from(err: std::io::Error) -> Self {
        INesError::Io(err)
    }
}

/// Nametable mirroring arrangement
///
/// The cartridge header fixes an initial arrangement; MMC1 and MMC3 can
/// override it at runtime through their control registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400, $2800=$2C00 (vertical scrolling layouts)
    Horizontal,
    /// $2000=$2800, $2400=$2C00 (horizontal scrolling layouts)
    Vertical,
    /// All four nametables map to the first 1KB page
    SingleScreenLower,
    /// All four nametables map to the second 1KB page
    SingleScreenUpper,
    /// Cartridge supplies extra VRAM; all four pages are distinct
    FourScreen,
}

/// A parsed iNES cartridge
///
/// Holds the raw PRG and CHR images plus the header facts the rest of the
/// core needs. Created once per ROM load; the mapper takes ownership of it.
pub struct Cartridge {
    /// PRG-ROM image (multiple of 16KB)
    pub prg_rom: Vec<u8>,
    /// CHR image (multiple of 8KB); all zeroes when the cartridge uses CHR-RAM
    pub chr: Vec<u8>,
    /// True when the header declared zero CHR banks (8KB CHR-RAM)
    pub chr_is_ram: bool,
    /// Mapper number from the header nibbles
    pub mapper: u8,
    /// Initial nametable mirroring
    pub mirroring: Mirroring,
    /// True when PRG-RAM is battery-backed
    pub has_battery: bool,
}

impl Cartridge {
    /// Parse an iNES v1 image from raw bytes
    ///
    /// # Arguments
    /// * `bytes` - The full file contents, header included
    ///
    /// # Errors
    /// * `BadMagic` when the magic bytes are wrong
    /// * `TruncatedFile` when the data is shorter than the header declares
    /// * `TrainerPresent` when byte 6 bit 2 is set
    ///
    /// # Example
    /// ```
    /// use famicore::cartridge::Cartridge;
    ///
    /// let mut image = vec![0u8; 16 + 16 * 1024 + 8 * 1024];
    /// image[0..4].copy_from_slice(b"NES\x1A");
    /// image[4] = 1; // one 16KB PRG bank
    /// image[5] = 1; // one 8KB CHR bank
    /// let cartridge = Cartridge::from_bytes(&image).unwrap();
    /// assert_eq!(cartridge.mapper, 0);
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, INesError> {
        if bytes.len() < HEADER_SIZE {
            return Err(INesError::TruncatedFile);
        }
        if &bytes[0..4] != b"NES\x1A" {
            return Err(INesError::BadMagic);
        }

        let prg_banks = bytes[4] as usize;
        let chr_banks = bytes[5] as usize;
        let flags6 = bytes[6];
        let flags7 = bytes[7];

        if flags6 & 0x04 != 0 {
            log::warn!("rejecting iNES image with trainer");
            return Err(INesError::TrainerPresent);
        }

        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        let has_battery = flags6 & 0x02 != 0;
        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        if prg_banks == 0 {
            // No PRG means nothing to execute; treat like a cut-off file
            return Err(INesError::TruncatedFile);
        }

        let prg_size = prg_banks * PRG_UNIT;
        let chr_size = chr_banks * CHR_UNIT;
        if bytes.len() < HEADER_SIZE + prg_size + chr_size {
            return Err(INesError::TruncatedFile);
        }

        let prg_rom = bytes[HEADER_SIZE..HEADER_SIZE + prg_size].to_vec();
        let chr_is_ram = chr_banks == 0;
        let chr = if chr_is_ram {
            // Zero CHR banks means the cartridge carries 8KB of CHR-RAM
            vec![0; CHR_UNIT]
        } else {
            bytes[HEADER_SIZE + prg_size..HEADER_SIZE + prg_size + chr_size].to_vec()
        };

        log::info!(
            "loaded iNES image: mapper {}, {}KB PRG, {}KB {}, {:?} mirroring{}",
            mapper,
            prg_size / 1024,
            chr.len() / 1024,
            if chr_is_ram { "CHR-RAM" } else { "CHR-ROM" },
            mirroring,
            if has_battery { ", battery" } else { "" },
        );

        Ok(Cartridge {
            prg_rom,
            chr,
            chr_is_ram,
            mapper,
            mirroring,
            has_battery,
        })
    }

    /// Parse an iNES image from a file path
    ///
    /// Thin convenience wrapper over [`Cartridge::from_bytes`].
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, INesError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// CRC32 fingerprint over PRG+CHR
    ///
    /// Used to key battery-backed PRG-RAM save files to the cartridge they
    /// belong to.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.prg_rom);
        hasher.update(&self.chr);
        hasher.finalize()
    }
}
