// Battery-backed PRG-RAM persistence
//
// The only state persisted per cartridge is the 8KB PRG-RAM block of
// battery boards, keyed by the CRC32 fingerprint of PRG+CHR so saves
// follow the cartridge rather than the file name.

use super::Emulator;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for battery save/load operations
#[derive(Debug)]
pub enum BatteryError {
    /// The loaded cartridge has no battery-backed PRG-RAM
    NoBatteryRam,
    /// A save file exists but its size does not match the PRG-RAM block
    SizeMismatch { expected: usize, found: usize },
    /// Underlying filesystem failure
    Io(std::io::Error),
}

impl fmt::Display for BatteryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryError::NoBatteryRam => {
                write!(f, "cartridge has no battery-backed PRG-RAM")
            }
            BatteryError::SizeMismatch { expected, found } => {
                write!(f, "save file is {} bytes, expected {}", found, expected)
            }
            BatteryError::Io(err) => write!(f, "battery save I/O error: {}", err),
        }
    }
}

impl std::error::Error for BatteryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatteryError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BatteryError {
    fn from(err: std::io::Error) -> Self {
        BatteryError::Io(err)
    }
}

impl Emulator {
    /// True when the cartridge declared battery-backed PRG-RAM
    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// Save-file key for this cartridge: CRC32 over PRG+CHR as hex
    pub fn battery_key(&self) -> String {
        format!("{:08x}", self.cartridge_fingerprint)
    }

    /// Copy of the battery PRG-RAM block, if the cartridge has one
    pub fn battery_ram(&self) -> Option<Vec<u8>> {
        if !self.has_battery {
            return None;
        }
        self.bus
            .mapper()
            .and_then(|mapper| mapper.borrow().prg_ram().map(<[u8]>::to_vec))
    }

    /// Restore a previously saved PRG-RAM block
    pub fn restore_battery_ram(&mut self, data: &[u8]) -> Result<(), BatteryError> {
        if !self.has_battery {
            return Err(BatteryError::NoBatteryRam);
        }
        let mapper = self.bus.mapper().ok_or(BatteryError::NoBatteryRam)?;
        let mut mapper = mapper.borrow_mut();
        let ram = mapper.prg_ram_mut().ok_or(BatteryError::NoBatteryRam)?;
        if ram.len() != data.len() {
            return Err(BatteryError::SizeMismatch {
                expected: ram.len(),
                found: data.len(),
            });
        }
        ram.copy_from_slice(data);
        Ok(())
    }

    /// Write the battery block to `<dir>/<key>.sav`
    pub fn save_battery<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, BatteryError> {
        let ram = self.battery_ram().ok_or(BatteryError::NoBatteryRam)?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.as_ref().join(format!("{}.sav", self.battery_key()));
        std::fs::write(&path, ram)?;
        log::info!("battery RAM saved to {}", path.display());
        Ok(path)
    }

    /// Load the battery block from `<dir>/<key>.sav` if it exists
    ///
    /// Returns `Ok(false)` when no save file is present.
    pub fn load_battery<P: AsRef<Path>>(&mut self, dir: P) -> Result<bool, BatteryError> {
        if !self.has_battery {
            return Err(BatteryError::NoBatteryRam);
        }
        let path = dir.as_ref().join(format!("{}.sav", self.battery_key()));
        if !path.exists() {
            return Ok(false);
        }
        let data = std::fs::read(&path)?;
        self.restore_battery_ram(&data)?;
        log::info!("battery RAM loaded from {}", path.display());
        Ok(true)
    }
}
