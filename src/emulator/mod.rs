// Emulator module - the orchestrator that owns and clocks every component
//
// The master clock runs at the PPU dot rate: each `clock()` advances the
// PPU by one dot and, on every third tick, the APU and CPU by one cycle.
// After the component updates the interrupt lines are sampled: the PPU's
// one-shot NMI is forwarded as an edge, while the mapper and APU IRQ
// lines are re-latched level-style every tick they are held.
//
// `run_frame()` drives the clock until the PPU signals a completed frame
// (89,342 dots, or 89,341 on odd rendered frames), then drains any
// partially executed CPU instruction so the next frame starts on an
// instruction boundary.

mod battery;

pub use battery::BatteryError;

use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, INesError};
use crate::cpu::Cpu;
use crate::input::Buttons;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// PPU dots per CPU cycle
const PPU_DOTS_PER_CPU_CYCLE: u64 = 3;

/// Main emulator structure
///
/// Owns the CPU and the bus (which in turn owns RAM, PPU, APU,
/// controllers, and the shared mapper handle) and exposes the host API.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,

    /// Master ticks since power-on (one per PPU dot)
    master_clock: u64,

    /// CRC32 of PRG+CHR, the battery-save key
    cartridge_fingerprint: u32,

    /// True when the cartridge declared battery-backed PRG-RAM
    has_battery: bool,
}

impl Emulator {
    /// Build an emulator from a raw iNES image
    ///
    /// # Errors
    /// `BadMagic`, `TruncatedFile`, `TrainerPresent`, or
    /// `UnsupportedMapper` per the cartridge loader; on success the CPU
    /// has already been reset through the cartridge's reset vector.
    ///
    /// # Example
    /// ```no_run
    /// use famicore::Emulator;
    ///
    /// let bytes = std::fs::read("game.nes").unwrap();
    /// let mut emulator = Emulator::load(&bytes).unwrap();
    /// emulator.run_frame();
    /// let frame = emulator.frame_buffer();
    /// ```
    pub fn load(bytes: &[u8]) -> Result<Self, INesError> {
        let cartridge = Cartridge::from_bytes(bytes)?;
        let cartridge_fingerprint = cartridge.fingerprint();
        let has_battery = cartridge.has_battery;

        let mapper = Rc::new(RefCell::new(create_mapper(cartridge)?));
        let mut bus = Bus::new();
        bus.attach_mapper(mapper);

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        Ok(Emulator {
            cpu,
            bus,
            master_clock: 0,
            cartridge_fingerprint,
            has_battery,
        })
    }

    /// Build an emulator from a `.nes` file on disk
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, INesError> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    /// Reset the console: RAM zeroed, components back to power-on state,
    /// PC reloaded from the reset vector
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.master_clock = 0;
    }

    // ========================================
    // Master clock
    // ========================================

    /// Advance the console by one master tick (one PPU dot)
    pub fn clock(&mut self) {
        self.bus.ppu_mut().clock();

        if self.master_clock % PPU_DOTS_PER_CPU_CYCLE == 0 {
            self.bus.apu_mut().clock();
            self.cpu.clock(&mut self.bus);

            // A $4014 write during that CPU cycle kicks off OAM DMA: the
            // copy happens now and the CPU stalls while the PPU keeps
            // clocking. Alignment costs one extra cycle on odd cycles.
            if let Some(page) = self.bus.take_dma_request() {
                self.bus.run_oam_dma(page);
                let stall = 513 + (self.cpu.cycles & 1) as u32;
                self.cpu.add_stall_cycles(stall);
            }
        }

        self.master_clock += 1;
        self.sample_interrupt_lines();
    }

    /// Forward component interrupt lines to the CPU
    fn sample_interrupt_lines(&mut self) {
        if self.bus.ppu().nmi_pending() {
            self.cpu.request_nmi();
            self.bus.ppu_mut().clear_nmi();
        }

        let mapper_irq = self
            .bus
            .mapper()
            .is_some_and(|mapper| mapper.borrow().irq_line());
        if mapper_irq || self.bus.apu().irq_line() {
            self.cpu.request_irq();
        }
    }

    /// Run until the PPU completes the current frame, then drain the
    /// CPU's pending cycles
    ///
    /// Bounded by one full PPU frame of ticks; never blocks on host I/O.
    pub fn run_frame(&mut self) {
        loop {
            self.clock();
            if self.bus.ppu_mut().take_frame_complete() {
                break;
            }
        }

        // Finish the instruction in flight so the frame boundary is also
        // an instruction boundary. These cycles intentionally run without
        // PPU dots; the ratio property tolerates the skew.
        while self.cpu.pending_cycles() > 0 {
            self.bus.apu_mut().clock();
            self.cpu.clock(&mut self.bus);
        }
    }

    // ========================================
    // Host API
    // ========================================

    /// The last completed frame as palette indices (0-63), 256x240
    pub fn frame_buffer(&self) -> &[u8] {
        self.bus.ppu().frame()
    }

    /// Update the live button state for a controller port (0 or 1)
    pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
        self.bus.controllers_mut().set_buttons(port, buttons);
    }

    /// Side-effect-free CPU-space read (tests and debuggers)
    pub fn peek_cpu(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Patch a byte in CPU space without bus side effects (tests)
    pub fn poke_cpu(&mut self, addr: u16, value: u8) {
        self.bus.poke(addr, value);
    }

    /// Master ticks since power-on (one per PPU dot)
    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal NROM image: the program spins in place, vectors at $FFFC
    pub(super) fn test_rom(program: &[u8]) -> Vec<u8> {
        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = 1; // 16KB PRG
        image[5] = 1; // 8KB CHR

        let mut prg = vec![0xEAu8; 16 * 1024]; // NOP sled
        prg[..program.len()].copy_from_slice(program);
        // Reset vector -> $8000; NMI and IRQ vectors -> $8000 too
        prg[0x3FFA] = 0x00;
        prg[0x3FFB] = 0x80;
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0x80;
        prg[0x3FFE] = 0x00;
        prg[0x3FFF] = 0x80;

        image.extend_from_slice(&prg);
        image.extend(std::iter::repeat(0).take(8 * 1024));
        image
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            Emulator::load(&[0u8; 64]),
            Err(INesError::BadMagic)
        ));
        assert!(matches!(Emulator::load(&[]), Err(INesError::TruncatedFile)));
    }

    #[test]
    fn test_load_rejects_unsupported_mapper() {
        let mut image = test_rom(&[]);
        image[6] = 0x50; // mapper 5 low nibble
        assert!(matches!(
            Emulator::load(&image),
            Err(INesError::UnsupportedMapper(5))
        ));
    }

    #[test]
    fn test_load_resets_pc_from_vector() {
        let emulator = Emulator::load(&test_rom(&[])).unwrap();
        assert_eq!(emulator.cpu().pc, 0x8000);
    }

    #[test]
    fn test_clock_ratio() {
        let mut emulator = Emulator::load(&test_rom(&[])).unwrap();
        let start_cycles = emulator.cpu().cycles;
        for _ in 0..300 {
            emulator.clock();
        }
        let cpu_cycles = emulator.cpu().cycles - start_cycles;
        assert_eq!(cpu_cycles, 100, "CPU runs every third master tick");
    }

    #[test]
    fn test_run_frame_terminates_on_boundary() {
        let mut emulator = Emulator::load(&test_rom(&[])).unwrap();
        emulator.run_frame();
        assert_eq!(emulator.cpu().pending_cycles(), 0);
        assert_eq!(emulator.bus().ppu().frame_count(), 1);
    }

    #[test]
    fn test_peek_poke_round_trip() {
        let mut emulator = Emulator::load(&test_rom(&[])).unwrap();
        emulator.poke_cpu(0x0002, 0xAB);
        assert_eq!(emulator.peek_cpu(0x0002), 0xAB);

        // Vector patching for test harnesses (nestest-style)
        emulator.poke_cpu(0xFFFC, 0x00);
        emulator.poke_cpu(0xFFFD, 0xC0);
        emulator.reset();
        assert_eq!(emulator.cpu().pc, 0xC000);
    }

    #[test]
    fn test_reset_zeroes_ram() {
        let mut emulator = Emulator::load(&test_rom(&[])).unwrap();
        emulator.poke_cpu(0x0123, 0x55);
        emulator.reset();
        assert_eq!(emulator.peek_cpu(0x0123), 0);
    }
}
