// PPU test suite
//
// Shared helpers for the register, memory, timing, rendering, and quirk
// tests. Tests drive the PPU directly, attaching a CHR-RAM NROM mapper
// when pattern-table contents matter.

mod memory;
mod registers;
mod rendering;

use super::Ppu;
use crate::cartridge::mappers::{create_mapper, test_cartridge, Mapper};
use crate::cartridge::Mirroring;
use std::cell::RefCell;
use std::rc::Rc;

/// PPU dots in an even frame
const DOTS_PER_FRAME: u64 = 341 * 262;

/// A PPU wired to an NROM cartridge with writable CHR-RAM
fn ppu_with_chr_ram(mirroring: Mirroring) -> Ppu {
    let mapper = create_mapper(test_cartridge(0, 1, 0, mirroring)).unwrap();
    let mut ppu = Ppu::new();
    ppu.set_mapper(Rc::new(RefCell::new(mapper)));
    ppu
}

/// A PPU wired to a specific mapper instance
fn ppu_with_mapper(mapper: Rc<RefCell<Box<dyn Mapper>>>) -> Ppu {
    let mut ppu = Ppu::new();
    ppu.set_mapper(mapper);
    ppu
}

/// Clock until the PPU sits at exactly (scanline, dot)
fn clock_to(ppu: &mut Ppu, scanline: i16, dot: u16) {
    let mut guard = 0u64;
    while !(ppu.scanline == scanline && ppu.dot == dot) {
        ppu.clock();
        guard += 1;
        assert!(guard <= 2 * DOTS_PER_FRAME, "never reached ({}, {})", scanline, dot);
    }
}

/// Run exactly one frame's worth of completion signal
fn clock_one_frame(ppu: &mut Ppu) -> u64 {
    let mut dots = 0u64;
    loop {
        ppu.clock();
        dots += 1;
        if ppu.take_frame_complete() {
            return dots;
        }
        assert!(dots <= 2 * DOTS_PER_FRAME, "frame never completed");
    }
}
