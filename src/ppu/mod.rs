// PPU module - Picture Processing Unit implementation
//
// This is a cycle-driven 2C02 implementation: every call to `clock()`
// advances the PPU by one dot, and all observable behavior falls out of
// the (scanline, dot) state machine.
//
// ## Frame structure (NTSC)
//
// - Scanline -1: pre-render. Clears the status flags at dot 1, repeats the
//   background fetch pattern of a visible line to prime the shifters, and
//   copies the vertical scroll bits during dots 280-304. Dot 0 is skipped
//   on odd frames while rendering is enabled.
// - Scanlines 0-239: visible. One pixel is produced per dot in 1-256 while
//   the background pipeline fetches the tile data two tiles ahead and the
//   sprite pipeline prepares the next line.
// - Scanline 240: post-render, idle.
// - Scanlines 241-260: vertical blank. The VBlank flag rises at
//   (241, dot 1) and an NMI is generated if enabled.
//
// ## Background pipeline
//
// Dots 1-256 and 321-336 run the 8-dot fetch cycle: nametable byte,
// attribute byte, pattern low plane, pattern high plane, then the latches
// load into the high byte of four 16-bit shift registers while the coarse
// X scroll increments. The shifters advance one bit per dot in 2-257 and
// 322-337; `fine_x` selects the output bit.
//
// ## Sprite pipeline
//
// Secondary OAM is cleared to $FF in dots 1-64, the 64-sprite scan picks
// up to eight sprites for the next line in dots 65-256 (setting overflow
// on the ninth), and pattern fetches for the chosen sprites occupy dots
// 257-320, during which `oam_addr` is held at zero.

mod constants;
mod memory;
mod registers;
mod rendering;

use crate::bus::MemoryMappedDevice;
use crate::cartridge::{Mapper, Mirroring};
use constants::*;
use std::cell::RefCell;
use std::rc::Rc;

/// One of the eight per-scanline sprite slots
///
/// `x` counts down once per dot; when it reaches zero the pattern
/// registers shift out one pixel per dot.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct SpriteUnit {
    pub(super) x: u8,
    pub(super) attributes: u8,
    pub(super) pattern_low: u8,
    pub(super) pattern_high: u8,
    pub(super) is_sprite_zero: bool,
}

/// PPU state: registers, memories, and the rendering pipelines
pub struct Ppu {
    // ========================================
    // CPU-visible registers
    // ========================================
    /// $2000: PPUCTRL (nametable select, increment, pattern tables,
    /// sprite size, NMI enable)
    pub(crate) ppuctrl: u8,

    /// $2001: PPUMASK (greyscale, left-column masks, show bg/sprites,
    /// color emphasis)
    pub(crate) ppumask: u8,

    /// $2003: OAMADDR
    pub(crate) oam_addr: u8,

    // ========================================
    // Internal scroll/address registers (loopy v/t/x/w)
    // ========================================
    /// Current VRAM address; doubles as the live scroll position.
    /// Bit layout: yyy NN YYYYY XXXXX (fine Y, nametable, coarse Y, coarse X)
    pub(crate) v: u16,

    /// Temporary VRAM address ("top-left of the screen")
    pub(crate) t: u16,

    /// Fine X scroll (3 bits)
    pub(crate) fine_x: u8,

    /// First/second write toggle shared by $2005 and $2006
    pub(crate) write_toggle: bool,

    /// One-deep read buffer for $2007
    pub(crate) read_buffer: u8,

    // ========================================
    // Status flags (PPUSTATUS bits 5-7)
    // ========================================
    pub(crate) vblank: bool,
    pub(crate) sprite_zero_hit: bool,
    pub(crate) sprite_overflow: bool,

    // ========================================
    // NMI generation
    // ========================================
    /// PPUCTRL bit 7
    pub(crate) nmi_output: bool,
    /// Set at VBlank start, cleared by $2002 reads and pre-render dot 1
    pub(crate) nmi_occurred: bool,
    /// One-shot set on the rising edge of (nmi_output && nmi_occurred);
    /// consumed by the orchestrator
    pub(crate) nmi_pending: bool,

    // ========================================
    // Memories
    // ========================================
    /// 2KB internal VRAM backing the four logical nametables
    pub(crate) vram: [u8; VRAM_SIZE],

    /// 32 bytes of palette RAM
    /// ($3F10/$14/$18/$1C alias onto $3F00/$04/$08/$0C)
    pub(crate) palette_ram: [u8; PALETTE_SIZE],

    /// Primary OAM: 64 sprites, 4 bytes each
    pub(crate) oam: [u8; 256],

    /// Secondary OAM: the up-to-8 sprites picked for the next scanline
    pub(crate) secondary_oam: [u8; 32],

    /// Fallback mirroring when no cartridge is attached
    pub(crate) mirroring: Mirroring,

    /// Mapper shared with the bus; provides pattern-table access and the
    /// scanline IRQ hook. None until a cartridge is loaded.
    pub(crate) mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,

    // ========================================
    // Scheduler state
    // ========================================
    /// Current scanline: -1 is pre-render, 0-239 visible, 240 post-render,
    /// 241-260 vertical blank
    pub(crate) scanline: i16,

    /// Current dot within the scanline (0-340)
    pub(crate) dot: u16,

    /// Frames completed since power-on
    pub(crate) frame: u64,

    /// Parity of the current frame (drives the pre-render dot skip)
    pub(crate) odd_frame: bool,

    /// Set when a frame finishes; consumed via `take_frame_complete`
    frame_complete: bool,

    // ========================================
    // Background pipeline
    // ========================================
    /// Fetch latches filled by the 8-dot cycle
    pub(super) nt_byte: u8,
    pub(super) at_byte: u8,
    pub(super) pt_low: u8,
    pub(super) pt_high: u8,

    /// 16-bit pattern shifters (high byte = tile being drawn)
    pub(super) bg_pattern_shift_low: u16,
    pub(super) bg_pattern_shift_high: u16,

    /// 16-bit attribute shifters; the reload duplicates the palette bit
    /// across the low byte
    pub(super) bg_attribute_shift_low: u16,
    pub(super) bg_attribute_shift_high: u16,

    // ========================================
    // Sprite pipeline
    // ========================================
    pub(super) sprite_units: [SpriteUnit; 8],
    pub(super) sprite_count: usize,

    // ========================================
    // Output
    // ========================================
    /// 256x240 palette indices (0-63); hosts convert to RGB
    pub(crate) frame_buffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Ppu {
    /// Create a new PPU in its power-on state
    pub fn new() -> Self {
        Ppu {
            ppuctrl: 0x00,
            ppumask: 0x00,
            oam_addr: 0x00,
            v: 0x0000,
            t: 0x0000,
            fine_x: 0,
            write_toggle: false,
            read_buffer: 0x00,
            vblank: false,
            sprite_zero_hit: false,
            sprite_overflow: false,
            nmi_output: false,
            nmi_occurred: false,
            nmi_pending: false,
            vram: [0; VRAM_SIZE],
            palette_ram: [0; PALETTE_SIZE],
            oam: [0; 256],
            secondary_oam: [0xFF; 32],
            mirroring: Mirroring::Horizontal,
            mapper: None,
            scanline: PRERENDER_SCANLINE,
            dot: 0,
            frame: 0,
            odd_frame: false,
            frame_complete: false,
            nt_byte: 0,
            at_byte: 0,
            pt_low: 0,
            pt_high: 0,
            bg_pattern_shift_low: 0,
            bg_pattern_shift_high: 0,
            bg_attribute_shift_low: 0,
            bg_attribute_shift_high: 0,
            sprite_units: [SpriteUnit::default(); 8],
            sprite_count: 0,
            frame_buffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Reset the PPU to its power-on state
    ///
    /// The attached mapper and its CHR contents are left alone; mirroring
    /// is re-read from the mapper on the next access.
    pub fn reset(&mut self) {
        let mapper = self.mapper.take();
        let mirroring = self.mirroring;
        *self = Ppu::new();
        self.mapper = mapper;
        self.mirroring = mirroring;
    }

    /// Attach the cartridge mapper shared with the bus
    pub fn set_mapper(&mut self, mapper: Rc<RefCell<Box<dyn Mapper>>>) {
        self.mirroring = mapper.borrow().mirroring();
        self.mapper = Some(mapper);
    }

    /// Write directly into primary OAM (used by OAM DMA)
    pub fn write_oam(&mut self, addr: u8, data: u8) {
        self.oam[addr as usize] = data;
    }

    /// Read directly from primary OAM (tests and debug)
    pub fn read_oam(&self, addr: u8) -> u8 {
        self.oam[addr as usize]
    }

    /// The rendered frame as palette indices (0-63), row-major 256x240
    pub fn frame(&self) -> &[u8] {
        &self.frame_buffer
    }

    /// Frames completed since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Current scanline (-1 through 260)
    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340)
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// True when a pending NMI has not yet been delivered to the CPU
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Acknowledge the pending NMI (called once the CPU has latched it)
    pub fn clear_nmi(&mut self) {
        self.nmi_pending = false;
    }

    /// Consume the frame-complete flag
    pub fn take_frame_complete(&mut self) -> bool {
        let complete = self.frame_complete;
        self.frame_complete = false;
        complete
    }

    /// True when background or sprite rendering is enabled
    pub fn rendering_enabled(&self) -> bool {
        self.ppumask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    // ========================================
    // Dot scheduler
    // ========================================

    /// Advance the PPU by one dot
    pub fn clock(&mut self) {
        // Odd frames drop dot 0 of the pre-render line while rendering is
        // enabled, shortening the frame to 89,341 dots.
        if self.scanline == PRERENDER_SCANLINE
            && self.dot == 0
            && self.odd_frame
            && self.rendering_enabled()
        {
            self.dot = 1;
        }

        match self.scanline {
            PRERENDER_SCANLINE..=LAST_VISIBLE_SCANLINE => self.render_line_dot(),
            POSTRENDER_SCANLINE => {}
            VBLANK_SCANLINE..=LAST_SCANLINE => {
                if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
                    self.enter_vblank();
                }
            }
            _ => {}
        }

        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = PRERENDER_SCANLINE;
                self.frame += 1;
                self.odd_frame = !self.odd_frame;
                self.frame_complete = true;
            }
        }
    }

    /// Raise the VBlank flag and generate an NMI if enabled
    fn enter_vblank(&mut self) {
        self.vblank = true;
        self.nmi_occurred = true;
        if self.nmi_output {
            self.nmi_pending = true;
        }
    }

    /// One dot of a pre-render or visible scanline
    fn render_line_dot(&mut self) {
        let pre_render = self.scanline == PRERENDER_SCANLINE;
        let rendering = self.rendering_enabled();

        if pre_render && self.dot == 1 {
            self.vblank = false;
            self.sprite_zero_hit = false;
            self.sprite_overflow = false;
            self.nmi_occurred = false;
        }

        // Background shifters advance one bit per dot in these windows
        if matches!(self.dot, 2..=257 | 322..=337) {
            self.shift_background_registers();
        }
        if matches!(self.dot, 2..=257) {
            self.update_sprite_units();
        }

        // 8-dot background fetch cycle
        if rendering && matches!(self.dot, 1..=256 | 321..=336) {
            match (self.dot - 1) % 8 {
                0 => {
                    self.load_background_shifters();
                    self.fetch_nametable_byte();
                }
                2 => self.fetch_attribute_byte(),
                4 => self.fetch_pattern_low(),
                6 => self.fetch_pattern_high(),
                7 => self.increment_scroll_x(),
                _ => {}
            }
        }

        if rendering {
            if self.dot == 256 {
                self.increment_scroll_y();
            }
            if self.dot == 257 {
                self.load_background_shifters();
                self.copy_horizontal_scroll();
            }
            if pre_render && matches!(self.dot, 280..=304) {
                self.copy_vertical_scroll();
            }

            // Sprite pipeline windows. Secondary OAM is wiped at the top
            // of the clear window; the scan result is latched as the fetch
            // window opens. oam_addr is forced to zero throughout 257-320.
            if !pre_render && self.dot == 1 {
                self.secondary_oam = [0xFF; 32];
            }
            if matches!(self.dot, 257..=320) {
                self.oam_addr = 0;
            }
            if self.dot == 257 {
                if pre_render {
                    self.sprite_count = 0;
                    self.sprite_units = [SpriteUnit::default(); 8];
                } else {
                    self.evaluate_sprites();
                    self.fetch_sprite_patterns();
                }
            }

            // Scanline notification for mappers with A12-driven counters
            if self.dot == MAPPER_SCANLINE_DOT {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().clock_scanline();
                }
            }
        }

        if !pre_render && matches!(self.dot, 1..=256) {
            self.render_pixel();
        }
    }
}

impl MemoryMappedDevice for Ppu {
    /// Read a PPU register; the address is masked to $2000-$2007
    fn read(&mut self, addr: u16) -> u8 {
        self.read_register(addr & PPU_REGISTER_MASK)
    }

    /// Write a PPU register; the address is masked to $2000-$2007
    fn write(&mut self, addr: u16, data: u8) {
        self.write_register(addr & PPU_REGISTER_MASK, data);
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
