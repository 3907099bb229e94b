// PPU constants

/// PPU register address mask for mirroring
///
/// The eight registers at $2000-$2007 repeat every 8 bytes up to $3FFF.
pub(super) const PPU_REGISTER_MASK: u16 = 0x0007;

/// Size of one nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: usize = 1024;

/// Internal VRAM size (two nametables)
pub(super) const VRAM_SIZE: usize = 2 * NAMETABLE_SIZE;

/// Size of palette RAM in bytes
pub(super) const PALETTE_SIZE: usize = 32;

/// Screen width in pixels
pub(super) const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub(super) const SCREEN_HEIGHT: usize = 240;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of dots per scanline
pub(super) const DOTS_PER_SCANLINE: u16 = 341;

/// Pre-render scanline
pub(super) const PRERENDER_SCANLINE: i16 = -1;

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: i16 = 239;

/// Post-render scanline (idle)
pub(super) const POSTRENDER_SCANLINE: i16 = 240;

/// Scanline on which the VBlank flag is raised (at dot 1)
pub(super) const VBLANK_SCANLINE: i16 = 241;

/// Last scanline of the frame
pub(super) const LAST_SCANLINE: i16 = 260;

/// Dot at which mappers with scanline counters are clocked
pub(super) const MAPPER_SCANLINE_DOT: u16 = 260;

// ========================================
// PPUCTRL bits
// ========================================

pub(super) const CTRL_NMI_ENABLE: u8 = 0x80;
pub(super) const CTRL_SPRITE_SIZE: u8 = 0x20;
pub(super) const CTRL_BG_TABLE: u8 = 0x10;
pub(super) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(super) const CTRL_INCREMENT_32: u8 = 0x04;

// ========================================
// PPUMASK bits
// ========================================

pub(super) const MASK_GREYSCALE: u8 = 0x01;
pub(super) const MASK_BG_LEFT: u8 = 0x02;
pub(super) const MASK_SPRITE_LEFT: u8 = 0x04;
pub(super) const MASK_SHOW_BG: u8 = 0x08;
pub(super) const MASK_SHOW_SPRITES: u8 = 0x10;

// ========================================
// PPUSTATUS bits
// ========================================

pub(super) const STATUS_VBLANK: u8 = 0x80;
pub(super) const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
pub(super) const STATUS_SPRITE_OVERFLOW: u8 = 0x20;
