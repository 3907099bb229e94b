// VRAM, palette, and pattern-table routing tests

use super::*;

#[test]
fn test_horizontal_mirroring() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    ppu.write_ppu_memory(0x2000, 0x11);
    ppu.write_ppu_memory(0x2800, 0x22);

    assert_eq!(ppu.read_ppu_memory(0x2400), 0x11, "$2400 mirrors $2000");
    assert_eq!(ppu.read_ppu_memory(0x2C00), 0x22, "$2C00 mirrors $2800");
    assert_ne!(ppu.read_ppu_memory(0x2000), 0x22, "top and bottom distinct");
}

#[test]
fn test_vertical_mirroring() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Vertical);
    ppu.write_ppu_memory(0x2000, 0x33);
    ppu.write_ppu_memory(0x2400, 0x44);

    assert_eq!(ppu.read_ppu_memory(0x2800), 0x33, "$2800 mirrors $2000");
    assert_eq!(ppu.read_ppu_memory(0x2C00), 0x44, "$2C00 mirrors $2400");
}

#[test]
fn test_single_screen_mirroring() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    ppu.mapper = None; // fall back to the PPU's own mirroring field
    ppu.mirroring = Mirroring::SingleScreenLower;
    ppu.write_ppu_memory(0x2C00, 0x55);
    assert_eq!(ppu.read_ppu_memory(0x2000), 0x55);
    assert_eq!(ppu.read_ppu_memory(0x2400), 0x55);
}

#[test]
fn test_3000_region_mirrors_nametables() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    ppu.write_ppu_memory(0x3000, 0x66);
    assert_eq!(ppu.read_ppu_memory(0x2000), 0x66);

    ppu.write_ppu_memory(0x2EFF, 0x77);
    assert_eq!(ppu.read_ppu_memory(0x3EFF), 0x77);
}

#[test]
fn test_palette_alias_rule() {
    let mut ppu = Ppu::new();
    for offset in [0x10u16, 0x14, 0x18, 0x1C] {
        let value = 0x20 | offset as u8;
        ppu.write_ppu_memory(0x3F00 + offset, value);
        assert_eq!(
            ppu.read_ppu_memory(0x3F00 + offset),
            value,
            "write visible at $3F{:02X}",
            offset
        );
        assert_eq!(
            ppu.read_ppu_memory(0x3F00 + offset - 0x10),
            value,
            "and aliased at $3F{:02X}",
            offset - 0x10
        );
    }
}

#[test]
fn test_palette_alias_other_direction() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x3F04, 0x2A);
    assert_eq!(ppu.read_ppu_memory(0x3F14), 0x2A);
}

#[test]
fn test_palette_region_repeats_every_32_bytes() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x3F01, 0x15);
    assert_eq!(ppu.read_ppu_memory(0x3F21), 0x15);
    assert_eq!(ppu.read_ppu_memory(0x3FE1), 0x15);
}

#[test]
fn test_non_aliased_sprite_palette_entries_are_distinct() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x3F01, 0x01);
    ppu.write_ppu_memory(0x3F11, 0x02);
    assert_eq!(ppu.read_ppu_memory(0x3F01), 0x01);
    assert_eq!(ppu.read_ppu_memory(0x3F11), 0x02);
}

#[test]
fn test_pattern_table_routes_to_mapper() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    ppu.write_ppu_memory(0x0000, 0xAB);
    ppu.write_ppu_memory(0x1FFF, 0xCD);
    assert_eq!(ppu.read_ppu_memory(0x0000), 0xAB);
    assert_eq!(ppu.read_ppu_memory(0x1FFF), 0xCD);
}

#[test]
fn test_pattern_table_without_cartridge_reads_zero() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x0000, 0xAB);
    assert_eq!(ppu.read_ppu_memory(0x0000), 0);
}

#[test]
fn test_address_wraps_to_14_bits() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x3F00, 0x12);
    assert_eq!(ppu.read_ppu_memory(0x7F00), 0x12, "bit 14+ ignored");
}

#[test]
fn test_palette_color_lookup() {
    let mut ppu = Ppu::new();
    ppu.write_ppu_memory(0x3F00, 0x0F); // backdrop
    ppu.write_ppu_memory(0x3F07, 0x2C); // bg palette 1, color 3
    ppu.write_ppu_memory(0x3F13, 0x16); // sprite palette 0, color 3

    assert_eq!(ppu.palette_color(1, 3), 0x2C);
    assert_eq!(ppu.palette_color(4, 3), 0x16);
    assert_eq!(ppu.palette_color(2, 0), 0x0F, "pixel 0 is the backdrop");
}
