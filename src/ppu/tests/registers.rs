// Register interface tests ($2000-$2007)

use super::*;

#[test]
fn test_ctrl_write_sets_nametable_bits() {
    let mut ppu = Ppu::new();
    ppu.write_register(0, 0x03);
    assert_eq!(ppu.t & 0x0C00, 0x0C00);
    ppu.write_register(0, 0x00);
    assert_eq!(ppu.t & 0x0C00, 0x0000);
}

#[test]
fn test_status_read_clears_vblank_and_toggle() {
    let mut ppu = Ppu::new();
    clock_to(&mut ppu, 241, 2);
    assert_ne!(ppu.read_register(2) & 0x80, 0, "VBlank visible once");
    assert_eq!(ppu.read_register(2) & 0x80, 0, "and cleared by the read");

    // The shared write toggle resets too
    ppu.write_register(5, 0x10); // toggle now set
    ppu.read_register(2);
    assert!(!ppu.write_toggle);
}

#[test]
fn test_status_read_resynchronizes_addr_writes() {
    // After a $2002 read, the next two $2006 writes are high then low
    let mut ppu = Ppu::new();
    ppu.write_register(6, 0x3F); // stray first write
    ppu.read_register(2);
    ppu.write_register(6, 0x21);
    ppu.write_register(6, 0x08);
    assert_eq!(ppu.v, 0x2108);
}

#[test]
fn test_scroll_writes_fill_t_and_fine_x() {
    let mut ppu = Ppu::new();
    // X = 0x7D: coarse 15, fine 5
    ppu.write_register(5, 0x7D);
    assert_eq!(ppu.t & 0x001F, 15);
    assert_eq!(ppu.fine_x, 5);
    // Y = 0x5E: coarse 11, fine 6
    ppu.write_register(5, 0x5E);
    assert_eq!((ppu.t >> 5) & 0x1F, 11);
    assert_eq!((ppu.t >> 12) & 0x07, 6);
    assert!(!ppu.write_toggle);
}

#[test]
fn test_addr_first_write_clears_bit_14() {
    let mut ppu = Ppu::new();
    ppu.t = 0x7FFF;
    ppu.write_register(6, 0xFF);
    assert_eq!(ppu.t & 0x4000, 0, "bit 14 cleared by the first write");
    assert_eq!(ppu.t & 0x3F00, 0x3F00);
}

#[test]
fn test_addr_second_write_copies_to_v() {
    let mut ppu = Ppu::new();
    ppu.write_register(6, 0x23);
    assert_eq!(ppu.v, 0, "v unchanged after the first write");
    ppu.write_register(6, 0xC0);
    assert_eq!(ppu.v, 0x23C0);
}

#[test]
fn test_data_write_and_buffered_read() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    // Write two bytes at $2400
    ppu.write_register(6, 0x24);
    ppu.write_register(6, 0x00);
    ppu.write_register(7, 0xAA);
    ppu.write_register(7, 0xBB);

    // Read them back; the first read returns the stale buffer
    ppu.write_register(6, 0x24);
    ppu.write_register(6, 0x00);
    ppu.read_register(7);
    assert_eq!(ppu.read_register(7), 0xAA);
    assert_eq!(ppu.read_register(7), 0xBB);
}

#[test]
fn test_data_increment_32() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    ppu.write_register(0, 0x04); // +32 stride
    ppu.write_register(6, 0x20);
    ppu.write_register(6, 0x00);
    ppu.write_register(7, 0x11); // $2000
    ppu.write_register(7, 0x22); // $2020
    assert_eq!(ppu.read_ppu_memory(0x2000), 0x11);
    assert_eq!(ppu.read_ppu_memory(0x2020), 0x22);
}

#[test]
fn test_palette_read_is_immediate() {
    let mut ppu = ppu_with_chr_ram(Mirroring::Horizontal);
    // Put a marker in the nametable "underneath" $3F00 ($2F00)
    ppu.write_ppu_memory(0x2F00, 0x5A);
    ppu.write_ppu_memory(0x3F00, 0x21);

    ppu.write_register(6, 0x3F);
    ppu.write_register(6, 0x00);
    assert_eq!(ppu.read_register(7), 0x21, "palette bypasses the buffer");
    assert_eq!(
        ppu.read_buffer, 0x5A,
        "buffer refilled from the mirrored nametable"
    );
}

#[test]
fn test_oam_addr_and_data() {
    let mut ppu = Ppu::new();
    ppu.write_register(3, 0x20);
    ppu.write_register(4, 0x11);
    ppu.write_register(4, 0x22);
    assert_eq!(ppu.oam[0x20], 0x11);
    assert_eq!(ppu.oam[0x21], 0x22);

    // Reads do not advance the address
    ppu.write_register(3, 0x20);
    assert_eq!(ppu.read_register(4), 0x11);
    assert_eq!(ppu.read_register(4), 0x11);
}

#[test]
fn test_nmi_fires_when_enabled_during_vblank() {
    let mut ppu = Ppu::new();
    clock_to(&mut ppu, 241, 2); // VBlank set, NMI output off
    assert!(!ppu.nmi_pending());

    ppu.write_register(0, 0x80);
    assert!(ppu.nmi_pending(), "enabling NMI mid-VBlank fires immediately");
}

#[test]
fn test_nmi_not_refired_after_status_read() {
    let mut ppu = Ppu::new();
    clock_to(&mut ppu, 241, 2);
    ppu.read_register(2); // clears nmi_occurred
    ppu.write_register(0, 0x80);
    assert!(!ppu.nmi_pending(), "$2002 read consumed the VBlank edge");
}

#[test]
fn test_nmi_disable_cancels_pending() {
    let mut ppu = Ppu::new();
    ppu.write_register(0, 0x80);
    clock_to(&mut ppu, 241, 2);
    assert!(ppu.nmi_pending());
    ppu.write_register(0, 0x00);
    assert!(!ppu.nmi_pending());
}

#[test]
fn test_write_only_registers_read_zero() {
    let mut ppu = Ppu::new();
    ppu.write_register(0, 0xFF);
    ppu.write_register(1, 0xFF);
    assert_eq!(ppu.read_register(0), 0);
    assert_eq!(ppu.read_register(1), 0);
    assert_eq!(ppu.read_register(3), 0);
    assert_eq!(ppu.read_register(5), 0);
    assert_eq!(ppu.read_register(6), 0);
}
