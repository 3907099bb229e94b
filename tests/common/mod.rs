// Common test utilities for integration tests
//
// Builds iNES images in memory so the suites run without ROM files on
// disk. Programs are hand-assembled 6502 byte strings placed at $8000;
// interrupt handlers live at fixed addresses near the top of the bank.

#![allow(dead_code)]

/// Route core `log` output into the test harness (`RUST_LOG=debug`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Address the NMI handler is assembled at
pub const NMI_HANDLER: u16 = 0xF000;

/// Address the IRQ handler is assembled at
pub const IRQ_HANDLER: u16 = 0xF100;

/// In-memory iNES image builder
pub struct RomBuilder {
    mapper: u8,
    prg_banks: u8,
    chr_banks: u8,
    battery: bool,
    program: Vec<u8>,
    nmi_handler: Vec<u8>,
    irq_handler: Vec<u8>,
    chr: Vec<u8>,
}

impl RomBuilder {
    pub fn new() -> Self {
        RomBuilder {
            mapper: 0,
            prg_banks: 1,
            chr_banks: 1,
            battery: false,
            program: vec![],
            // Default handlers return immediately
            nmi_handler: vec![0x40], // RTI
            irq_handler: vec![0x40], // RTI
            chr: vec![0; 8 * 1024],
        }
    }

    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn prg_banks(mut self, banks: u8) -> Self {
        self.prg_banks = banks;
        self
    }

    pub fn battery(mut self) -> Self {
        self.battery = true;
        self
    }

    /// Main program, assembled at $8000 (also the reset vector target)
    pub fn program(mut self, bytes: &[u8]) -> Self {
        self.program = bytes.to_vec();
        self
    }

    /// NMI handler body, assembled at $F000 (terminate it with RTI)
    pub fn nmi_handler(mut self, bytes: &[u8]) -> Self {
        self.nmi_handler = bytes.to_vec();
        self
    }

    /// IRQ handler body, assembled at $F100 (terminate it with RTI)
    pub fn irq_handler(mut self, bytes: &[u8]) -> Self {
        self.irq_handler = bytes.to_vec();
        self
    }

    /// Fill an 8x8 CHR tile with a solid 2-bit pixel value
    pub fn solid_tile(mut self, tile: usize, pixel: u8) -> Self {
        let low = if pixel & 0x01 != 0 { 0xFF } else { 0x00 };
        let high = if pixel & 0x02 != 0 { 0xFF } else { 0x00 };
        for row in 0..8 {
            self.chr[tile * 16 + row] = low;
            self.chr[tile * 16 + row + 8] = high;
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        let prg_size = self.prg_banks as usize * 16 * 1024;
        let mut prg = vec![0xEAu8; prg_size]; // NOP fill

        prg[..self.program.len()].copy_from_slice(&self.program);

        // Handlers and vectors live in the last bank, which every mapper
        // keeps fixed at the top of the address space
        let bank_base = prg_size - 16 * 1024;
        let nmi_offset = bank_base + (NMI_HANDLER as usize - 0xC000);
        let irq_offset = bank_base + (IRQ_HANDLER as usize - 0xC000);
        prg[nmi_offset..nmi_offset + self.nmi_handler.len()].copy_from_slice(&self.nmi_handler);
        prg[irq_offset..irq_offset + self.irq_handler.len()].copy_from_slice(&self.irq_handler);

        let vectors = prg_size - 6;
        prg[vectors] = (NMI_HANDLER & 0xFF) as u8;
        prg[vectors + 1] = (NMI_HANDLER >> 8) as u8;
        prg[vectors + 2] = 0x00; // reset -> $8000
        prg[vectors + 3] = 0x80;
        prg[vectors + 4] = (IRQ_HANDLER & 0xFF) as u8;
        prg[vectors + 5] = (IRQ_HANDLER >> 8) as u8;

        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = self.prg_banks;
        image[5] = self.chr_banks;
        image[6] = (self.mapper << 4) | if self.battery { 0x02 } else { 0x00 };
        image[7] = self.mapper & 0xF0;
        image.extend_from_slice(&prg);
        if self.chr_banks > 0 {
            let chr_size = self.chr_banks as usize * 8 * 1024;
            let mut chr = self.chr;
            chr.resize(chr_size, 0);
            image.extend_from_slice(&chr);
        }
        image
    }
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `JMP $8000+offset` as bytes
pub fn jmp_to(offset: u16) -> [u8; 3] {
    let target = 0x8000 + offset;
    [0x4C, (target & 0xFF) as u8, (target >> 8) as u8]
}

/// A program that spins in place at the given offset
pub fn spin_at(offset: u16) -> [u8; 3] {
    jmp_to(offset)
}

/// A ROM whose program enables rendering (PPUMASK = mask) then spins
pub fn rendering_rom(mask: u8) -> Vec<u8> {
    let mut program = vec![
        0xA9, mask, // LDA #mask
        0x8D, 0x01, 0x20, // STA $2001
    ];
    program.extend_from_slice(&spin_at(5));
    RomBuilder::new().program(&program).solid_tile(0, 3).build()
}
