// Input module - standard controller serial interface
//
// The two controller ports appear at $4016 and $4017. Writing bit 0 of
// $4016 drives the strobe line on both controllers: while high, the
// shift registers continuously reload from the live button state; on the
// high-to-low transition the state is latched and each subsequent read
// shifts one button out through bit 0.
//
// ## Reading sequence
//
// 1. Write $01 to $4016 (raise strobe)
// 2. Write $00 to $4016 (latch buttons)
// 3. Read $4016 eight times for controller 1
// 4. Read $4017 eight times for controller 2
//
// Bit order as read: A, B, Select, Start, Up, Down, Left, Right. Once all
// eight bits have shifted out, further reads return 1 (the behavior games
// use to detect a standard controller).

use crate::bus::MemoryMappedDevice;

bitflags::bitflags! {
    /// Button mask for one controller, in shift order
    ///
    /// Bit 0 is A; the register shifts this bit out first.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const A = 0x01;
        const B = 0x02;
        const SELECT = 0x04;
        const START = 0x08;
        const UP = 0x10;
        const DOWN = 0x20;
        const LEFT = 0x40;
        const RIGHT = 0x80;
    }
}

/// One controller port: live buttons plus the latched shift register
#[derive(Debug, Clone, Copy, Default)]
struct ControllerPort {
    /// Host-updated button state (written by `set_buttons`)
    buttons: Buttons,
    /// Snapshot taken on the strobe high-to-low transition
    shift_register: u8,
    /// Bits already shifted out (saturates at 8)
    shift_count: u8,
}

impl ControllerPort {
    /// Read one serial bit and advance the register
    fn read_bit(&mut self, strobe: bool) -> u8 {
        if strobe {
            // While strobing the register tracks the live A button
            return self.buttons.contains(Buttons::A) as u8;
        }

        if self.shift_count >= 8 {
            // Exhausted registers read back 1 on a standard controller
            return 1;
        }

        let bit = self.shift_register & 0x01;
        self.shift_register >>= 1;
        self.shift_count += 1;
        bit
    }

    /// Latch the live button state into the shift register
    fn latch(&mut self) {
        self.shift_register = self.buttons.bits();
        self.shift_count = 0;
    }
}

/// Controller I/O: both ports plus the shared strobe line
pub struct ControllerIO {
    ports: [ControllerPort; 2],
    strobe: bool,
}

impl ControllerIO {
    /// Create a controller interface with no buttons held
    pub fn new() -> Self {
        ControllerIO {
            ports: [ControllerPort::default(); 2],
            strobe: false,
        }
    }

    /// Reset the serial state; live button state is host-owned and kept
    pub fn reset(&mut self) {
        self.strobe = false;
        for port in &mut self.ports {
            port.shift_register = 0;
            port.shift_count = 8;
        }
    }

    /// Update the live button state for a port (0 or 1)
    ///
    /// While the strobe is high the new state is visible immediately;
    /// otherwise it is picked up at the next latch.
    pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
        if let Some(p) = self.ports.get_mut(port) {
            p.buttons = buttons;
            if self.strobe {
                p.latch();
            }
        }
    }

    /// Next serial bit of a port without shifting (test API)
    pub(crate) fn peek_bit(&self, port: usize) -> u8 {
        match self.ports.get(port) {
            Some(p) if self.strobe => p.buttons.contains(Buttons::A) as u8,
            Some(p) if p.shift_count >= 8 => 1,
            Some(p) => p.shift_register & 0x01,
            None => 0,
        }
    }

    /// Write the strobe line ($4016 bit 0)
    fn write_strobe(&mut self, data: u8) {
        let new_strobe = data & 0x01 != 0;
        if self.strobe && !new_strobe {
            // Falling edge captures the snapshot both ports shift from
            for port in &mut self.ports {
                port.latch();
            }
        }
        self.strobe = new_strobe;
    }
}

impl MemoryMappedDevice for ControllerIO {
    /// Read one serial bit from $4016 (port 0) or $4017 (port 1)
    fn read(&mut self, addr: u16) -> u8 {
        let strobe = self.strobe;
        match addr {
            0x4016 => self.ports[0].read_bit(strobe),
            0x4017 => self.ports[1].read_bit(strobe),
            _ => 0,
        }
    }

    /// Write the strobe ($4016); $4017 writes belong to the APU
    fn write(&mut self, addr: u16, data: u8) {
        if addr == 0x4016 {
            self.write_strobe(data);
        }
    }
}

impl Default for ControllerIO {
    fn default() -> Self {
        Self::new()
    }
}
