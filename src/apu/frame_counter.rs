//! Frame counter for the APU
//!
//! A divider clocked once per CPU cycle that paces the audio units and,
//! in 4-step mode, raises the frame IRQ at the end of the sequence. With
//! audio synthesis out of scope the quarter/half-frame ticks have no
//! consumers, so only the sequence position and the IRQ flag are kept.

/// CPU cycle of the last 4-step sequence position (where the IRQ is set)
const FOUR_STEP_IRQ_CYCLE: u32 = 29829;

/// Length of the 4-step sequence in CPU cycles
const FOUR_STEP_PERIOD: u32 = 29830;

/// Length of the 5-step sequence in CPU cycles
const FIVE_STEP_PERIOD: u32 = 37282;

/// Frame counter sequencer mode ($4017 bit 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// 4-step mode (default); generates the frame IRQ
    FourStep,
    /// 5-step mode; never raises an IRQ
    FiveStep,
}

/// Frame counter state machine
#[derive(Debug, Clone)]
pub struct FrameCounter {
    mode: FrameMode,
    /// CPU cycles into the current sequence
    cycle: u32,
    /// IRQ inhibit flag ($4017 bit 6)
    irq_inhibit: bool,
    /// Frame interrupt flag (cleared by $4015 reads and inhibit)
    irq_pending: bool,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            mode: FrameMode::FourStep,
            cycle: 0,
            irq_inhibit: false,
            irq_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write $4017: bit 7 selects the mode, bit 6 inhibits (and clears)
    /// the frame IRQ. Writing restarts the sequence.
    pub fn write_control(&mut self, value: u8) {
        self.mode = if value & 0x80 != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }
        self.cycle = 0;
    }

    /// Advance by one CPU cycle
    pub fn clock(&mut self) {
        self.cycle += 1;

        match self.mode {
            FrameMode::FourStep => {
                if self.cycle == FOUR_STEP_IRQ_CYCLE && !self.irq_inhibit {
                    self.irq_pending = true;
                }
                if self.cycle >= FOUR_STEP_PERIOD {
                    self.cycle = 0;
                }
            }
            FrameMode::FiveStep => {
                if self.cycle >= FIVE_STEP_PERIOD {
                    self.cycle = 0;
                }
            }
        }
    }

    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Clear the frame interrupt flag ($4015 read side effect)
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
