//! Interrupt controller abstraction
//!
//! Peripherals latch a per-source flag with [`InterruptController::raise`].
//! While the flag is set and the source is enabled the registered handler
//! runs; the line is level-sensitive, so a handler that returns without
//! acknowledging its flag is entered again immediately.

use alloc::boxed::Box;
use core::fmt;

use crate::error::HalResult;

/// Interrupt sources used by the demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqSource {
    /// Pulse counter 0 (underflow / overflow)
    Pcnt0,
    /// Edge interrupt of even-numbered GPIO pins
    GpioEven,
    /// Edge interrupt of odd-numbered GPIO pins
    GpioOdd,
    /// USART 0 receive
    Usart0Rx,
    /// USART 0 transmit
    Usart0Tx,
}

impl IrqSource {
    /// Number of sources
    pub const COUNT: usize = 5;

    /// Dense index for per-source tables
    pub const fn index(self) -> usize {
        match self {
            IrqSource::Pcnt0 => 0,
            IrqSource::GpioEven => 1,
            IrqSource::GpioOdd => 2,
            IrqSource::Usart0Rx => 3,
            IrqSource::Usart0Tx => 4,
        }
    }
}

impl fmt::Display for IrqSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrqSource::Pcnt0 => "PCNT0",
            IrqSource::GpioEven => "GPIO_EVEN",
            IrqSource::GpioOdd => "GPIO_ODD",
            IrqSource::Usart0Rx => "USART0_RX",
            IrqSource::Usart0Tx => "USART0_TX",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqSource {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "IrqSource({})", self.index());
    }
}

/// Flag access available to a running handler
pub trait InterruptFlags {
    /// Clear the source's flag so the line stops asserting
    fn acknowledge(&mut self, source: IrqSource) -> HalResult<()>;

    /// Check whether the source's flag is set
    fn is_flagged(&self, source: IrqSource) -> bool;
}

/// Handler invoked in interrupt context
pub type IrqHandler = Box<dyn FnMut(IrqSource, &mut dyn InterruptFlags) + Send>;

/// Interrupt controller abstraction
pub trait InterruptController: Send + Sync {
    /// Install the handler for a source, replacing any previous one
    fn register_interrupt(&mut self, source: IrqSource, handler: IrqHandler) -> HalResult<()>;

    /// Enable interrupt
    fn enable_interrupt(&mut self, source: IrqSource) -> HalResult<()>;

    /// Disable interrupt
    fn disable_interrupt(&mut self, source: IrqSource) -> HalResult<()>;

    /// Check if interrupt is pending
    fn is_pending(&self, source: IrqSource) -> bool;

    /// Clear pending interrupt (drops stale requests before enabling)
    fn clear_pending(&mut self, source: IrqSource) -> HalResult<()>;

    /// Latch the source's flag; peripheral side
    fn raise(&mut self, source: IrqSource) -> HalResult<()>;

    /// Clear the source's flag
    fn acknowledge_interrupt(&mut self, source: IrqSource) -> HalResult<()>;
}
