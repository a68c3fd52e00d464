//! USART in synchronous (SPI-like) mode, slave side
//!
//! Status polls are non-blocking and return [`nb::Error::WouldBlock`] while
//! the receive-complete or transmit-free condition is not met. The blocking
//! wrappers spin on them with no timeout; a [`Wait::Polls`] budget exists for
//! test harnesses only.

use crate::error::{HalError, HalResult};

/// SPI mode (clock polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0: clock idles low, sample on the first (rising) edge
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// SPI bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Synchronous-mode configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Drive the clock (master) or follow it (slave)
    pub master: bool,
    pub mode: SpiMode,
    pub bit_order: BitOrder,
    /// Bit rate when acting as master; ignored by a slave
    pub baud_rate: u32,
    /// Enable receiver and transmitter at the end of initialization
    pub enable: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            master: true,
            mode: SpiMode::Mode0,
            bit_order: BitOrder::LsbFirst,
            baud_rate: 1_000_000, // 1 MHz
            enable: true,
        }
    }
}

/// How long a blocking poll may spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wait {
    /// Unbounded; the master is assumed live
    #[default]
    Forever,
    /// Give up with [`HalError::Timeout`] after this many polls
    Polls(u32),
}

/// Spin on a non-blocking status poll
pub fn poll<T, F>(wait: Wait, mut f: F) -> HalResult<T>
where
    F: FnMut() -> nb::Result<T, HalError>,
{
    match wait {
        Wait::Forever => nb::block!(f()),
        Wait::Polls(budget) => {
            for _ in 0..budget {
                match f() {
                    Ok(value) => return Ok(value),
                    Err(nb::Error::Other(e)) => return Err(e),
                    Err(nb::Error::WouldBlock) => {}
                }
            }
            Err(HalError::Timeout)
        }
    }
}

/// Synchronous serial slave trait
pub trait SyncSerialSlave: Send + Sync {
    /// Apply the configuration; leaves the peripheral disabled unless
    /// `config.enable` is set
    fn init_sync(&mut self, config: &SyncConfig) -> HalResult<()>;

    /// Enable or disable receiver and transmitter
    fn enable(&mut self, enable: bool) -> HalResult<()>;

    /// Whether the peripheral takes part in exchanges
    fn is_enabled(&self) -> bool;

    /// Write the transmit data register directly, without a status poll
    fn preload_tx(&mut self, byte: u8) -> HalResult<()>;

    /// Take a received byte if the receive-complete flag is set
    fn try_read(&mut self) -> nb::Result<u8, HalError>;

    /// Load a byte if the transmit slot is free
    fn try_write(&mut self, byte: u8) -> nb::Result<(), HalError>;

    /// Block until a byte has been received
    fn read_byte_blocking(&mut self) -> HalResult<u8> {
        nb::block!(self.try_read())
    }

    /// Block until the transmit slot is free, then load `byte`
    fn write_byte_blocking(&mut self, byte: u8) -> HalResult<()> {
        nb::block!(self.try_write(byte))
    }

    /// Receive with an explicit wait policy
    fn read_byte(&mut self, wait: Wait) -> HalResult<u8> {
        poll(wait, || self.try_read())
    }

    /// Transmit with an explicit wait policy
    fn write_byte(&mut self, byte: u8, wait: Wait) -> HalResult<()> {
        poll(wait, || self.try_write(byte))
    }
}
