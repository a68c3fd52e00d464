#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # spi-slave
//!
//! Polled full-duplex byte exchange for a USART running as a synchronous
//! (SPI-like) slave. The master drives the clock; every cycle moves one byte
//! in each direction. Received bytes land in an inbound circular buffer and
//! the transmit slot is refilled from an outbound circular buffer, one byte
//! per received byte. The first outbound byte is written to the transmit
//! register before the peripheral is enabled so the master's first cycle
//! already carries data.
//!
//! ## Module Overview
//! - [`buffer`] – fixed-capacity circular byte buffer.
//! - [`config`] – slave peripheral settings and the default transmit pattern.
//! - [`engine`] – the exchange loop.

use core::fmt;

use hal::HalError;

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, trace};
#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info, trace};

pub mod buffer;
pub mod config;
pub mod engine;

pub use buffer::CircularBuffer;
pub use config::{default_tx_pattern, SlaveConfig, BUFFER_SIZE, CLOCKS};
pub use engine::DuplexEngine;

/// Result type used throughout the crate
pub type SlaveResult<T> = Result<T, SlaveError>;

/// Exchange engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveError {
    /// Exchange attempted before [`DuplexEngine::start`]
    NotStarted,
    /// [`DuplexEngine::start`] called twice
    AlreadyStarted,
    /// Underlying peripheral error
    Hal(HalError),
}

impl fmt::Display for SlaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaveError::NotStarted => write!(f, "exchange engine not started"),
            SlaveError::AlreadyStarted => write!(f, "exchange engine already started"),
            SlaveError::Hal(e) => write!(f, "hal: {}", e),
        }
    }
}

impl From<HalError> for SlaveError {
    fn from(e: HalError) -> Self {
        SlaveError::Hal(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SlaveError {}

#[cfg(feature = "defmt")]
impl defmt::Format for SlaveError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SlaveError::NotStarted => defmt::write!(fmt, "NotStarted"),
            SlaveError::AlreadyStarted => defmt::write!(fmt, "AlreadyStarted"),
            SlaveError::Hal(e) => defmt::write!(fmt, "Hal({})", e),
        }
    }
}
