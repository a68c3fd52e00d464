//! Common error types for HAL operations

use core::fmt;

use crate::interrupt::IrqSource;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided
    InvalidParameter,
    /// Operation not supported by this implementation
    NotSupported,
    /// Operation timed out (only reachable with a bounded poll budget)
    Timeout,
    /// Peripheral was touched before its clock domain was enabled
    ClockDisabled,
    /// Peripheral used before it was configured
    NotConfigured,
    /// A handler returned without clearing its flag and kept re-firing
    InterruptStorm(IrqSource),
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::Timeout => write!(f, "operation timeout"),
            Self::ClockDisabled => write!(f, "clock domain disabled"),
            Self::NotConfigured => write!(f, "peripheral not configured"),
            Self::InterruptStorm(source) => write!(f, "interrupt storm on {}", source),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::NotSupported => defmt::write!(fmt, "NotSupported"),
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::ClockDisabled => defmt::write!(fmt, "ClockDisabled"),
            Self::NotConfigured => defmt::write!(fmt, "NotConfigured"),
            Self::InterruptStorm(source) => defmt::write!(fmt, "InterruptStorm({})", source),
        }
    }
}

impl embedded_hal::digital::Error for HalError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
