#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # pcnt
//!
//! Pulse counter in oversampled single-input mode that interrupts on
//! underflow. A push-button toggles a relay line through its own interrupt;
//! the relay line feeds the counter input, so every press is one raw edge.
//! After `oversampling_ratio` edges the counter steps once; stepping below
//! zero reloads it to `top`, raises the counter interrupt, and the interrupt
//! handler toggles an LED.
//!
//! ## Module Overview
//! - [`config`]   – counter configuration and its builder.
//! - [`counter`]  – the threshold counter and its edge gate.
//! - [`reaction`] – output-toggling reactions and their shared statistics.
//! - [`isr`]      – acknowledge-then-react interrupt service state machine.
//! - [`unit`]     – counting unit sampling its input line and raising the IRQ.
//! - [`trigger`]  – pin assignment of the button/relay/LED wiring.
//! - [`setup`]    – bring-up sequence for clocks, pins, counter and NVIC.

extern crate alloc;

use core::fmt;

use embedded_hal::digital::ErrorKind;
use hal::{HalError, IrqSource};

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, trace, warn};
#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info, trace, warn};

pub mod config;
pub mod counter;
pub mod isr;
pub mod reaction;
pub mod setup;
pub mod trigger;
pub mod unit;

pub use config::{Direction, InterruptMask, PcntConfig, PcntConfigBuilder};
pub use counter::{CounterEvent, EdgeGate, ThresholdCounter};
pub use isr::{IsrPhase, ReactionIsr};
pub use reaction::{Reaction, ReactionLog, ReactionStats, ToggleOutput};
pub use setup::{init, Lines, Monitors};
pub use trigger::{button_relay, ButtonRelay, DemoPins};
pub use unit::PulseCounter;

/// Result type used throughout the crate
pub type PcntResult<T> = Result<T, PcntError>;

/// Pulse counter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcntError {
    /// Initial counter value above the reload value
    InitialAboveTop { initial: u16, top: u16 },
    /// Oversampling ratio of zero would never register a pulse
    ZeroOversampling,
    /// Interrupt service entered while a reaction was still running
    Reentered(IrqSource),
    /// Output line refused the toggle
    Output(ErrorKind),
    /// Underlying peripheral error
    Hal(HalError),
}

impl fmt::Display for PcntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcntError::InitialAboveTop { initial, top } => {
                write!(f, "initial value {} above top {}", initial, top)
            }
            PcntError::ZeroOversampling => write!(f, "oversampling ratio must be at least 1"),
            PcntError::Reentered(source) => write!(f, "{} handler re-entered", source),
            PcntError::Output(kind) => write!(f, "output line error: {:?}", kind),
            PcntError::Hal(e) => write!(f, "hal: {}", e),
        }
    }
}

impl From<HalError> for PcntError {
    fn from(e: HalError) -> Self {
        PcntError::Hal(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PcntError {}

#[cfg(feature = "defmt")]
impl defmt::Format for PcntError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PcntError::InitialAboveTop { initial, top } => {
                defmt::write!(fmt, "InitialAboveTop({}, {})", initial, top)
            }
            PcntError::ZeroOversampling => defmt::write!(fmt, "ZeroOversampling"),
            PcntError::Reentered(source) => defmt::write!(fmt, "Reentered({})", source),
            PcntError::Output(_) => defmt::write!(fmt, "Output"),
            PcntError::Hal(e) => defmt::write!(fmt, "Hal({})", e),
        }
    }
}
