//! Hardware Abstraction Layer (HAL) for the peripheral demos
//!
//! This crate provides vendor-agnostic capability traits for the handful of
//! peripherals the pulse-counter and synchronous-slave demos touch: clock
//! gating, GPIO, the interrupt controller and a USART running in synchronous
//! (SPI-like) mode. Raw register addresses never appear here; a board crate
//! (for example `hal-sim`) implements the traits.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod usart;

// Re-export commonly used types
pub use clock::{ClockController, ClockDomain};
pub use error::{HalError, HalResult};
pub use gpio::{Debounce, Edge, GpioController, Level, PinId, PinMode, Port, PulseInput};
pub use interrupt::{InterruptController, InterruptFlags, IrqHandler, IrqSource};
pub use usart::{BitOrder, SpiMode, SyncConfig, SyncSerialSlave, Wait};
