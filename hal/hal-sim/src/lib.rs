//! Host simulation HAL implementation
//!
//! Concrete implementations of the HAL traits that run on the development
//! host instead of silicon. Every peripheral is a cheap cloneable handle onto
//! shared state, the way memory-mapped registers are reachable from both the
//! foreground loop and interrupt handlers on a real part.
//!
//! ## Peripherals
//! - [`SimClocks`] - clock gating; other peripherals refuse configuration
//!   while their domain is off
//! - [`SimNvic`] - interrupt controller that dispatches handlers
//!   synchronously and reports handlers that never clear their flag
//! - [`SimGpio`] - GPIO with external stimulus (button presses with contact
//!   bounce) and jumper wires between pins
//! - [`SimUsart`] - USART in synchronous slave mode with a scripted master
//!
//! ## Example
//! ```
//! use hal::{ClockController, ClockDomain, GpioController, Level, PinId, PinMode, Port};
//! use hal_sim::{SimClocks, SimGpio, SimNvic};
//!
//! let mut clocks = SimClocks::new();
//! clocks.enable_clock_domain(ClockDomain::Gpio).unwrap();
//! let mut gpio = SimGpio::new(clocks.clone(), SimNvic::default());
//! let led = PinId::new(Port::E, 2);
//! gpio.configure_output_pin(led, PinMode::Output, Level::Low).unwrap();
//! gpio.toggle_output(led).unwrap();
//! assert_eq!(gpio.read(led).unwrap(), Level::High);
//! ```

pub mod clock;
pub mod gpio;
pub mod nvic;
pub mod usart;

// Re-export commonly used types
pub use clock::SimClocks;
pub use gpio::{SimGpio, SimOutputPin, SimPulseInput};
pub use nvic::{SimConfig, SimNvic};
pub use usart::SimUsart;
