//! GPIO (General Purpose Input/Output) abstraction

use core::fmt;

use crate::error::HalResult;
use crate::interrupt::IrqSource;

/// GPIO port letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

/// A single pin on a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    pub port: Port,
    pub pin: u8,
}

impl PinId {
    /// Highest pin number on a port
    pub const MAX_PIN: u8 = 15;

    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Edge interrupts are split between an odd-pin and an even-pin line
    pub const fn irq_source(self) -> IrqSource {
        if self.pin % 2 == 1 {
            IrqSource::GpioOdd
        } else {
            IrqSource::GpioEven
        }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:?}{}", self.port, self.pin)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "P{}{}", self.port as u8, self.pin);
    }
}

/// GPIO pin modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Pin disconnected
    Disabled,
    /// Input (floating)
    Input,
    /// Input with pull-up resistor
    InputPullUp,
    /// Input with pull-down resistor
    InputPullDown,
    /// Output (push-pull)
    Output,
    /// Output (open-drain)
    OutputOpenDrain,
}

impl PinMode {
    pub const fn is_output(self) -> bool {
        matches!(self, PinMode::Output | PinMode::OutputOpenDrain)
    }

    pub const fn is_input(self) -> bool {
        matches!(
            self,
            PinMode::Input | PinMode::InputPullUp | PinMode::InputPullDown
        )
    }

    /// Level an unconnected input settles to
    pub const fn idle_level(self) -> Level {
        match self {
            PinMode::InputPullUp => Level::High,
            _ => Level::Low,
        }
    }
}

/// Input glitch filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Debounce {
    /// Every transition reaches the pin logic
    #[default]
    None,
    /// Short pulses (contact bounce) are suppressed
    GlitchFilter,
}

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    pub const fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Edge produced by moving from `self` to `to`, if any
    pub fn edge_to(self, to: Level) -> Option<Edge> {
        match (self, to) {
            (Level::Low, Level::High) => Some(Edge::Rising),
            (Level::High, Level::Low) => Some(Edge::Falling),
            _ => None,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Interrupt trigger edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Rising edge
    Rising,
    /// Falling edge
    Falling,
    /// Both edges
    Both,
}

impl Edge {
    /// Whether an observed edge passes this edge selection
    pub fn accepts(self, observed: Edge) -> bool {
        match self {
            Edge::Both => true,
            selected => selected == observed,
        }
    }
}

/// Port-level GPIO controller addressed by [`PinId`]
pub trait GpioController: Send + Sync {
    /// Configure a pin as output and drive its initial level
    fn configure_output_pin(&mut self, id: PinId, mode: PinMode, initial: Level) -> HalResult<()>;

    /// Configure a pin as input with optional glitch filter
    fn configure_input_pin(&mut self, id: PinId, mode: PinMode, debounce: Debounce)
        -> HalResult<()>;

    /// Drive an output pin
    fn set_output(&mut self, id: PinId, level: Level) -> HalResult<()>;

    /// Invert an output pin
    fn toggle_output(&mut self, id: PinId) -> HalResult<()> {
        let level = self.read(id)?;
        self.set_output(id, level.toggled())
    }

    /// Read the current pin level
    fn read(&self, id: PinId) -> HalResult<Level>;

    /// Flag the pin's interrupt line on the given edge(s).
    ///
    /// Returns the interrupt source the pin is wired to.
    fn enable_edge_interrupt(&mut self, id: PinId, edge: Edge) -> HalResult<IrqSource>;

    /// Stop flagging edges on the pin
    fn disable_edge_interrupt(&mut self, id: PinId) -> HalResult<()>;
}

/// Edge stream sampled by a counting peripheral from its input pin
pub trait PulseInput: Send {
    /// Take the oldest unsampled transition, if any
    fn take_edge(&mut self) -> Option<Edge>;
}
