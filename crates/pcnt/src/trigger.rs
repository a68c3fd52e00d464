//! Debounced trigger source
//!
//! The push-button never touches the counter directly. Its falling-edge
//! interrupt toggles a relay output, and the relay output is jumpered to the
//! counter input, so each press lands as exactly one edge on the counter.

use hal::{Debounce, Edge, Level, PinId, PinMode, Port};

use crate::isr::ReactionIsr;
use crate::reaction::{ReactionLog, ToggleOutput};

/// Pin assignment of the demo wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoPins {
    /// LED toggled on every counter underflow
    pub led: PinId,
    /// Active-low push-button
    pub button: PinId,
    /// Output toggled per press, wired to `counter_input`
    pub relay: PinId,
    /// Counter input line
    pub counter_input: PinId,
}

impl Default for DemoPins {
    fn default() -> Self {
        Self {
            led: PinId::new(Port::E, 2),
            button: PinId::new(Port::B, 9),
            relay: PinId::new(Port::C, 5),
            counter_input: PinId::new(Port::E, 0),
        }
    }
}

impl DemoPins {
    /// Button input: pull-up, so the idle level is high and a press falls
    pub const BUTTON_MODE: PinMode = PinMode::InputPullUp;
    pub const BUTTON_DEBOUNCE: Debounce = Debounce::GlitchFilter;
    pub const BUTTON_EDGE: Edge = Edge::Falling;
    /// Counter input: pull-down, matching the relay's initial low level
    pub const COUNTER_INPUT_MODE: PinMode = PinMode::InputPullDown;
    pub const RELAY_INITIAL: Level = Level::Low;
    pub const LED_INITIAL: Level = Level::Low;
}

/// Button interrupt: acknowledge, then toggle the relay line
pub type ButtonRelay<P> = ReactionIsr<ToggleOutput<P>>;

/// Build the button service routine around the relay output
pub fn button_relay<P>(relay: P, log: ReactionLog) -> ButtonRelay<P>
where
    P: embedded_hal::digital::StatefulOutputPin + Send,
{
    ReactionIsr::new(ToggleOutput::new(relay, DemoPins::RELAY_INITIAL, log))
}
