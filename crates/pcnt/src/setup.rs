//! Bring-up of the pulse counter demo

use embedded_hal::digital::StatefulOutputPin;
use hal::{
    ClockController, ClockDomain, Debounce, GpioController, InterruptController, IrqSource, PinMode,
    PulseInput,
};

use crate::config::PcntConfig;
use crate::isr::ReactionIsr;
use crate::reaction::{ReactionLog, ToggleOutput};
use crate::trigger::{button_relay, DemoPins};
use crate::unit::PulseCounter;
use crate::{info, PcntResult};

/// Clock domains the demo switches on, in order
pub const CLOCKS: [ClockDomain; 3] = [ClockDomain::Gpio, ClockDomain::HfLe, ClockDomain::Pcnt0];

/// Line handles moved into the service routines and the counting unit
pub struct Lines<L, R, In> {
    /// LED output toggled on underflow
    pub led: L,
    /// Relay output toggled per button press
    pub relay: R,
    /// Counter input edge stream
    pub input: In,
}

/// Reaction statistics observable from the foreground
#[derive(Clone, Default)]
pub struct Monitors {
    pub led: ReactionLog,
    pub relay: ReactionLog,
}

/// Configure clocks, pins, counter and interrupts.
///
/// Stale interrupt requests are cleared before the handlers are installed
/// and the sources enabled. The returned unit must be sampled from the
/// foreground to feed input edges to the counter.
pub fn init<C, G, N, L, R, In>(
    clocks: &mut C,
    gpio: &mut G,
    nvic: &mut N,
    pins: &DemoPins,
    config: &PcntConfig,
    lines: Lines<L, R, In>,
    monitors: &Monitors,
) -> PcntResult<PulseCounter<In>>
where
    C: ClockController + ?Sized,
    G: GpioController + ?Sized,
    N: InterruptController + ?Sized,
    L: StatefulOutputPin + Send + 'static,
    R: StatefulOutputPin + Send + 'static,
    In: PulseInput,
{
    clocks.enable_all(&CLOCKS)?;

    gpio.configure_output_pin(pins.led, PinMode::Output, DemoPins::LED_INITIAL)?;
    gpio.configure_input_pin(
        pins.counter_input,
        DemoPins::COUNTER_INPUT_MODE,
        Debounce::None,
    )?;
    gpio.configure_input_pin(pins.button, DemoPins::BUTTON_MODE, DemoPins::BUTTON_DEBOUNCE)?;
    gpio.configure_output_pin(pins.relay, PinMode::Output, DemoPins::RELAY_INITIAL)?;
    let button_irq = gpio.enable_edge_interrupt(pins.button, DemoPins::BUTTON_EDGE)?;
    info!(
        "pins configured: led {} button {} relay {} input {}",
        pins.led, pins.button, pins.relay, pins.counter_input
    );

    let unit = PulseCounter::new(&*clocks, config, lines.input)?;

    for source in [IrqSource::Pcnt0, button_irq] {
        nvic.clear_pending(source)?;
    }

    let led = ToggleOutput::new(lines.led, DemoPins::LED_INITIAL, monitors.led.clone());
    let relay = button_relay(lines.relay, monitors.relay.clone());
    nvic.register_interrupt(IrqSource::Pcnt0, ReactionIsr::new(led).into_handler())?;
    nvic.register_interrupt(button_irq, relay.into_handler())?;

    nvic.enable_interrupt(IrqSource::Pcnt0)?;
    nvic.enable_interrupt(button_irq)?;
    info!("PCNT0 armed at {} (top {})", unit.value(), unit.top());
    Ok(unit)
}
