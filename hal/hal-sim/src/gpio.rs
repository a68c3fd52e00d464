//! Simulated GPIO
//!
//! Besides the [`GpioController`] trait the simulation offers the outside
//! world: [`SimGpio::drive_input`] moves an input pin the way a button or
//! another chip would, and [`SimGpio::connect`] solders a jumper from an
//! output to an input so a level change on one shows up as an edge on the
//! other.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use hal::clock::ClockDomain;
use hal::error::{HalError, HalResult};
use hal::gpio::{Debounce, Edge, GpioController, Level, PinId, PinMode, PulseInput};
use hal::interrupt::{InterruptController, IrqSource};
use parking_lot::Mutex;

use crate::clock::SimClocks;
use crate::nvic::SimNvic;

#[derive(Debug)]
struct PinState {
    mode: PinMode,
    debounce: Debounce,
    level: Level,
    edge_irq: Option<Edge>,
    edges: VecDeque<Edge>,
    transitions: u32,
}

impl PinState {
    fn new(mode: PinMode, level: Level) -> Self {
        Self {
            mode,
            debounce: Debounce::None,
            level,
            edge_irq: None,
            edges: VecDeque::new(),
            transitions: 0,
        }
    }

    /// Move to `level`; returns the edge if the level changed
    fn set_level(&mut self, level: Level) -> Option<Edge> {
        let edge = self.level.edge_to(level)?;
        self.level = level;
        self.transitions += 1;
        // every edge stays queued until the sampling peripheral takes it
        self.edges.push_back(edge);
        Some(edge)
    }
}

#[derive(Debug, Default)]
struct GpioState {
    pins: BTreeMap<PinId, PinState>,
    jumpers: Vec<(PinId, PinId)>,
}

/// Shared handle onto the simulated GPIO block
#[derive(Clone)]
pub struct SimGpio {
    state: Arc<Mutex<GpioState>>,
    clocks: SimClocks,
    nvic: SimNvic,
}

fn validate(id: PinId) -> HalResult<()> {
    if id.pin > PinId::MAX_PIN {
        return Err(HalError::InvalidParameter);
    }
    Ok(())
}

impl SimGpio {
    pub fn new(clocks: SimClocks, nvic: SimNvic) -> Self {
        Self {
            state: Arc::new(Mutex::new(GpioState::default())),
            clocks,
            nvic,
        }
    }

    /// Wire output `from` to input `to`
    pub fn connect(&mut self, from: PinId, to: PinId) -> HalResult<()> {
        validate(from)?;
        validate(to)?;
        self.state.lock().jumpers.push((from, to));
        Ok(())
    }

    /// Drive an input pin from outside the chip
    pub fn drive_input(&mut self, id: PinId, level: Level) -> HalResult<()> {
        self.drive_input_with_bounce(id, level, 0)
    }

    /// Drive an input pin through a mechanical contact that chatters
    /// `bounces` times before settling. A glitch filter swallows the chatter.
    pub fn drive_input_with_bounce(&mut self, id: PinId, level: Level, bounces: u32) -> HalResult<()> {
        let filtered = {
            let state = self.state.lock();
            let pin = state.pins.get(&id).ok_or(HalError::NotConfigured)?;
            if !pin.mode.is_input() {
                return Err(HalError::InvalidParameter);
            }
            pin.debounce == Debounce::GlitchFilter
        };
        if !filtered {
            for _ in 0..bounces {
                self.apply_input(id, level)?;
                self.apply_input(id, level.toggled())?;
            }
        }
        self.apply_input(id, level)
    }

    /// Press an active-low push-button on `id`
    pub fn press(&mut self, id: PinId) -> HalResult<()> {
        self.drive_input(id, Level::Low)
    }

    /// Release an active-low push-button on `id`
    pub fn release(&mut self, id: PinId) -> HalResult<()> {
        self.drive_input(id, Level::High)
    }

    /// Number of level changes the pin has seen
    pub fn transitions(&self, id: PinId) -> u32 {
        self.state.lock().pins.get(&id).map_or(0, |pin| pin.transitions)
    }

    /// Output line handle usable through `embedded-hal`
    pub fn output_pin(&self, id: PinId) -> HalResult<SimOutputPin> {
        validate(id)?;
        Ok(SimOutputPin {
            id,
            gpio: self.clone(),
        })
    }

    /// Edge stream of an input pin for a sampling peripheral
    pub fn pulse_input(&self, id: PinId) -> HalResult<SimPulseInput> {
        validate(id)?;
        Ok(SimPulseInput {
            id,
            gpio: self.clone(),
        })
    }

    /// Set an input level and raise the pin's interrupt when the edge matches
    fn apply_input(&mut self, id: PinId, level: Level) -> HalResult<()> {
        let irq = {
            let mut state = self.state.lock();
            let pin = state.pins.get_mut(&id).ok_or(HalError::NotConfigured)?;
            match pin.set_level(level) {
                Some(edge) => pin
                    .edge_irq
                    .filter(|selected| selected.accepts(edge))
                    .map(|_| id.irq_source()),
                None => None,
            }
        };
        // lock released: the handler may touch GPIO itself
        match irq {
            Some(source) => self.raise(source),
            None => Ok(()),
        }
    }

    fn raise(&mut self, source: IrqSource) -> HalResult<()> {
        self.nvic.raise(source)
    }

    fn drive_output(&mut self, id: PinId, level: Level) -> HalResult<()> {
        let targets: Vec<PinId> = {
            let mut state = self.state.lock();
            let pin = state.pins.get_mut(&id).ok_or(HalError::NotConfigured)?;
            if !pin.mode.is_output() {
                return Err(HalError::NotConfigured);
            }
            if pin.set_level(level).is_none() {
                return Ok(());
            }
            state
                .jumpers
                .iter()
                .filter(|(from, _)| *from == id)
                .map(|(_, to)| *to)
                .collect()
        };
        for target in targets {
            self.apply_input(target, level)?;
        }
        Ok(())
    }
}

impl GpioController for SimGpio {
    fn configure_output_pin(&mut self, id: PinId, mode: PinMode, initial: Level) -> HalResult<()> {
        validate(id)?;
        self.clocks.require(ClockDomain::Gpio)?;
        if !mode.is_output() {
            return Err(HalError::InvalidParameter);
        }
        self.state.lock().pins.insert(id, PinState::new(mode, initial));
        log::debug!("{} output, initial {:?}", id, initial);
        Ok(())
    }

    fn configure_input_pin(&mut self, id: PinId, mode: PinMode, debounce: Debounce) -> HalResult<()> {
        validate(id)?;
        self.clocks.require(ClockDomain::Gpio)?;
        if !mode.is_input() {
            return Err(HalError::InvalidParameter);
        }
        let mut pin = PinState::new(mode, mode.idle_level());
        pin.debounce = debounce;
        self.state.lock().pins.insert(id, pin);
        log::debug!("{} input {:?}, {:?}", id, mode, debounce);
        Ok(())
    }

    fn set_output(&mut self, id: PinId, level: Level) -> HalResult<()> {
        self.drive_output(id, level)
    }

    fn read(&self, id: PinId) -> HalResult<Level> {
        self.state
            .lock()
            .pins
            .get(&id)
            .map(|pin| pin.level)
            .ok_or(HalError::NotConfigured)
    }

    fn enable_edge_interrupt(&mut self, id: PinId, edge: Edge) -> HalResult<IrqSource> {
        let mut state = self.state.lock();
        let pin = state.pins.get_mut(&id).ok_or(HalError::NotConfigured)?;
        pin.edge_irq = Some(edge);
        Ok(id.irq_source())
    }

    fn disable_edge_interrupt(&mut self, id: PinId) -> HalResult<()> {
        let mut state = self.state.lock();
        let pin = state.pins.get_mut(&id).ok_or(HalError::NotConfigured)?;
        pin.edge_irq = None;
        Ok(())
    }
}

/// One output line of [`SimGpio`]
#[derive(Clone)]
pub struct SimOutputPin {
    id: PinId,
    gpio: SimGpio,
}

impl SimOutputPin {
    pub fn id(&self) -> PinId {
        self.id
    }
}

impl ErrorType for SimOutputPin {
    type Error = HalError;
}

impl OutputPin for SimOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpio.drive_output(self.id, Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpio.drive_output(self.id, Level::High)
    }
}

impl StatefulOutputPin for SimOutputPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.gpio.read(self.id)? == Level::High)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.gpio.read(self.id)? == Level::Low)
    }
}

/// Edge stream of one input line of [`SimGpio`]
pub struct SimPulseInput {
    id: PinId,
    gpio: SimGpio,
}

impl PulseInput for SimPulseInput {
    fn take_edge(&mut self) -> Option<Edge> {
        self.gpio
            .state
            .lock()
            .pins
            .get_mut(&self.id)
            .and_then(|pin| pin.edges.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::clock::ClockController;
    use std::sync::atomic::{AtomicU32, Ordering};

    const BUTTON: PinId = PinId::new(hal::gpio::Port::B, 9);
    const RELAY: PinId = PinId::new(hal::gpio::Port::C, 5);
    const COUNTER_IN: PinId = PinId::new(hal::gpio::Port::E, 0);

    fn board() -> (SimGpio, SimNvic) {
        let mut clocks = SimClocks::new();
        clocks.enable_clock_domain(ClockDomain::Gpio).unwrap();
        let nvic = SimNvic::default();
        (SimGpio::new(clocks, nvic.clone()), nvic)
    }

    #[test]
    fn test_configuration_needs_gpio_clock() {
        let mut gpio = SimGpio::new(SimClocks::new(), SimNvic::default());
        let result = gpio.configure_output_pin(RELAY, PinMode::Output, Level::Low);
        assert_eq!(result, Err(HalError::ClockDisabled));
    }

    #[test]
    fn test_invalid_pin() {
        let (mut gpio, _) = board();
        let result = gpio.configure_output_pin(PinId::new(hal::gpio::Port::A, 16), PinMode::Output, Level::Low);
        assert_eq!(result, Err(HalError::InvalidParameter));
    }

    #[test]
    fn test_toggle_output() {
        let (mut gpio, _) = board();
        gpio.configure_output_pin(RELAY, PinMode::Output, Level::Low).unwrap();
        gpio.toggle_output(RELAY).unwrap();
        assert_eq!(gpio.read(RELAY).unwrap(), Level::High);
        gpio.toggle_output(RELAY).unwrap();
        assert_eq!(gpio.read(RELAY).unwrap(), Level::Low);
        assert_eq!(gpio.transitions(RELAY), 2);
    }

    #[test]
    fn test_embedded_hal_pin_toggles() {
        let (mut gpio, _) = board();
        gpio.configure_output_pin(RELAY, PinMode::Output, Level::Low).unwrap();
        let mut pin = gpio.output_pin(RELAY).unwrap();
        pin.toggle().unwrap();
        assert!(pin.is_set_high().unwrap());
        pin.set_low().unwrap();
        assert!(pin.is_set_low().unwrap());
    }

    #[test]
    fn test_jumper_carries_edges_to_input() {
        let (mut gpio, _) = board();
        gpio.configure_output_pin(RELAY, PinMode::Output, Level::Low).unwrap();
        gpio.configure_input_pin(COUNTER_IN, PinMode::InputPullDown, Debounce::None)
            .unwrap();
        gpio.connect(RELAY, COUNTER_IN).unwrap();

        let mut input = gpio.pulse_input(COUNTER_IN).unwrap();
        gpio.toggle_output(RELAY).unwrap();
        gpio.toggle_output(RELAY).unwrap();
        assert_eq!(input.take_edge(), Some(Edge::Rising));
        assert_eq!(input.take_edge(), Some(Edge::Falling));
        assert_eq!(input.take_edge(), None);
    }

    #[test]
    fn test_unsampled_edges_are_all_kept() {
        let (mut gpio, _) = board();
        gpio.configure_output_pin(RELAY, PinMode::Output, Level::Low).unwrap();
        gpio.configure_input_pin(COUNTER_IN, PinMode::InputPullDown, Debounce::None)
            .unwrap();
        gpio.connect(RELAY, COUNTER_IN).unwrap();

        for _ in 0..200 {
            gpio.toggle_output(RELAY).unwrap();
        }
        let mut input = gpio.pulse_input(COUNTER_IN).unwrap();
        let mut taken = 0;
        while input.take_edge().is_some() {
            taken += 1;
        }
        assert_eq!(taken, 200);
    }

    #[test]
    fn test_glitch_filter_swallows_bounce() {
        let (mut gpio, _) = board();
        gpio.configure_input_pin(BUTTON, PinMode::InputPullUp, Debounce::GlitchFilter)
            .unwrap();
        gpio.drive_input_with_bounce(BUTTON, Level::Low, 3).unwrap();
        assert_eq!(gpio.transitions(BUTTON), 1);

        gpio.configure_input_pin(COUNTER_IN, PinMode::InputPullUp, Debounce::None)
            .unwrap();
        gpio.drive_input_with_bounce(COUNTER_IN, Level::Low, 3).unwrap();
        assert_eq!(gpio.transitions(COUNTER_IN), 7);
    }

    #[test]
    fn test_falling_edge_raises_odd_pin_interrupt() {
        let (mut gpio, mut nvic) = board();
        gpio.configure_input_pin(BUTTON, PinMode::InputPullUp, Debounce::GlitchFilter)
            .unwrap();
        let source = gpio.enable_edge_interrupt(BUTTON, Edge::Falling).unwrap();
        assert_eq!(source, IrqSource::GpioOdd);

        let hits = Arc::new(AtomicU32::new(0));
        let counted = hits.clone();
        nvic.register_interrupt(
            source,
            Box::new(move |source, flags| {
                flags.acknowledge(source).unwrap();
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        nvic.enable_interrupt(source).unwrap();

        gpio.press(BUTTON).unwrap();
        gpio.release(BUTTON).unwrap();
        gpio.press(BUTTON).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_edge_interrupt_stays_quiet() {
        let (mut gpio, mut nvic) = board();
        gpio.configure_input_pin(BUTTON, PinMode::InputPullUp, Debounce::GlitchFilter)
            .unwrap();
        let source = gpio.enable_edge_interrupt(BUTTON, Edge::Falling).unwrap();
        let hits = Arc::new(AtomicU32::new(0));
        let counted = hits.clone();
        nvic.register_interrupt(
            source,
            Box::new(move |source, flags| {
                flags.acknowledge(source).unwrap();
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        nvic.enable_interrupt(source).unwrap();

        gpio.disable_edge_interrupt(BUTTON).unwrap();
        gpio.press(BUTTON).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(gpio.transitions(BUTTON), 1);
        assert_eq!(
            gpio.disable_edge_interrupt(RELAY),
            Err(HalError::NotConfigured)
        );
    }
}
