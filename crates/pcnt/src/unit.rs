//! Counting unit
//!
//! Models the counter peripheral: it samples its input line, runs every edge
//! through the [`ThresholdCounter`] and latches the counter interrupt for
//! each event whose interrupt is enabled.

use hal::{ClockController, ClockDomain, HalError, InterruptController, IrqSource, PulseInput};

use crate::config::{InterruptMask, PcntConfig};
use crate::counter::{CounterEvent, ThresholdCounter};
use crate::{debug, trace, PcntResult};

/// Pulse counter peripheral bound to one input line
pub struct PulseCounter<In> {
    counter: ThresholdCounter,
    input: In,
    interrupts: InterruptMask,
    source: IrqSource,
    underflows: u32,
    overflows: u32,
}

impl<In: PulseInput> PulseCounter<In> {
    /// Configure the counter. The peripheral clock must already run.
    pub fn new<C>(clocks: &C, config: &PcntConfig, input: In) -> PcntResult<Self>
    where
        C: ClockController + ?Sized,
    {
        if !clocks.is_enabled(ClockDomain::Pcnt0) {
            return Err(HalError::ClockDisabled.into());
        }
        let counter = ThresholdCounter::new(config)?;
        debug!("PCNT0 interrupts 0x{:02x}", config.interrupts.bits());
        Ok(Self {
            counter,
            input,
            interrupts: config.interrupts,
            source: IrqSource::Pcnt0,
            underflows: 0,
            overflows: 0,
        })
    }

    /// Drain the input line and count every pending edge.
    ///
    /// Returns the number of events that latched the counter interrupt. The
    /// interrupt controller runs the handler before `raise` returns when the
    /// source is enabled.
    pub fn sample<N>(&mut self, irq: &mut N) -> PcntResult<u32>
    where
        N: InterruptController + ?Sized,
    {
        let mut raised = 0;
        while let Some(edge) = self.input.take_edge() {
            let Some(event) = self.counter.pulse_event(edge) else {
                continue;
            };
            match event {
                CounterEvent::Underflow => self.underflows = self.underflows.wrapping_add(1),
                CounterEvent::Overflow => self.overflows = self.overflows.wrapping_add(1),
            }
            trace!("PCNT0 event, counter now {}", self.counter.value());
            if self.interrupts.contains(event.mask()) {
                irq.raise(self.source)?;
                raised += 1;
            }
        }
        Ok(raised)
    }

    pub fn value(&self) -> u16 {
        self.counter.value()
    }

    pub fn top(&self) -> u16 {
        self.counter.top()
    }

    /// Underflows seen, whether or not they interrupted
    pub fn underflows(&self) -> u32 {
        self.underflows
    }

    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    pub fn set_interrupts(&mut self, interrupts: InterruptMask) {
        self.interrupts = interrupts;
    }
}
