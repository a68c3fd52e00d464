//! Simulated interrupt controller
//!
//! Handlers run synchronously on the caller's stack when a flagged, enabled
//! source is raised, which models interrupt context preempting the
//! foreground. A running handler is never re-entered: a flag raised while its
//! handler runs is serviced after the handler returns.
//!
//! Raises are counted, not merged. Each `raise` adds one pending request and
//! each acknowledge retires one, so three events latched while a source is
//! disabled produce three handler entries once it is enabled. `clear_pending`
//! drops them all. The line is level-sensitive: a handler that retires
//! nothing is entered again, and after [`SimConfig::storm_limit`] such
//! entries in a row the controller gives up with
//! [`HalError::InterruptStorm`] instead of spinning forever.

use std::sync::Arc;

use hal::error::{HalError, HalResult};
use hal::interrupt::{InterruptController, InterruptFlags, IrqHandler, IrqSource};
use parking_lot::Mutex;

/// Simulation knobs
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Handler entries in a row that retire no request before the dispatch
    /// is reported as a storm
    pub storm_limit: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { storm_limit: 16 }
    }
}

#[derive(Default)]
struct Line {
    enabled: bool,
    /// Raised but not yet acknowledged requests
    pending: u32,
    active: bool,
    handler: Option<IrqHandler>,
    entries: u32,
}

struct NvicState {
    lines: [Line; IrqSource::COUNT],
    config: SimConfig,
}

/// Shared handle onto the simulated interrupt controller
#[derive(Clone)]
pub struct SimNvic {
    state: Arc<Mutex<NvicState>>,
}

impl Default for SimNvic {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimNvic {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(NvicState {
                lines: Default::default(),
                config,
            })),
        }
    }

    /// Number of times the source's handler has been entered
    pub fn entries(&self, source: IrqSource) -> u32 {
        self.state.lock().lines[source.index()].entries
    }

    /// Whether the source is enabled
    pub fn is_enabled(&self, source: IrqSource) -> bool {
        self.state.lock().lines[source.index()].enabled
    }

    /// Whether the source's handler is running
    pub fn is_active(&self, source: IrqSource) -> bool {
        self.state.lock().lines[source.index()].active
    }

    /// Requests waiting for the source's handler
    pub fn pending_count(&self, source: IrqSource) -> u32 {
        self.state.lock().lines[source.index()].pending
    }

    /// Take the handler out for one entry, or `None` if nothing should run
    fn begin(&self, source: IrqSource) -> Option<IrqHandler> {
        let mut state = self.state.lock();
        let line = &mut state.lines[source.index()];
        if line.active || !line.enabled || line.pending == 0 {
            return None;
        }
        let handler = line.handler.take()?;
        line.active = true;
        line.entries += 1;
        Some(handler)
    }

    fn finish(&self, source: IrqSource, handler: IrqHandler) {
        let mut state = self.state.lock();
        let line = &mut state.lines[source.index()];
        line.active = false;
        // keep a handler registered from inside the running one
        if line.handler.is_none() {
            line.handler = Some(handler);
        }
    }

    fn dispatch(&self, source: IrqSource) -> HalResult<()> {
        let limit = self.state.lock().config.storm_limit;
        let mut stalled = 0u32;
        while let Some(mut handler) = self.begin(source) {
            if stalled >= limit {
                self.finish(source, handler);
                self.state.lock().lines[source.index()].entries -= 1;
                log::error!("{} still flagged after {} handler entries", source, stalled);
                return Err(HalError::InterruptStorm(source));
            }
            log::trace!("enter {} handler", source);
            let before = self.pending_count(source);
            let mut flags = self.clone();
            handler(source, &mut flags);
            self.finish(source, handler);
            if self.pending_count(source) < before {
                stalled = 0;
            } else {
                stalled += 1;
            }
        }
        Ok(())
    }
}

impl InterruptFlags for SimNvic {
    fn acknowledge(&mut self, source: IrqSource) -> HalResult<()> {
        let mut state = self.state.lock();
        let line = &mut state.lines[source.index()];
        line.pending = line.pending.saturating_sub(1);
        Ok(())
    }

    fn is_flagged(&self, source: IrqSource) -> bool {
        self.state.lock().lines[source.index()].pending > 0
    }
}

impl InterruptController for SimNvic {
    fn register_interrupt(&mut self, source: IrqSource, handler: IrqHandler) -> HalResult<()> {
        self.state.lock().lines[source.index()].handler = Some(handler);
        log::debug!("handler registered for {}", source);
        Ok(())
    }

    fn enable_interrupt(&mut self, source: IrqSource) -> HalResult<()> {
        self.state.lock().lines[source.index()].enabled = true;
        // a flag latched while disabled fires as soon as the line opens
        self.dispatch(source)
    }

    fn disable_interrupt(&mut self, source: IrqSource) -> HalResult<()> {
        self.state.lock().lines[source.index()].enabled = false;
        Ok(())
    }

    fn is_pending(&self, source: IrqSource) -> bool {
        let state = self.state.lock();
        let line = &state.lines[source.index()];
        line.pending > 0 && !line.active
    }

    fn clear_pending(&mut self, source: IrqSource) -> HalResult<()> {
        self.state.lock().lines[source.index()].pending = 0;
        Ok(())
    }

    fn raise(&mut self, source: IrqSource) -> HalResult<()> {
        let mut state = self.state.lock();
        let line = &mut state.lines[source.index()];
        line.pending = line.pending.saturating_add(1);
        drop(state);
        self.dispatch(source)
    }

    fn acknowledge_interrupt(&mut self, source: IrqSource) -> HalResult<()> {
        InterruptFlags::acknowledge(self, source)
    }
}
