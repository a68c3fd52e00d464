//! Output reactions run from interrupt context

use alloc::sync::Arc;
use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::{Error as _, StatefulOutputPin};
use hal::Level;

use crate::{PcntError, PcntResult};

/// Side effect performed by an interrupt service routine.
///
/// Runs at interrupt priority: it must return promptly and never block.
pub trait Reaction: Send {
    fn react(&mut self) -> PcntResult<()>;
}

/// Snapshot of a reaction's observable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionStats {
    /// Completed reactions
    pub reactions: u32,
    /// Output level after the latest reaction
    pub level: Level,
}

impl Default for ReactionStats {
    fn default() -> Self {
        Self {
            reactions: 0,
            level: Level::Low,
        }
    }
}

/// Reaction statistics shared between interrupt context and the foreground
#[derive(Clone)]
pub struct ReactionLog {
    inner: Arc<Mutex<Cell<ReactionStats>>>,
}

impl Default for ReactionLog {
    fn default() -> Self {
        Self::new(Level::Low)
    }
}

impl ReactionLog {
    pub fn new(initial: Level) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Cell::new(ReactionStats {
                reactions: 0,
                level: initial,
            }))),
        }
    }

    fn record(&self, level: Level) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut stats = cell.get();
            stats.reactions = stats.reactions.wrapping_add(1);
            stats.level = level;
            cell.set(stats);
        });
    }

    pub fn snapshot(&self) -> ReactionStats {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }
}

/// Toggle one output line; the only state kept is the line's last level
pub struct ToggleOutput<P> {
    pin: P,
    level: Level,
    log: ReactionLog,
}

impl<P: StatefulOutputPin> ToggleOutput<P> {
    /// `initial` is the level the line was configured with
    pub fn new(pin: P, initial: Level, log: ReactionLog) -> Self {
        Self {
            pin,
            level: initial,
            log,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin + Send> Reaction for ToggleOutput<P> {
    fn react(&mut self) -> PcntResult<()> {
        self.pin.toggle().map_err(|e| PcntError::Output(e.kind()))?;
        self.level = self.level.toggled();
        self.log.record(self.level);
        Ok(())
    }
}
