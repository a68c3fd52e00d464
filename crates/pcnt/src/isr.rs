//! Interrupt service state machine
//!
//! The counter interrupt is level-sensitive: a handler that returns with its
//! flag still set is entered again at once. [`ReactionIsr`] makes the order
//! explicit. The flag is cleared first (`Idle -> Acknowledged`), only then
//! does the reaction run (`Acknowledged -> Reacting -> Idle`). The reaction
//! can only be started with the `Acknowledged` ticket that the acknowledging
//! step hands out, so a reaction without a prior acknowledge does not
//! compile. Both steps are private to [`ReactionIsr::service`], which always
//! runs them as a pair and always ends back in `Idle`. A flag raised while
//! the reaction runs stays latched and is serviced on the next entry, never
//! lost.

use alloc::boxed::Box;

use hal::{InterruptFlags, IrqHandler, IrqSource};

use crate::reaction::Reaction;
use crate::{trace, warn, PcntError, PcntResult};

/// Phase of the service routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsrPhase {
    Idle,
    Acknowledged,
    Reacting,
}

/// Proof that the triggering flag has been cleared
#[derive(Debug)]
pub(crate) struct Acknowledged {
    source: IrqSource,
}

/// Acknowledge-then-react service routine for one interrupt source
pub struct ReactionIsr<R> {
    reaction: R,
    phase: IsrPhase,
    serviced: u32,
}

impl<R: Reaction> ReactionIsr<R> {
    pub fn new(reaction: R) -> Self {
        Self {
            reaction,
            phase: IsrPhase::Idle,
            serviced: 0,
        }
    }

    pub fn phase(&self) -> IsrPhase {
        self.phase
    }

    /// Completed services
    pub fn serviced(&self) -> u32 {
        self.serviced
    }

    /// Clear the source's flag. Refused unless the routine is idle.
    pub(crate) fn acknowledge(
        &mut self,
        source: IrqSource,
        flags: &mut dyn InterruptFlags,
    ) -> PcntResult<Acknowledged> {
        if self.phase != IsrPhase::Idle {
            return Err(PcntError::Reentered(source));
        }
        flags.acknowledge(source)?;
        self.phase = IsrPhase::Acknowledged;
        Ok(Acknowledged { source })
    }

    /// Run the reaction for an acknowledged source
    pub(crate) fn react(&mut self, ticket: Acknowledged) -> PcntResult<()> {
        if self.phase != IsrPhase::Acknowledged {
            return Err(PcntError::Reentered(ticket.source));
        }
        self.phase = IsrPhase::Reacting;
        let result = self.reaction.react();
        self.phase = IsrPhase::Idle;
        self.serviced = self.serviced.wrapping_add(1);
        trace!("{} serviced", ticket.source);
        result
    }

    /// One full entry of the interrupt handler
    pub fn service(&mut self, source: IrqSource, flags: &mut dyn InterruptFlags) -> PcntResult<()> {
        let ticket = self.acknowledge(source, flags)?;
        self.react(ticket)
    }
}

impl<R: Reaction + 'static> ReactionIsr<R> {
    /// Box the routine as a controller handler. Errors stay inside interrupt
    /// context and are only logged.
    pub fn into_handler(mut self) -> IrqHandler {
        Box::new(move |source, flags| {
            if let Err(e) = self.service(source, flags) {
                warn!("{} handler: {}", source, e);
            }
        })
    }
}
