//! Simulated clock gating

use std::sync::Arc;

use hal::clock::{ClockController, ClockDomain};
use hal::error::{HalError, HalResult};
use parking_lot::Mutex;

/// Clock gate register shared by every simulated peripheral
#[derive(Debug, Clone, Default)]
pub struct SimClocks {
    enabled: Arc<Mutex<u8>>,
}

impl SimClocks {
    /// All domains start gated off
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`HalError::ClockDisabled`] unless `domain` is running
    pub fn require(&self, domain: ClockDomain) -> HalResult<()> {
        if self.is_enabled(domain) {
            Ok(())
        } else {
            log::warn!("{} accessed with its clock gated off", domain);
            Err(HalError::ClockDisabled)
        }
    }
}

impl ClockController for SimClocks {
    fn enable_clock_domain(&mut self, domain: ClockDomain) -> HalResult<()> {
        let mut mask = self.enabled.lock();
        if *mask & (1 << domain.bit()) == 0 {
            log::debug!("clock {} enabled", domain);
        }
        *mask |= 1 << domain.bit();
        Ok(())
    }

    fn disable_clock_domain(&mut self, domain: ClockDomain) -> HalResult<()> {
        *self.enabled.lock() &= !(1 << domain.bit());
        Ok(())
    }

    fn is_enabled(&self, domain: ClockDomain) -> bool {
        *self.enabled.lock() & (1 << domain.bit()) != 0
    }
}
