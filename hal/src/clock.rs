//! Clock-domain gating abstraction
//!
//! Clock-tree selection (which oscillator feeds which branch) is a board
//! concern; the demos only need to switch peripheral clocks on before the
//! peripheral is configured.

use core::fmt;

use crate::error::HalResult;

/// Clock domains gated by the demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockDomain {
    /// GPIO block
    Gpio,
    /// High-frequency bus clock for low-energy peripherals
    HfLe,
    /// Pulse counter 0
    Pcnt0,
    /// USART 0
    Usart0,
}

impl ClockDomain {
    /// Every gated domain, in enable order used by the demos
    pub const ALL: [ClockDomain; 4] = [
        ClockDomain::Gpio,
        ClockDomain::HfLe,
        ClockDomain::Pcnt0,
        ClockDomain::Usart0,
    ];

    /// Bit position inside a domain mask
    pub const fn bit(self) -> u8 {
        match self {
            ClockDomain::Gpio => 0,
            ClockDomain::HfLe => 1,
            ClockDomain::Pcnt0 => 2,
            ClockDomain::Usart0 => 3,
        }
    }
}

impl fmt::Display for ClockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClockDomain::Gpio => "GPIO",
            ClockDomain::HfLe => "HFLE",
            ClockDomain::Pcnt0 => "PCNT0",
            ClockDomain::Usart0 => "USART0",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockDomain {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ClockDomain({})", self.bit());
    }
}

/// Clock gating controller
pub trait ClockController: Send + Sync {
    /// Enable a clock domain. Enabling an already running domain is a no-op.
    fn enable_clock_domain(&mut self, domain: ClockDomain) -> HalResult<()>;

    /// Disable a clock domain
    fn disable_clock_domain(&mut self, domain: ClockDomain) -> HalResult<()>;

    /// Check whether a domain is running
    fn is_enabled(&self, domain: ClockDomain) -> bool;

    /// Enable several domains in order
    fn enable_all(&mut self, domains: &[ClockDomain]) -> HalResult<()> {
        for &domain in domains {
            self.enable_clock_domain(domain)?;
        }
        Ok(())
    }
}
