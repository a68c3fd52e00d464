//! Counter configuration

use core::ops::BitOr;

use hal::Edge;

use crate::{warn, PcntError, PcntResult};

/// Counting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Direction {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Direction::Up => defmt::write!(fmt, "Up"),
            Direction::Down => defmt::write!(fmt, "Down"),
        }
    }
}

/// Counter events allowed to raise the counter interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptMask(u8);

impl InterruptMask {
    pub const NONE: InterruptMask = InterruptMask(0);
    pub const UNDERFLOW: InterruptMask = InterruptMask(1 << 0);
    pub const OVERFLOW: InterruptMask = InterruptMask(1 << 1);

    pub const fn contains(self, other: InterruptMask) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for InterruptMask {
    type Output = InterruptMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        InterruptMask(self.0 | rhs.0)
    }
}

/// Pulse counter configuration.
///
/// The default is the demo setup: count down from 5 with reload 5, two raw
/// edges per counted pulse, both edge polarities, underflow interrupt on.
/// With a relay line that toggles once per button press that is one counter
/// step every two presses and an underflow every six steps.
#[derive(Debug, Clone)]
pub struct PcntConfig {
    /// Reload value
    pub top: u16,
    /// Counter value at start
    pub initial: u16,
    pub direction: Direction,
    /// Raw edges per counted pulse
    pub oversampling_ratio: u16,
    /// Edge polarity that reaches the oversampler
    pub polarity: Edge,
    pub interrupts: InterruptMask,
}

impl Default for PcntConfig {
    fn default() -> Self {
        Self {
            top: 5,
            initial: 5,
            direction: Direction::Down,
            oversampling_ratio: 2,
            polarity: Edge::Both,
            interrupts: InterruptMask::UNDERFLOW,
        }
    }
}

impl PcntConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PcntConfigBuilder {
        PcntConfigBuilder::default()
    }

    /// Reject configurations the counter cannot start from.
    ///
    /// An initial value above `top` is refused rather than clamped.
    pub fn validate(&self) -> PcntResult<()> {
        if self.initial > self.top {
            warn!("rejecting initial value {} above top {}", self.initial, self.top);
            return Err(PcntError::InitialAboveTop {
                initial: self.initial,
                top: self.top,
            });
        }
        if self.oversampling_ratio == 0 {
            warn!("rejecting oversampling ratio 0");
            return Err(PcntError::ZeroOversampling);
        }
        Ok(())
    }
}

/// Builder for ergonomic counter configuration construction.
#[derive(Debug, Clone, Default)]
pub struct PcntConfigBuilder {
    config: PcntConfig,
}

impl PcntConfigBuilder {
    /// Sets the reload value.
    pub fn top(mut self, top: u16) -> Self {
        self.config.top = top;
        self
    }

    /// Sets the starting value.
    pub fn initial(mut self, initial: u16) -> Self {
        self.config.initial = initial;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    /// Sets how many raw edges make one counted pulse.
    pub fn oversampling_ratio(mut self, ratio: u16) -> Self {
        self.config.oversampling_ratio = ratio;
        self
    }

    pub fn polarity(mut self, polarity: Edge) -> Self {
        self.config.polarity = polarity;
        self
    }

    pub fn interrupts(mut self, interrupts: InterruptMask) -> Self {
        self.config.interrupts = interrupts;
        self
    }

    /// Builds the configuration, validating it.
    pub fn build(self) -> PcntResult<PcntConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
