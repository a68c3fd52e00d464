//! Threshold counter
//!
//! The counter lives in `0..=top`. Counting down, a pulse at zero is the
//! underflow: the value reloads to `top` in the same step and the pulse
//! reports [`CounterEvent::Underflow`]. Counting up, a pulse at `top` wraps
//! to zero and reports [`CounterEvent::Overflow`]. A `top` of zero therefore
//! fires on every pulse.

use hal::Edge;

use crate::config::{Direction, InterruptMask, PcntConfig};
use crate::{debug, PcntResult};

/// Event produced by a counted pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterEvent {
    Underflow,
    Overflow,
}

impl CounterEvent {
    /// Interrupt enable bit for this event
    pub const fn mask(self) -> InterruptMask {
        match self {
            CounterEvent::Underflow => InterruptMask::UNDERFLOW,
            CounterEvent::Overflow => InterruptMask::OVERFLOW,
        }
    }
}

/// Polarity filter and oversampler in front of the counter
#[derive(Debug, Clone)]
pub struct EdgeGate {
    polarity: Edge,
    ratio: u16,
    accepted: u16,
}

impl EdgeGate {
    pub const fn new(polarity: Edge, ratio: u16) -> Self {
        Self {
            polarity,
            ratio,
            accepted: 0,
        }
    }

    /// Feed one raw edge; true when it completes a counted pulse
    pub fn admit(&mut self, edge: Edge) -> bool {
        if !self.polarity.accepts(edge) {
            return false;
        }
        self.accepted += 1;
        if self.accepted >= self.ratio {
            self.accepted = 0;
            true
        } else {
            false
        }
    }

    /// Raw edges accepted towards the next pulse
    pub fn accepted(&self) -> u16 {
        self.accepted
    }
}

/// Counter with reload-on-underflow semantics
#[derive(Debug, Clone)]
pub struct ThresholdCounter {
    value: u16,
    top: u16,
    direction: Direction,
    gate: EdgeGate,
}

impl ThresholdCounter {
    /// Configure a counter. This is the only way to obtain one, so a counter
    /// never sees a pulse before it has been configured.
    pub fn new(config: &PcntConfig) -> PcntResult<Self> {
        config.validate()?;
        debug!(
            "counter configured: top={} initial={} ratio={}",
            config.top, config.initial, config.oversampling_ratio
        );
        Ok(Self {
            value: config.initial,
            top: config.top,
            direction: config.direction,
            gate: EdgeGate::new(config.polarity, config.oversampling_ratio),
        })
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn gate(&self) -> &EdgeGate {
        &self.gate
    }

    /// Feed one raw edge through the gate; steps the counter when the gate
    /// completes a pulse
    pub fn pulse_event(&mut self, edge: Edge) -> Option<CounterEvent> {
        if self.gate.admit(edge) {
            self.step()
        } else {
            None
        }
    }

    /// Apply one counted pulse
    pub fn step(&mut self) -> Option<CounterEvent> {
        match self.direction {
            Direction::Down if self.value == 0 => {
                self.value = self.top;
                Some(CounterEvent::Underflow)
            }
            Direction::Down => {
                self.value -= 1;
                None
            }
            Direction::Up if self.value >= self.top => {
                self.value = 0;
                Some(CounterEvent::Overflow)
            }
            Direction::Up => {
                self.value += 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(top: u16, direction: Direction, ratio: u16) -> ThresholdCounter {
        let initial = match direction {
            Direction::Down => top,
            Direction::Up => 0,
        };
        let config = PcntConfig::builder()
            .top(top)
            .initial(initial)
            .direction(direction)
            .oversampling_ratio(ratio)
            .build()
            .unwrap();
        ThresholdCounter::new(&config).unwrap()
    }

    #[test]
    fn test_underflow_every_top_plus_one_pulses() {
        for top in [0u16, 1, 5, 9] {
            let mut c = counter(top, Direction::Down, 1);
            let period = top as u32 + 1;
            for n in 1..=(period * 4) {
                let event = c.step();
                if n % period == 0 {
                    assert_eq!(event, Some(CounterEvent::Underflow), "top={} pulse={}", top, n);
                    assert_eq!(c.value(), top);
                } else {
                    assert_eq!(event, None, "top={} pulse={}", top, n);
                }
                assert!(c.value() <= top);
            }
        }
    }

    #[test]
    fn test_overflow_counting_up() {
        let mut c = counter(3, Direction::Up, 1);
        let events: Vec<_> = (0..8).map(|_| c.step()).collect();
        assert_eq!(
            events,
            vec![
                None,
                None,
                None,
                Some(CounterEvent::Overflow),
                None,
                None,
                None,
                Some(CounterEvent::Overflow),
            ]
        );
        assert_eq!(c.value(), 0);
    }

    #[test]
    fn test_fewer_edges_than_ratio_do_not_count() {
        let mut c = counter(5, Direction::Down, 3);
        assert_eq!(c.pulse_event(Edge::Rising), None);
        assert_eq!(c.pulse_event(Edge::Falling), None);
        assert_eq!(c.value(), 5);
        assert_eq!(c.gate().accepted(), 2);

        assert_eq!(c.pulse_event(Edge::Rising), None);
        assert_eq!(c.value(), 4);
        assert_eq!(c.gate().accepted(), 0);
    }

    #[test]
    fn test_polarity_filter() {
        let config = PcntConfig::builder()
            .oversampling_ratio(1)
            .polarity(Edge::Rising)
            .build()
            .unwrap();
        let mut c = ThresholdCounter::new(&config).unwrap();
        for _ in 0..10 {
            assert_eq!(c.pulse_event(Edge::Falling), None);
        }
        assert_eq!(c.value(), 5);
        c.pulse_event(Edge::Rising);
        assert_eq!(c.value(), 4);
    }

    #[test]
    fn test_oversampled_underflow_edge_numbers() {
        // top 5, ratio 2: underflow on raw edge 12, 24, ...
        let mut c = counter(5, Direction::Down, 2);
        let mut fired = Vec::new();
        for n in 1..=36u32 {
            let edge = if n % 2 == 1 { Edge::Rising } else { Edge::Falling };
            if c.pulse_event(edge).is_some() {
                fired.push(n);
            }
        }
        assert_eq!(fired, vec![12, 24, 36]);
    }

    #[test]
    fn test_starting_mid_range() {
        let config = PcntConfig::builder().top(5).initial(1).oversampling_ratio(1).build().unwrap();
        let mut c = ThresholdCounter::new(&config).unwrap();
        assert_eq!(c.step(), None);
        assert_eq!(c.step(), Some(CounterEvent::Underflow));
        assert_eq!(c.value(), 5);
    }
}
