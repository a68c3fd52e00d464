//! Duplex exchange engine
//!
//! Cycle `k` (counting from 0) receives the master's `k`-th byte and sends
//! outbound byte `k mod N`: byte 0 sits in the transmit register before the
//! peripheral is enabled, and every cycle loads the byte for the next one.
//! What the master sends never changes what it gets back.

use core::convert::Infallible;

use hal::SyncSerialSlave;

use crate::buffer::CircularBuffer;
use crate::config::SlaveConfig;
use crate::{debug, info, trace, SlaveError, SlaveResult};

/// Polled slave exchanging bytes between two circular buffers
pub struct DuplexEngine<S, const N: usize> {
    port: S,
    config: SlaveConfig,
    inbound: CircularBuffer<N>,
    outbound: CircularBuffer<N>,
    started: bool,
    cycles: u32,
}

impl<S: SyncSerialSlave, const N: usize> DuplexEngine<S, N> {
    /// Engine with the default slave configuration
    pub fn new(port: S, tx_pattern: [u8; N]) -> Self {
        Self::with_config(port, tx_pattern, SlaveConfig::default())
    }

    pub fn with_config(port: S, tx_pattern: [u8; N], config: SlaveConfig) -> Self {
        Self {
            port,
            config,
            inbound: CircularBuffer::new(),
            outbound: CircularBuffer::from_array(tx_pattern),
            started: false,
            cycles: 0,
        }
    }

    /// Configure the peripheral disabled, pre-load outbound byte 0, then
    /// enable it. The outbound read index is left at 1.
    pub fn start(&mut self) -> SlaveResult<()> {
        if self.started {
            return Err(SlaveError::AlreadyStarted);
        }
        self.port.init_sync(&self.config.sync_config())?;
        let first = self.outbound.peek();
        self.port.preload_tx(first)?;
        self.port.enable(true)?;
        // byte 0 is committed only once the peripheral runs
        self.outbound.advance();
        self.started = true;
        info!("slave enabled, {} byte buffers, first byte 0x{:02x}", N, first);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// One exchange cycle: wait for a received byte, store it, then wait for
    /// the transmit slot and load the next outbound byte.
    ///
    /// Returns the byte received.
    pub fn exchange(&mut self) -> SlaveResult<u8> {
        if !self.started {
            return Err(SlaveError::NotStarted);
        }
        let wait = self.config.wait;

        let received = self.port.read_byte(wait)?;
        self.inbound.push(received);

        let next = self.outbound.peek();
        self.port.write_byte(next, wait)?;
        self.outbound.advance();

        self.cycles = self.cycles.wrapping_add(1);
        trace!("cycle {}: rx 0x{:02x} tx 0x{:02x}", self.cycles, received, next);
        Ok(received)
    }

    /// Run `n` cycles
    pub fn run_cycles(&mut self, n: u32) -> SlaveResult<()> {
        for _ in 0..n {
            self.exchange()?;
        }
        debug!("{} cycles done", n);
        Ok(())
    }

    /// Exchange forever. Only returns on a peripheral error.
    pub fn run(&mut self) -> SlaveResult<Infallible> {
        loop {
            self.exchange()?;
        }
    }

    /// Completed cycles
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn inbound(&self) -> &CircularBuffer<N> {
        &self.inbound
    }

    pub fn outbound(&self) -> &CircularBuffer<N> {
        &self.outbound
    }

    pub fn port(&self) -> &S {
        &self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::{HalError, HalResult, SyncConfig, Wait};
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Init { enable: bool },
        Enable(bool),
        Preload(u8),
        Read(u8),
        Write(u8),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        incoming: VecDeque<u8>,
        tx_busy: bool,
        failing_enables: u32,
    }

    impl SyncSerialSlave for Recorder {
        fn init_sync(&mut self, config: &SyncConfig) -> HalResult<()> {
            self.calls.push(Call::Init {
                enable: config.enable,
            });
            Ok(())
        }

        fn enable(&mut self, enable: bool) -> HalResult<()> {
            if self.failing_enables > 0 {
                self.failing_enables -= 1;
                return Err(HalError::NotConfigured);
            }
            self.calls.push(Call::Enable(enable));
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.calls.contains(&Call::Enable(true))
        }

        fn preload_tx(&mut self, byte: u8) -> HalResult<()> {
            self.calls.push(Call::Preload(byte));
            Ok(())
        }

        fn try_read(&mut self) -> nb::Result<u8, HalError> {
            let byte = self.incoming.pop_front().ok_or(nb::Error::WouldBlock)?;
            self.calls.push(Call::Read(byte));
            Ok(byte)
        }

        fn try_write(&mut self, byte: u8) -> nb::Result<(), HalError> {
            if self.tx_busy {
                return Err(nb::Error::WouldBlock);
            }
            self.calls.push(Call::Write(byte));
            Ok(())
        }
    }

    fn bounded(port: Recorder) -> DuplexEngine<Recorder, 3> {
        DuplexEngine::with_config(
            port,
            [0xA0, 0xA1, 0xA2],
            SlaveConfig::default().wait(Wait::Polls(4)),
        )
    }

    #[test]
    fn test_start_preloads_before_enable() {
        let mut engine = bounded(Recorder::default());
        engine.start().unwrap();
        assert_eq!(
            engine.port().calls,
            vec![Call::Init { enable: false }, Call::Preload(0xA0), Call::Enable(true)]
        );
        assert_eq!(engine.outbound().read_index(), 1);
        assert_eq!(engine.start(), Err(SlaveError::AlreadyStarted));
    }

    #[test]
    fn test_failed_enable_leaves_first_byte_for_retry() {
        let mut engine = bounded(Recorder {
            incoming: [0x01].into_iter().collect(),
            failing_enables: 1,
            ..Default::default()
        });
        assert_eq!(engine.start(), Err(SlaveError::Hal(HalError::NotConfigured)));
        assert!(!engine.is_started());
        assert_eq!(engine.outbound().read_index(), 0);

        engine.start().unwrap();
        let preloads: Vec<&Call> = engine
            .port()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Preload(_)))
            .collect();
        assert_eq!(preloads, vec![&Call::Preload(0xA0), &Call::Preload(0xA0)]);
        assert_eq!(engine.outbound().read_index(), 1);

        engine.exchange().unwrap();
        assert_eq!(engine.port().calls.last(), Some(&Call::Write(0xA1)));
    }

    #[test]
    fn test_exchange_requires_start() {
        let mut engine = bounded(Recorder::default());
        assert_eq!(engine.exchange(), Err(SlaveError::NotStarted));
    }

    #[test]
    fn test_cycle_reads_then_writes_next_byte() {
        let mut engine = bounded(Recorder {
            incoming: [0x01, 0x02, 0x03, 0x04].into_iter().collect(),
            ..Default::default()
        });
        engine.start().unwrap();
        engine.run_cycles(4).unwrap();

        let traffic: Vec<Call> = engine.port().calls[3..].to_vec();
        assert_eq!(
            traffic,
            vec![
                Call::Read(0x01),
                Call::Write(0xA1),
                Call::Read(0x02),
                Call::Write(0xA2),
                Call::Read(0x03),
                Call::Write(0xA0),
                Call::Read(0x04),
                Call::Write(0xA1),
            ]
        );
        assert_eq!(engine.inbound().as_slice(), &[0x04, 0x02, 0x03]);
        assert_eq!(engine.cycles(), 4);
    }

    #[test]
    fn test_blocked_transmit_keeps_outbound_index() {
        let mut engine = bounded(Recorder {
            incoming: [0x01].into_iter().collect(),
            tx_busy: true,
            ..Default::default()
        });
        engine.start().unwrap();
        assert_eq!(engine.exchange(), Err(SlaveError::Hal(HalError::Timeout)));
        assert_eq!(engine.outbound().read_index(), 1);
        assert_eq!(engine.inbound().ordered().as_slice(), &[0x01]);
    }

    #[test]
    fn test_run_stops_on_error() {
        let mut engine = bounded(Recorder {
            incoming: [0x01, 0x02].into_iter().collect(),
            ..Default::default()
        });
        engine.start().unwrap();
        assert_eq!(engine.run(), Err(SlaveError::Hal(HalError::Timeout)));
        assert_eq!(engine.cycles(), 2);
    }
}
