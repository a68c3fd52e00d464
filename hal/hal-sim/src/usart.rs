//! Simulated USART in synchronous slave mode
//!
//! The master side is scripted. An exchange cycle shifts one master byte into
//! the receive register and shifts the transmit register out to the master at
//! the same time. Cycles happen either explicitly through
//! [`SimUsart::master_exchange`] or lazily: when the slave polls for a
//! received byte and the receive register is empty, the master clocks its next
//! scripted byte.
//!
//! The model has a single-byte receive register and a single-byte transmit
//! register. A cycle with nothing loaded for transmit is an underrun (the
//! master sees an undefined byte, recorded as `None`); a cycle that arrives
//! while the previous byte is still unread is an overrun and the new byte is
//! lost. Both are counted but never reported to the slave.

use std::collections::VecDeque;

use hal::clock::ClockDomain;
use hal::error::{HalError, HalResult};
use hal::usart::{SyncConfig, SyncSerialSlave};

use crate::clock::SimClocks;

/// Simulated synchronous slave with a scripted master
pub struct SimUsart {
    clocks: SimClocks,
    config: Option<SyncConfig>,
    enabled: bool,
    txdata: Option<u8>,
    rxdata: Option<u8>,
    script: VecDeque<u8>,
    master_received: Vec<Option<u8>>,
    overruns: u32,
    underruns: u32,
}

impl SimUsart {
    pub fn new(clocks: SimClocks) -> Self {
        Self {
            clocks,
            config: None,
            enabled: false,
            txdata: None,
            rxdata: None,
            script: VecDeque::new(),
            master_received: Vec::new(),
            overruns: 0,
            underruns: 0,
        }
    }

    /// Queue bytes the master clocks out on future cycles
    pub fn queue_master_bytes(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().copied());
    }

    /// Bytes still waiting in the master script
    pub fn pending_master_bytes(&self) -> usize {
        self.script.len()
    }

    /// Run one exchange cycle driven by the master.
    ///
    /// Returns what the master shifted in, `None` for an underrun. A disabled
    /// slave does not drive its output and ignores the clock.
    pub fn master_exchange(&mut self, mosi: u8) -> HalResult<Option<u8>> {
        if self.config.is_none() {
            return Err(HalError::NotConfigured);
        }
        if !self.enabled {
            return Ok(None);
        }

        let miso = self.txdata.take();
        if miso.is_none() {
            self.underruns += 1;
            log::trace!("usart: transmit underrun");
        }
        if self.rxdata.is_some() {
            self.overruns += 1;
            log::trace!("usart: receive overrun, {:#04x} lost", mosi);
        } else {
            self.rxdata = Some(mosi);
        }
        self.master_received.push(miso);
        Ok(miso)
    }

    /// Every byte the master has received so far, in cycle order
    pub fn master_received(&self) -> &[Option<u8>] {
        &self.master_received
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    /// Byte currently waiting in the transmit register
    pub fn tx_register(&self) -> Option<u8> {
        self.txdata
    }

    fn clock_scripted_cycle(&mut self) -> HalResult<()> {
        if self.enabled && self.rxdata.is_none() {
            if let Some(mosi) = self.script.pop_front() {
                self.master_exchange(mosi)?;
            }
        }
        Ok(())
    }
}

impl SyncSerialSlave for SimUsart {
    fn init_sync(&mut self, config: &SyncConfig) -> HalResult<()> {
        self.clocks.require(ClockDomain::Usart0)?;
        if config.master {
            // only the slave side is modelled
            return Err(HalError::NotSupported);
        }
        self.config = Some(config.clone());
        self.enabled = config.enable;
        self.txdata = None;
        self.rxdata = None;
        log::debug!(
            "usart: sync slave {:?} {:?}, enabled={}",
            config.mode,
            config.bit_order,
            config.enable
        );
        Ok(())
    }

    fn enable(&mut self, enable: bool) -> HalResult<()> {
        if self.config.is_none() {
            return Err(HalError::NotConfigured);
        }
        self.enabled = enable;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn preload_tx(&mut self, byte: u8) -> HalResult<()> {
        if self.config.is_none() {
            return Err(HalError::NotConfigured);
        }
        self.txdata = Some(byte);
        Ok(())
    }

    fn try_read(&mut self) -> nb::Result<u8, HalError> {
        if self.config.is_none() {
            return Err(nb::Error::Other(HalError::NotConfigured));
        }
        self.clock_scripted_cycle().map_err(nb::Error::Other)?;
        self.rxdata.take().ok_or(nb::Error::WouldBlock)
    }

    fn try_write(&mut self, byte: u8) -> nb::Result<(), HalError> {
        if self.config.is_none() {
            return Err(nb::Error::Other(HalError::NotConfigured));
        }
        if self.txdata.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        self.txdata = Some(byte);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::clock::ClockController;
    use hal::usart::{BitOrder, Wait};

    fn slave_config(enable: bool) -> SyncConfig {
        SyncConfig {
            master: false,
            bit_order: BitOrder::MsbFirst,
            enable,
            ..SyncConfig::default()
        }
    }

    fn clocked() -> SimUsart {
        let mut clocks = SimClocks::new();
        clocks.enable_clock_domain(ClockDomain::Usart0).unwrap();
        SimUsart::new(clocks)
    }

    #[test]
    fn test_init_needs_clock() {
        let mut usart = SimUsart::new(SimClocks::new());
        assert_eq!(usart.init_sync(&slave_config(false)), Err(HalError::ClockDisabled));
    }

    #[test]
    fn test_master_mode_not_modelled() {
        let mut usart = clocked();
        assert_eq!(usart.init_sync(&SyncConfig::default()), Err(HalError::NotSupported));
    }

    #[test]
    fn test_exchange_without_preload_underruns() {
        let mut usart = clocked();
        usart.init_sync(&slave_config(true)).unwrap();
        assert_eq!(usart.master_exchange(0x11).unwrap(), None);
        assert_eq!(usart.underruns(), 1);
        assert_eq!(usart.read_byte(Wait::Polls(1)), Ok(0x11));
    }

    #[test]
    fn test_disabled_slave_ignores_clock() {
        let mut usart = clocked();
        usart.init_sync(&slave_config(false)).unwrap();
        usart.preload_tx(0xA0).unwrap();
        assert_eq!(usart.master_exchange(0x01).unwrap(), None);
        assert_eq!(usart.tx_register(), Some(0xA0));
        assert_eq!(usart.read_byte(Wait::Polls(5)), Err(HalError::Timeout));
    }

    #[test]
    fn test_unread_byte_overruns() {
        let mut usart = clocked();
        usart.init_sync(&slave_config(true)).unwrap();
        usart.master_exchange(0x01).unwrap();
        usart.master_exchange(0x02).unwrap();
        assert_eq!(usart.overruns(), 1);
        assert_eq!(usart.read_byte(Wait::Polls(1)), Ok(0x01));
    }

    #[test]
    fn test_write_blocks_while_slot_full() {
        let mut usart = clocked();
        usart.init_sync(&slave_config(true)).unwrap();
        usart.write_byte(0x42, Wait::Polls(1)).unwrap();
        assert_eq!(usart.write_byte(0x43, Wait::Polls(3)), Err(HalError::Timeout));
        assert_eq!(usart.master_exchange(0x00).unwrap(), Some(0x42));
        assert_eq!(usart.write_byte(0x43, Wait::Polls(1)), Ok(()));
    }

    #[test]
    fn test_scripted_master_clocks_on_poll() {
        let mut usart = clocked();
        usart.init_sync(&slave_config(true)).unwrap();
        usart.queue_master_bytes(&[0x10, 0x20]);
        usart.preload_tx(0xA0).unwrap();
        assert_eq!(usart.read_byte_blocking(), Ok(0x10));
        usart.write_byte_blocking(0xA1).unwrap();
        assert_eq!(usart.read_byte_blocking(), Ok(0x20));
        assert_eq!(usart.master_received(), &[Some(0xA0), Some(0xA1)]);
        assert_eq!(usart.pending_master_bytes(), 0);
    }
}
