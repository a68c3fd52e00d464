//! Slave peripheral settings

use hal::{BitOrder, ClockDomain, SpiMode, SyncConfig, Wait};

/// Clock domains to enable before [`crate::DuplexEngine::start`]
pub const CLOCKS: [ClockDomain; 2] = [ClockDomain::Gpio, ClockDomain::Usart0];

/// Capacity of both exchange buffers in the demo
pub const BUFFER_SIZE: usize = 10;

/// Outbound pattern `0xA0, 0xA1, ...`, one byte per slot
pub const fn default_tx_pattern<const N: usize>() -> [u8; N] {
    let mut pattern = [0u8; N];
    let mut i = 0;
    while i < N {
        pattern[i] = 0xA0u8.wrapping_add(i as u8);
        i += 1;
    }
    pattern
}

/// Synchronous slave configuration.
///
/// Defaults to clock mode 0 (clock idles low, data sampled on the first
/// edge), MSB first, and unbounded status polling.
#[derive(Debug, Clone)]
pub struct SlaveConfig {
    pub mode: SpiMode,
    pub bit_order: BitOrder,
    /// Poll budget for receive-complete and transmit-free
    pub wait: Wait,
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self {
            mode: SpiMode::Mode0,
            bit_order: BitOrder::MsbFirst,
            wait: Wait::Forever,
        }
    }
}

impl SlaveConfig {
    pub fn mode(mut self, mode: SpiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Bound every status poll; meant for test harnesses
    pub fn wait(mut self, wait: Wait) -> Self {
        self.wait = wait;
        self
    }

    /// Peripheral settings: slave, left disabled until the first byte is
    /// pre-loaded
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            master: false,
            mode: self.mode,
            bit_order: self.bit_order,
            enable: false,
            ..SyncConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern: [u8; BUFFER_SIZE] = default_tx_pattern();
        assert_eq!(
            pattern,
            [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9]
        );
    }

    #[test]
    fn test_sync_config_is_disabled_slave() {
        let sync = SlaveConfig::default().sync_config();
        assert!(!sync.master);
        assert!(!sync.enable);
        assert_eq!(sync.mode, SpiMode::Mode0);
        assert_eq!(sync.bit_order, BitOrder::MsbFirst);
    }
}
