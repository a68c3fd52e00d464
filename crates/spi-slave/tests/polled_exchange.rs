//! Exchange engine against the simulated USART and a scripted master

use hal::{ClockController, HalError, SyncSerialSlave, Wait};
use hal_sim::{SimClocks, SimUsart};
use spi_slave::{default_tx_pattern, DuplexEngine, SlaveConfig, SlaveError, BUFFER_SIZE, CLOCKS};

fn clocked_usart() -> SimUsart {
    let mut clocks = SimClocks::new();
    clocks.enable_all(&CLOCKS).unwrap();
    SimUsart::new(clocks)
}

fn engine_with(master: &[u8]) -> DuplexEngine<SimUsart, BUFFER_SIZE> {
    let mut usart = clocked_usart();
    usart.queue_master_bytes(master);
    DuplexEngine::with_config(
        usart,
        default_tx_pattern(),
        SlaveConfig::default().wait(Wait::Polls(8)),
    )
}

fn received(engine: &DuplexEngine<SimUsart, BUFFER_SIZE>) -> Vec<u8> {
    engine
        .port()
        .master_received()
        .iter()
        .map(|byte| byte.expect("slave underran"))
        .collect()
}

#[test]
fn ten_cycles_fill_inbound_and_send_pattern() {
    let master: Vec<u8> = (0x00..0x0A).collect();
    let mut engine = engine_with(&master);
    engine.start().unwrap();
    engine.run_cycles(10).unwrap();

    assert_eq!(engine.inbound().ordered().as_slice(), master.as_slice());
    assert_eq!(
        received(&engine),
        vec![0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9]
    );
    // cycle 10 already loaded byte 0 again
    assert_eq!(engine.port().tx_register(), Some(0xA0));
    assert_eq!(engine.outbound().read_index(), 1);
    assert_eq!(engine.inbound().write_index(), 0);
    assert_eq!(engine.port().underruns(), 0);
    assert_eq!(engine.port().overruns(), 0);
}

#[test]
fn first_byte_is_loaded_before_master_clocks() {
    let mut engine = engine_with(&[]);
    assert!(!engine.port().is_enabled());
    engine.start().unwrap();
    assert!(engine.port().is_enabled());
    assert_eq!(engine.port().tx_register(), Some(0xA0));
    assert!(engine.port().master_received().is_empty());
}

#[test]
fn silent_master_times_out_with_budget() {
    let mut engine = engine_with(&[]);
    engine.start().unwrap();
    assert_eq!(engine.exchange(), Err(SlaveError::Hal(HalError::Timeout)));
    assert!(engine.inbound().is_empty());
}

#[test]
fn unclocked_peripheral_refuses_start() {
    let mut engine: DuplexEngine<_, BUFFER_SIZE> =
        DuplexEngine::new(SimUsart::new(SimClocks::new()), default_tx_pattern());
    assert_eq!(engine.start(), Err(SlaveError::Hal(HalError::ClockDisabled)));
    assert!(!engine.is_started());
}

#[test]
fn outbound_stream_ignores_inbound_content() {
    let mut quiet = engine_with(&[0x00; 7]);
    let mut noisy = engine_with(&[0xFF, 0x13, 0x37, 0xA5, 0x00, 0x42, 0x99]);
    for engine in [&mut quiet, &mut noisy] {
        engine.start().unwrap();
        engine.run_cycles(7).unwrap();
    }
    assert_eq!(received(&quiet), received(&noisy));
}

#[test]
fn indices_wrap_over_many_cycles() {
    let master: Vec<u8> = (0..25u8).map(|i| i.wrapping_mul(3)).collect();
    let mut engine = engine_with(&master);
    engine.start().unwrap();
    engine.run_cycles(25).unwrap();

    let expected: Vec<u8> = (0..25).map(|k| 0xA0 + (k % 10) as u8).collect();
    assert_eq!(received(&engine), expected);
    assert_eq!(engine.inbound().ordered().as_slice(), &master[15..]);
    assert_eq!(engine.inbound().write_index(), 5);
    assert_eq!(engine.outbound().read_index(), 6);
}

#[test]
fn single_slot_buffers_repeat_one_byte() {
    let mut usart = clocked_usart();
    usart.queue_master_bytes(&[1, 2, 3]);
    let mut engine = DuplexEngine::with_config(usart, [0x5A], SlaveConfig::default().wait(Wait::Polls(4)));
    engine.start().unwrap();
    engine.run_cycles(3).unwrap();

    assert_eq!(engine.port().master_received(), &[Some(0x5A); 3]);
    assert_eq!(engine.inbound().ordered().as_slice(), &[3]);
    assert_eq!(engine.outbound().read_index(), 0);
}

#[test]
fn run_returns_when_master_stops() {
    let mut engine = engine_with(&[9, 8, 7]);
    engine.start().unwrap();
    assert_eq!(engine.run(), Err(SlaveError::Hal(HalError::Timeout)));
    assert_eq!(engine.cycles(), 3);
    assert_eq!(engine.start(), Err(SlaveError::AlreadyStarted));
}
