//! Polled synchronous slave demo
//!
//! A scripted master clocks a run of bytes into the simulated USART. The
//! slave stores every byte it receives and answers with the fixed pattern
//! `0xA0..=0xA9`, then prints both sides of the exchange.
//!
//! `cargo run -p spi-slave-polled -- --cycles 25 -ddd`

use std::error::Error;

use clap::Parser;
use hal::{ClockController, Wait};
use hal_sim::{SimClocks, SimUsart};
use log::Level;
use spi_slave::{default_tx_pattern, DuplexEngine, SlaveConfig, BUFFER_SIZE, CLOCKS};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// number of exchange cycles the master clocks
    #[arg(short, long, default_value_t = BUFFER_SIZE as u32)]
    cycles: u32,

    /// first byte the master sends; later bytes count up from it
    #[arg(short, long, default_value_t = 0)]
    start: u8,

    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        1 => Level::Info,
        2 => Level::Debug,
        3 => Level::Trace,
        _ => Level::Warn,
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string()),
    )
    .init();

    let mut clocks = SimClocks::new();
    clocks.enable_all(&CLOCKS)?;
    let mut usart = SimUsart::new(clocks);
    let master: Vec<u8> = (0..cli.cycles)
        .map(|i| cli.start.wrapping_add(i as u8))
        .collect();
    usart.queue_master_bytes(&master);

    // a stalled master would hang a real slave; the simulation gives up
    let config = SlaveConfig::default().wait(Wait::Polls(1_000));
    let mut engine: DuplexEngine<_, BUFFER_SIZE> =
        DuplexEngine::with_config(usart, default_tx_pattern(), config);
    engine.start()?;
    engine.run_cycles(cli.cycles)?;

    let sent: Vec<String> = engine
        .port()
        .master_received()
        .iter()
        .map(|byte| byte.map_or_else(|| "--".to_string(), |b| format!("{:02X}", b)))
        .collect();
    let inbound: Vec<String> = engine
        .inbound()
        .ordered()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect();
    println!("master received: {}", sent.join(" "));
    println!("slave inbound:   {}", inbound.join(" "));
    println!(
        "{} cycles, next outbound index {}, overruns {}, underruns {}",
        engine.cycles(),
        engine.outbound().read_index(),
        engine.port().overruns(),
        engine.port().underruns()
    );
    Ok(())
}
