//! Pulse counter underflow demo
//!
//! Presses the simulated push-button a number of times. Each press toggles
//! the relay line, the relay line feeds the counter input, and every counter
//! underflow toggles the LED from the counter interrupt.
//!
//! `cargo run -p pcnt-underflow -- --presses 36 -dd`

use std::error::Error;

use clap::Parser;
use hal::{GpioController, Level};
use hal_sim::{SimClocks, SimConfig, SimGpio, SimNvic};
use log::Level as LogLevel;
use pcnt::{init, DemoPins, Lines, Monitors, PcntConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// number of button presses to simulate
    #[arg(short, long, default_value_t = 36)]
    presses: u32,

    /// counter reload value
    #[arg(short, long, default_value_t = 5)]
    top: u16,

    /// counter start value (defaults to top)
    #[arg(short, long)]
    initial: Option<u16>,

    /// raw edges per counted pulse
    #[arg(short, long, default_value_t = 2)]
    ratio: u16,

    /// contact bounces per press (swallowed by the glitch filter)
    #[arg(short, long, default_value_t = 0)]
    bounce: u32,

    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        3 => LogLevel::Trace,
        _ => LogLevel::Warn,
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string()),
    )
    .init();

    let config = PcntConfig::builder()
        .top(cli.top)
        .initial(cli.initial.unwrap_or(cli.top))
        .oversampling_ratio(cli.ratio)
        .build()?;

    let mut clocks = SimClocks::new();
    let mut nvic = SimNvic::new(SimConfig::default());
    let mut gpio = SimGpio::new(clocks.clone(), nvic.clone());
    let pins = DemoPins::default();
    let monitors = Monitors::default();

    // relay output jumpered to the counter input
    gpio.connect(pins.relay, pins.counter_input)?;
    let lines = Lines {
        led: gpio.output_pin(pins.led)?,
        relay: gpio.output_pin(pins.relay)?,
        input: gpio.pulse_input(pins.counter_input)?,
    };
    let mut unit = init(&mut clocks, &mut gpio, &mut nvic, &pins, &config, lines, &monitors)?;

    let mut led = gpio.read(pins.led)?;
    for press in 1..=cli.presses {
        gpio.drive_input_with_bounce(pins.button, Level::Low, cli.bounce)?;
        gpio.release(pins.button)?;
        unit.sample(&mut nvic)?;

        let now = gpio.read(pins.led)?;
        if now != led {
            println!("press {:3}: LED {:?}", press, now);
            led = now;
        }
    }

    let stats = monitors.led.snapshot();
    println!(
        "{} presses, {} underflows, {} LED toggles, counter at {}",
        cli.presses,
        unit.underflows(),
        stats.reactions,
        unit.value()
    );
    Ok(())
}
