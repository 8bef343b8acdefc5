//! In this example, we will connect to a pico-ice over USB serial, read back the status register,
//! and then write the start-up configuration.

use clap::{
    Parser,
    ValueEnum,
};
use picoice::prelude::*;
use picoice::transport::serial::DEFAULT_PORT;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Firmware {
    /// 16-bit reads
    Wide,
    /// 8-bit reads
    Narrow,
}

impl From<Firmware> for Variant {
    fn from(f: Firmware) -> Self {
        match f {
            Firmware::Wide => Variant::Wide,
            Firmware::Narrow => Variant::Narrow,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Configure a pico-ice after power-on")]
struct Args {
    /// Serial port the board is attached to
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,
    /// Read response width of the board's firmware
    #[arg(long, value_enum, default_value_t = Firmware::Wide)]
    variant: Firmware,
    /// Log every frame sent and received
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::TRACE
        } else {
            tracing::Level::INFO
        })
        .init();

    let transport = Serial::open(&SerialConfig::with_port(&args.port))?;
    let mut client = RegisterClient::new(transport, args.variant.into());

    let status = client.read_register(0x02)?;
    println!("Register 0x02 = {status:#06x}");

    run_bringup(&mut client, &PICO_ICE_BRINGUP)?;
    println!("Bring-up complete");
    Ok(())
}
