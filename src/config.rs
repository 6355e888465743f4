use clap::Parser;

use crate::reader::Verbosity;
use crate::SensorVariant;

pub const DEFAULT_PORT: u16 = 10000;

/// Serve DHT11/DHT22 readings over HTTP
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(version, about)]
pub struct Config {
    /// Listening host
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Listening port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// GPIO pin number in BCM numbering
    #[arg(long)]
    pub pin: u8,

    /// Sensor log verbosity, written to stderr
    #[arg(short, long, default_value_t = 0)]
    pub verbose: Verbosity,

    /// Which sensor family is wired to the pin
    #[arg(long, value_enum, default_value_t = SensorVariant::Dht11)]
    pub sensor: SensorVariant,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default tracing filter for the configured verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            i32::MIN..=0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
