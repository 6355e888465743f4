use clap::Parser;
use dht_http::config::Config;
use dht_http::error::Result;
use dht_http::prelude::*;
use dht_http::reader::rpi::Controller;
use dht_http::server::serve;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(config).await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    let gpio = Controller::init()?;
    info!("Initializing {} on pin {}", config.sensor, config.pin);

    let mut sensor = Sensor::new(gpio.open(config.pin)?, config.sensor).with_channel(config.pin);
    sensor.verbose(config.verbose);

    serve(&config.addr(), MeasurementService::new(sensor)).await
}
