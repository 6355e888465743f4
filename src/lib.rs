pub mod config;
pub mod error;
pub mod reader;
pub mod server;
pub mod variant;

use error::Result;
use reader::{RawReader, Verbosity};
use serde::{Deserialize, Serialize};
use tracing::debug;
pub use variant::{decode, SensorVariant};

pub mod prelude {
    pub use super::{
        reader::PulseReader, reader::RawReader, reader::Verbosity, server::MeasurementService,
        variant::SensorVariant, DhtReader, Measurement, RawWord, Sensor,
    };
}

/// The packed 32 bit frame a single bus transaction yields
pub type RawWord = u32;

/// Represents the reading gotten from the sensor
#[derive(Default, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    /// Relative humidity in percent
    pub humidity: f32,
    /// Degrees Celsius
    pub temperature: f32,
}

pub trait DhtReader {
    /// Forward a log verbosity level to the underlying bus reader
    fn verbose(&mut self, level: Verbosity);

    /// Read the sensor readings
    fn read(&mut self) -> Result<Measurement>;
}

/// A DHT family temperature and humidity sensor on one data line
#[derive(Copy, Clone, Debug)]
pub struct Sensor<R> {
    reader: R,
    variant: SensorVariant,
    channel: u8,
}

impl<R: RawReader> Sensor<R> {
    pub fn new(reader: R, variant: SensorVariant) -> Self {
        Self {
            reader,
            variant,
            channel: 0,
        }
    }

    pub fn dht11(reader: R) -> Self {
        Self::new(reader, SensorVariant::Dht11)
    }

    pub fn dht22(reader: R) -> Self {
        Self::new(reader, SensorVariant::Dht22)
    }

    /// Records which GPIO channel the reader is bound to
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn variant(&self) -> SensorVariant {
        self.variant
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl<R: RawReader> DhtReader for Sensor<R> {
    fn verbose(&mut self, level: Verbosity) {
        self.reader.set_verbosity(level);
    }

    /// One bus transaction, no retries
    fn read(&mut self) -> Result<Measurement> {
        let word = self.reader.read()?;
        debug!(
            channel = self.channel,
            variant = %self.variant,
            "raw word {word:#010x}"
        );
        Ok(self.variant.decode(word))
    }
}
