use crate::{Measurement, RawWord};
use std::fmt;

mod dht11;
mod dht22;

/// The sensor families this crate can decode, each with its own frame layout
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum SensorVariant {
    /// Integer humidity and temperature, one byte each
    #[default]
    Dht11,
    /// Humidity and temperature in tenths, 16 bits each
    Dht22,
}

impl SensorVariant {
    /// Maps a raw word onto physical units using this variant's layout
    pub fn decode(self, word: RawWord) -> Measurement {
        match self {
            SensorVariant::Dht11 => dht11::decode(word),
            SensorVariant::Dht22 => dht22::decode(word),
        }
    }
}

impl fmt::Display for SensorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorVariant::Dht11 => f.write_str("dht11"),
            SensorVariant::Dht22 => f.write_str("dht22"),
        }
    }
}

/// Decodes `word` as sent by a sensor of the given `variant`
pub fn decode(word: RawWord, variant: SensorVariant) -> Measurement {
    variant.decode(word)
}
