use crate::{Measurement, RawWord};

const TENTHS: f32 = 10f32;

/// DHT22 sends tenths: humidity in the high half-word, temperature in the low one
pub(crate) fn decode(word: RawWord) -> Measurement {
    let raw_humidity = (word >> 16) & 0xFFFF;
    let raw_temp = word & 0xFFFF;

    Measurement {
        humidity: raw_humidity as f32 / TENTHS,
        temperature: raw_temp as f32 / TENTHS,
    }
}
