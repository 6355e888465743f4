use crate::{Measurement, RawWord};

/// DHT11 sends whole numbers: humidity in byte 3, temperature in byte 1.
/// The fractional bytes are ignored.
pub(crate) fn decode(word: RawWord) -> Measurement {
    Measurement {
        humidity: ((word >> 24) & 0xFF) as f32,
        temperature: ((word >> 8) & 0xFF) as f32,
    }
}
