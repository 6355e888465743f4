use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use tracing::{debug, trace};

use crate::error::TransactionFailure;
use crate::reader::{RawReader, Verbosity};
use crate::RawWord;

/// Maximum time to wait (in microseconds) for the line to change state.
const TIMEOUT_US: u8 = 100;

/// How long the host holds the line low to wake the sensor up.
/// DHT11 needs at least 18ms, DHT22 at least 1ms.
const START_LOW_MS: u32 = 20;

/// Time after the rising edge at which a bit is sampled. A 0 bit is high
/// for ~27us and a 1 bit for ~70us.
const SAMPLE_US: u32 = 35;

/// Reads raw DHT frames by timing pulses on a single data line.
///
/// The pin is expected to behave like an open-drain line with a pull-up:
/// `set_high` releases it, `set_low` drives it.
pub struct PulseReader<PIN, D> {
    pin: PIN,
    delay: D,
    verbosity: Verbosity,
}

impl<PIN, DELAY, E> PulseReader<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    E: core::fmt::Debug,
{
    pub fn new(pin: PIN, delay: DELAY) -> Self {
        PulseReader {
            pin,
            delay,
            verbosity: 0,
        }
    }

    /// Receives one 40 bit frame and checks its checksum
    fn read_frame(&mut self) -> Result<[u8; 4], TransactionFailure> {
        self.start()?;

        if self.verbosity > 0 {
            debug!("Read 40bits");
        }
        let mut data = [0; 4];
        for (i, b) in data.iter_mut().enumerate() {
            *b = self.read_byte(i)?;
        }
        let checksum = self.read_byte(4)?;

        if self.verbosity > 1 {
            trace!(
                "{:02x} {:02x} {:02x} {:02x} {:02x}",
                data[0],
                data[1],
                data[2],
                data[3],
                checksum
            );
        }

        let calculated = data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v));
        if calculated != checksum {
            if self.verbosity > 0 {
                debug!("Checksum failed");
            }
            return Err(TransactionFailure::ChecksumMismatch {
                expected: checksum,
                calculated,
            });
        }
        Ok(data)
    }

    /// Wakes the sensor and waits for its 80us low / 80us high response.
    fn start(&mut self) -> Result<(), TransactionFailure> {
        if self.verbosity > 0 {
            debug!("Initiate read");
        }
        self.pin.set_low().map_err(pin_error)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(pin_error)?;
        self.delay.delay_us(40);

        if self.verbosity > 0 {
            debug!("Waiting respond");
        }
        self.wait_for_low().map_err(no_response)?;
        self.wait_for_high().map_err(no_response)?;

        if self.verbosity > 0 {
            debug!("Ready to signal");
        }
        Ok(())
    }

    /// Reads one byte, MSB first. `index` is only used for logging.
    fn read_byte(&mut self, index: usize) -> Result<u8, TransactionFailure> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit = self.read_bit()?;
            if bit {
                byte |= 1 << (7 - i);
            }
            if self.verbosity > 1 {
                trace!("#{:02}: {}", index * 8 + i, bit as u8);
            }
        }

        Ok(byte)
    }

    /// The bit value is given by how long the line stays high after the
    /// sensor releases it.
    fn read_bit(&mut self) -> Result<bool, TransactionFailure> {
        self.wait_for_low()?;
        self.wait_for_high()?;

        self.delay.delay_us(SAMPLE_US);
        let bit_is_one = self.pin.is_high().map_err(pin_error)?;
        self.wait_for_low()?;

        Ok(bit_is_one)
    }

    fn wait_for_high(&mut self) -> Result<(), TransactionFailure> {
        Self::wait_for_state(&mut self.delay, || self.pin.is_high())
    }

    fn wait_for_low(&mut self) -> Result<(), TransactionFailure> {
        Self::wait_for_state(&mut self.delay, || self.pin.is_low())
    }

    /// Polls `condition` once per microsecond until it holds, or fails with
    /// `TransactionFailure::Timeout` after `TIMEOUT_US` polls.
    fn wait_for_state<F>(delay: &mut DELAY, mut condition: F) -> Result<(), TransactionFailure>
    where
        F: FnMut() -> Result<bool, E>,
    {
        for _ in 0..TIMEOUT_US {
            if condition().map_err(pin_error)? {
                return Ok(());
            }
            delay.delay_us(1);
        }
        Err(TransactionFailure::Timeout)
    }
}

impl<PIN, DELAY, E> RawReader for PulseReader<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    E: core::fmt::Debug,
{
    fn set_verbosity(&mut self, level: Verbosity) {
        self.verbosity = level;
    }

    fn read(&mut self) -> Result<RawWord, TransactionFailure> {
        let data = self.read_frame()?;
        if self.verbosity > 0 {
            debug!("Succeeded");
        }
        Ok(RawWord::from_be_bytes(data))
    }
}

fn pin_error<E: core::fmt::Debug>(err: E) -> TransactionFailure {
    TransactionFailure::Pin(format!("{err:?}"))
}

fn no_response(err: TransactionFailure) -> TransactionFailure {
    match err {
        TransactionFailure::Timeout => TransactionFailure::NoResponse,
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, Transaction as DelayTx};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTx,
    };

    fn start_sequence() -> Vec<PinTx> {
        vec![
            // host pulls the line low, then releases it
            PinTx::set(PinState::Low),
            PinTx::set(PinState::High),
            // sensor responds
            PinTx::get(PinState::Low),
            PinTx::get(PinState::High),
        ]
    }

    fn start_delays() -> Vec<DelayTx> {
        vec![DelayTx::delay_ms(START_LOW_MS), DelayTx::delay_us(40)]
    }

    fn encode_byte(byte: u8) -> Vec<PinTx> {
        (0..8)
            .flat_map(|i| {
                let bit = (byte >> (7 - i)) & 1;
                vec![
                    PinTx::get(PinState::Low),
                    PinTx::get(PinState::High),
                    PinTx::get(if bit == 1 {
                        PinState::High
                    } else {
                        PinState::Low
                    }),
                    PinTx::get(PinState::Low),
                ]
            })
            .collect()
    }

    fn frame(bytes: [u8; 5]) -> (Vec<PinTx>, Vec<DelayTx>) {
        let mut pin_states = start_sequence();
        for byte in bytes {
            pin_states.extend(encode_byte(byte));
        }
        let mut delays = start_delays();
        delays.extend(std::iter::repeat(DelayTx::delay_us(SAMPLE_US)).take(40));
        (pin_states, delays)
    }

    #[test]
    fn start_sequence_wakes_sensor() {
        let mut pin = PinMock::new(&start_sequence());
        let mut delay = CheckedDelay::new(&start_delays());

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        reader.start().unwrap();

        pin.done();
        delay.done();
    }

    #[test]
    fn silent_sensor_is_no_response() {
        let mut pin_states = vec![PinTx::set(PinState::Low), PinTx::set(PinState::High)];
        pin_states.extend((0..TIMEOUT_US).map(|_| PinTx::get(PinState::High)));
        let mut pin = PinMock::new(&pin_states);

        let mut delays = start_delays();
        delays.extend((0..TIMEOUT_US).map(|_| DelayTx::delay_us(1)));
        let mut delay = CheckedDelay::new(&delays);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert_eq!(reader.read().unwrap_err(), TransactionFailure::NoResponse);

        pin.done();
        delay.done();
    }

    #[test]
    fn read_bit_one() {
        let mut pin = PinMock::new(&[
            PinTx::get(PinState::Low),
            PinTx::get(PinState::High),
            PinTx::get(PinState::High),
            PinTx::get(PinState::Low),
        ]);
        let mut delay = CheckedDelay::new(&[DelayTx::delay_us(SAMPLE_US)]);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert!(reader.read_bit().unwrap());

        pin.done();
        delay.done();
    }

    #[test]
    fn read_bit_zero_after_polling() {
        let mut pin = PinMock::new(&[
            PinTx::get(PinState::High),
            PinTx::get(PinState::Low),
            PinTx::get(PinState::Low),
            PinTx::get(PinState::High),
            PinTx::get(PinState::Low),
            PinTx::get(PinState::High),
            PinTx::get(PinState::Low),
        ]);
        let mut delay = CheckedDelay::new(&[
            DelayTx::delay_us(1),
            DelayTx::delay_us(1),
            DelayTx::delay_us(SAMPLE_US),
            DelayTx::delay_us(1),
        ]);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert!(!reader.read_bit().unwrap());

        pin.done();
        delay.done();
    }

    #[test]
    fn stuck_line_times_out() {
        let pin_states: Vec<PinTx> = (0..TIMEOUT_US).map(|_| PinTx::get(PinState::High)).collect();
        let mut pin = PinMock::new(&pin_states);
        let delays: Vec<DelayTx> = (0..TIMEOUT_US).map(|_| DelayTx::delay_us(1)).collect();
        let mut delay = CheckedDelay::new(&delays);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert_eq!(reader.read_bit().unwrap_err(), TransactionFailure::Timeout);

        pin.done();
        delay.done();
    }

    #[test]
    fn read_byte_msb_first() {
        let mut pin = PinMock::new(&encode_byte(0b1011_1010));
        let mut delay = CheckedDelay::new(&vec![DelayTx::delay_us(SAMPLE_US); 8]);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert_eq!(reader.read_byte(0).unwrap(), 0b1011_1010);

        pin.done();
        delay.done();
    }

    #[test]
    fn valid_frame_is_packed_big_endian() {
        let (pin_states, delays) = frame([0x01, 0x90, 0x00, 0xF6, 0x87]);
        let mut pin = PinMock::new(&pin_states);
        let mut delay = CheckedDelay::new(&delays);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        reader.set_verbosity(2);
        assert_eq!(reader.read().unwrap(), 0x0190_00F6);

        pin.done();
        delay.done();
    }

    #[test]
    fn checksum_mismatch() {
        let (pin_states, delays) = frame([0x01, 0x90, 0x00, 0xF6, 0x81]);
        let mut pin = PinMock::new(&pin_states);
        let mut delay = CheckedDelay::new(&delays);

        let mut reader = PulseReader::new(pin.clone(), &mut delay);
        assert_eq!(
            reader.read().unwrap_err(),
            TransactionFailure::ChecksumMismatch {
                expected: 0x81,
                calculated: 0x87,
            }
        );

        pin.done();
        delay.done();
    }
}
