//! Raspberry Pi GPIO access through `rppal`.
//!
//! [`Controller::init`] is the process-wide GPIO bring-up and has to happen
//! before any sensor is opened. Pins are restored by `rppal` when dropped.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use rppal::gpio::{Gpio, IoPin, Mode, Bias};
use rppal::hal::Delay;
use tracing::info;

use crate::error::{DhtError, Result};
use crate::reader::PulseReader;

/// Reader type produced by [`Controller::open`]
pub type GpioReader = PulseReader<OpenDrainPin, Delay>;

/// Owns the GPIO peripheral for the lifetime of the process
pub struct Controller {
    gpio: Gpio,
}

impl Controller {
    pub fn init() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| DhtError::Gpio(e.to_string()))?;
        info!("GPIO initialized");
        Ok(Self { gpio })
    }

    /// Claims BCM pin `pin` as the sensor's data line
    pub fn open(&self, pin: u8) -> Result<GpioReader> {
        let pin = self
            .gpio
            .get(pin)
            .map_err(|e| DhtError::Gpio(e.to_string()))?;
        Ok(PulseReader::new(OpenDrainPin::new(pin.into_io(Mode::Input)), Delay::new()))
    }
}

/// Emulates an open-drain line on a push-pull pin: low drives the line,
/// high releases it to the pull-up.
pub struct OpenDrainPin {
    io: IoPin,
}

impl OpenDrainPin {
    fn new(mut io: IoPin) -> Self {
        io.set_bias(Bias::PullUp);
        Self { io }
    }
}

impl ErrorType for OpenDrainPin {
    type Error = Infallible;
}

impl OutputPin for OpenDrainPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.io.set_mode(Mode::Output);
        self.io.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.io.set_mode(Mode::Input);
        Ok(())
    }
}

impl InputPin for OpenDrainPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.io.is_high())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.io.is_low())
    }
}
