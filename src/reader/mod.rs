use crate::error::TransactionFailure;
use crate::RawWord;

mod pulse;
pub use pulse::PulseReader;
#[cfg(feature = "rpi")]
pub mod rpi;

/// Log verbosity handed through to the bus reader
pub type Verbosity = i32;

/// One physical bus transaction with the sensor
pub trait RawReader {
    /// Sets how chatty the reader is about the transaction
    fn set_verbosity(&mut self, level: Verbosity);

    /// Performs one blocking transaction and returns the packed 32-bit frame
    fn read(&mut self) -> core::result::Result<RawWord, TransactionFailure>;
}

impl<R: RawReader + ?Sized> RawReader for &mut R {
    fn set_verbosity(&mut self, level: Verbosity) {
        (**self).set_verbosity(level)
    }

    fn read(&mut self) -> core::result::Result<RawWord, TransactionFailure> {
        (**self).read()
    }
}
