use std::io;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, DhtError>;

/// Why a single bus transaction with the sensor did not produce a word
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TransactionFailure {
    #[error("DHT sensor did not respond to the start signal")]
    NoResponse,
    #[error("Timed out waiting for the DHT sensor line to change state")]
    Timeout,
    #[error("DHT frame expected checksum {expected:#x} but got the checksum {calculated:#x}")]
    ChecksumMismatch { expected: u8, calculated: u8 },
    #[error("GPIO pin error: {0}")]
    Pin(String),
    #[error("{0}")]
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum DhtError {
    #[error(transparent)]
    SensorRead(#[from] TransactionFailure),
    #[error("Failed to serialize measurement: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Sensor lock poisoned by a panicked reader")]
    LockPoisoned,
    #[error("Sensor read task failed: {0}")]
    Task(String),
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[source] io::Error),
    #[cfg(feature = "rpi")]
    #[error("GPIO initialization failed: {0}")]
    Gpio(String),
}
