//! Error types for edge-config-core.

use thiserror::Error;

/// Which reply a timed-out read was waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPacket {
    /// The 500 ms handshake reply during interface discovery.
    Probe,
    /// First reply of a read-config exchange (carries the header).
    First,
    /// Second reply of a read-config exchange.
    Second,
}

impl std::fmt::Display for ReadPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Probe => write!(f, "probe"),
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
        }
    }
}

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HID backend failure (initialisation, enumeration, open).
    #[error("HID error: {0}")]
    Hid(String),

    /// No interface with the expected vendor/product pair is present.
    #[error("mouse not found; is it connected?")]
    DeviceNotFound,

    /// Interfaces were enumerated but none answered the probe.
    #[error("mouse found, but no interface answered the probe; check udev rules or permissions")]
    InterfaceNotFound,

    /// Writing a frame to the open interface failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A bounded-timeout read returned no data.
    #[error("timeout while reading {packet} reply packet")]
    ReadTimeout { packet: ReadPacket },

    /// A reply did not start with the expected header bytes.
    #[error("malformed response: expected header {expected:02X?}, got {actual:02X?}")]
    MalformedResponse { expected: Vec<u8>, actual: Vec<u8> },

    /// Payload buffer is not exactly the configuration record size.
    #[error("invalid payload length: {actual} bytes (expected {expected})")]
    InvalidPayloadLength { expected: usize, actual: usize },

    /// DPI value is not one of the firmware register entries.
    #[error("unsupported DPI value: {0}")]
    InvalidDpi(u32),

    /// Polling rate is not one of 125/250/500/1000 Hz.
    #[error("unsupported polling rate: {0} Hz")]
    InvalidPollingRate(u16),

    /// Debounce time is not an even value in 2..=30 ms.
    #[error("unsupported debounce time: {0} ms (allowed 2..=30 in 2 ms steps)")]
    InvalidDebounce(u8),

    /// Value out of safe range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
