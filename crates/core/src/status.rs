//! Status reporting toward the presentation layer.
//!
//! Operations announce progress and outcome as [`Status`] values. The
//! consumer renders them; it never feeds anything back into the session
//! while doing so.

use crate::error::Error;
use tracing::{info, warn};

/// Classification of failures for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Mouse is not plugged in.
    Disconnected,
    /// Mouse is present but no interface could be used (host permissions).
    PermissionDenied,
    /// The mouse answered with something unexpected or not at all.
    Protocol,
    /// The caller supplied a value outside the firmware's domain.
    InvalidInput,
    /// HID stack failure.
    Backend,
}

impl ErrorClass {
    pub fn classify(err: &Error) -> Self {
        match err {
            Error::DeviceNotFound => Self::Disconnected,
            Error::InterfaceNotFound => Self::PermissionDenied,
            Error::WriteFailed(_)
            | Error::ReadTimeout { .. }
            | Error::MalformedResponse { .. } => Self::Protocol,
            Error::InvalidPayloadLength { .. }
            | Error::InvalidDpi(_)
            | Error::InvalidPollingRate(_)
            | Error::InvalidDebounce(_)
            | Error::OutOfRange { .. } => Self::InvalidInput,
            Error::Hid(_) => Self::Backend,
        }
    }
}

/// Progress and outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Factory defaults are loaded, nothing sent yet.
    Ready,
    Writing,
    Written,
    Reading,
    ReadDone,
    Restoring,
    Restored,
    Failed { class: ErrorClass, message: String },
}

impl Status {
    pub fn failed(err: &Error) -> Self {
        Self::Failed {
            class: ErrorClass::classify(err),
            message: err.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready; factory defaults loaded"),
            Self::Writing => write!(f, "writing settings to device..."),
            Self::Written => write!(f, "settings written"),
            Self::Reading => write!(f, "reading settings from device..."),
            Self::ReadDone => write!(f, "settings read"),
            Self::Restoring => write!(f, "restoring factory defaults..."),
            Self::Restored => write!(f, "factory defaults restored"),
            Self::Failed { message, .. } => write!(f, "error: {message}"),
        }
    }
}

/// Receiver of status updates.
pub trait StatusSink: Send {
    fn report(&self, status: &Status);
}

impl<F> StatusSink for F
where
    F: Fn(&Status) + Send,
{
    fn report(&self, status: &Status) {
        self(status)
    }
}

/// Default sink: status lines go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn report(&self, status: &Status) {
        if status.is_failure() {
            warn!(%status, "Operation failed");
        } else {
            info!(%status, "Status");
        }
    }
}
