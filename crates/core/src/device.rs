//! Device model: interface descriptors, polling rate and debounce tables.

use crate::error::{Error, Result};
use std::ffi::CString;

/// Human-readable model name.
pub const MODEL_NAME: &str = "ZET/ARDOR GAMING Edge";

/// One enumerated HID interface of the mouse.
///
/// The mouse exposes several interfaces under the same VID/PID; only one of
/// them accepts configuration commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// Platform HID path used to open the interface.
    pub path: CString,
    pub interface_number: i32,
    pub usage_page: u16,
    pub usage: u16,
}

impl InterfaceInfo {
    /// Display form of the path.
    pub fn path_lossy(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Polling rate options supported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u16)]
pub enum PollingRate {
    Hz125 = 125,
    Hz250 = 250,
    Hz500 = 500,
    Hz1000 = 1000,
}

impl PollingRate {
    /// Convert from raw Hz value.
    pub fn from_hz(hz: u16) -> Option<Self> {
        match hz {
            125 => Some(Self::Hz125),
            250 => Some(Self::Hz250),
            500 => Some(Self::Hz500),
            1000 => Some(Self::Hz1000),
            _ => None,
        }
    }

    /// Get the Hz value.
    pub fn as_hz(&self) -> u16 {
        *self as u16
    }

    /// Payload index byte: 125 Hz → 0 … 1000 Hz → 3.
    pub fn index(&self) -> u8 {
        match self {
            Self::Hz125 => 0,
            Self::Hz250 => 1,
            Self::Hz500 => 2,
            Self::Hz1000 => 3,
        }
    }

    /// Reverse of [`PollingRate::index`].
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Hz125),
            1 => Some(Self::Hz250),
            2 => Some(Self::Hz500),
            3 => Some(Self::Hz1000),
            _ => None,
        }
    }

    /// All supported rates.
    pub const ALL: &'static [PollingRate] = &[
        PollingRate::Hz125,
        PollingRate::Hz250,
        PollingRate::Hz500,
        PollingRate::Hz1000,
    ];
}

impl std::fmt::Display for PollingRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.as_hz())
    }
}

/// Debounce bounds in milliseconds.
pub const DEBOUNCE_MIN_MS: u8 = 2;
pub const DEBOUNCE_MAX_MS: u8 = 30;
/// Highest valid debounce index (30 ms).
pub const DEBOUNCE_MAX_INDEX: u8 = 14;

/// Debounce time → 6-bit sensor index (`ms / 2 - 1`).
pub fn debounce_index(ms: u8) -> Result<u8> {
    if !(DEBOUNCE_MIN_MS..=DEBOUNCE_MAX_MS).contains(&ms) || ms % 2 != 0 {
        return Err(Error::InvalidDebounce(ms));
    }
    Ok(ms / 2 - 1)
}

/// Sensor index → debounce time, `None` outside 0..=14.
pub fn debounce_ms(index: u8) -> Option<u8> {
    (index <= DEBOUNCE_MAX_INDEX).then(|| (index + 1) * 2)
}
