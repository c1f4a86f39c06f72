//! Safety layer: validates every settings field against the firmware's
//! accepted domain before a payload is built.
//!
//! ## DPI
//! - Any requested value is accepted and snapped to one of the twelve
//!   register steps (400 – 12,400), so DPI never fails validation.
//!
//! ## Polling Rate
//! - **Supported values**: 125, 250, 500, 1000 Hz
//! - **Encoding**: table index 0..=3
//!
//! ## Debounce
//! - **Range**: 2 – 30 ms in 2 ms steps (index 0..=14, 6-bit field)
//!
//! ## LED
//! - Mode id 0..=9, speed level 0..=2, brightness 0..=10
//!
//! ## Active stage
//! - 0..=6
//!
//! ## Safety Invariants
//! 1. Only known polling rates are accepted (no raw index pass-through)
//! 2. Debounce must be even and within 2..=30 ms
//! 3. All validation happens BEFORE any HID communication

use crate::device::{self, PollingRate};
use crate::error::{Error, Result};
use crate::led::{self, LedMode};
use crate::settings::{SettingsRecord, DPI_LEVEL_COUNT};

/// Validate a polling rate value.
pub fn validate_polling_rate(hz: u16) -> Result<PollingRate> {
    PollingRate::from_hz(hz).ok_or(Error::InvalidPollingRate(hz))
}

/// Validate a debounce time, returning its sensor index.
pub fn validate_debounce(ms: u8) -> Result<u8> {
    device::debounce_index(ms)
}

/// Validate an LED mode id.
pub fn validate_led_mode(id: u8) -> Result<LedMode> {
    LedMode::from_id(id).ok_or(Error::OutOfRange {
        field: "led_mode_id",
        value: u32::from(id),
        min: 0,
        max: u32::from(LedMode::MAX_ID),
    })
}

/// Validate an LED speed level, returning the firmware byte.
pub fn validate_led_speed(level: u8) -> Result<u8> {
    led::speed_byte(level).ok_or(Error::OutOfRange {
        field: "led_speed_level",
        value: u32::from(level),
        min: 0,
        max: u32::from(led::SPEED_MAX_LEVEL),
    })
}

/// Validate an LED brightness step.
pub fn validate_led_brightness(brightness: u8) -> Result<u8> {
    if brightness > led::BRIGHTNESS_MAX {
        return Err(Error::OutOfRange {
            field: "led_brightness",
            value: u32::from(brightness),
            min: 0,
            max: u32::from(led::BRIGHTNESS_MAX),
        });
    }
    Ok(brightness)
}

/// Validate the active DPI stage index.
pub fn validate_active_level(level: u8) -> Result<u8> {
    if usize::from(level) >= DPI_LEVEL_COUNT {
        return Err(Error::OutOfRange {
            field: "active_dpi_level",
            value: u32::from(level),
            min: 0,
            max: (DPI_LEVEL_COUNT - 1) as u32,
        });
    }
    Ok(level)
}

/// Validate every field of a record.
pub fn validate_record(record: &SettingsRecord) -> Result<()> {
    validate_active_level(record.active_dpi_level)?;
    validate_polling_rate(record.polling_rate_hz)?;
    validate_debounce(record.debounce_ms)?;
    validate_led_mode(record.led_mode_id)?;
    validate_led_speed(record.led_speed_level)?;
    validate_led_brightness(record.led_brightness)?;
    Ok(())
}
