//! 63-byte configuration payload codec.
//!
//! The payload is the write-config report minus its leading report ID. It
//! starts with the embedded command tag `A0 01 02`, followed by fixed-offset
//! fields:
//!
//! | Offset | Field                                              |
//! |--------|----------------------------------------------------|
//! | 0..3   | command tag `A0 01 02`                             |
//! | 3      | active DPI stage                                   |
//! | 6      | polling rate index (125/250/500/1000 Hz → 0..=3)   |
//! | 7      | DPI enable mask, bit i = stage i                   |
//! | 9..30  | 7 × `[reg, reg, 0x00]` DPI register triplets       |
//! | 34     | sensor: bit0 angle snap, bit1 ripple, bits2-7 debounce index |
//! | 36     | LED mode id                                        |
//! | 37     | LED speed (reversed: slow 0x02 … fast 0x00)        |
//! | 38     | LED brightness 0..=10                              |
//! | 40     | palette flag                                       |
//! | 41..62 | 7 × RGB palette                                    |
//!
//! Every other byte is reserved and copied verbatim from the base payload
//! the record is encoded onto.

use crate::device::{self, PollingRate};
use crate::dpi;
use crate::error::{Error, Result};
use crate::led;
use crate::safety;
use crate::settings::{
    DpiLevel, Rgb, SettingsRecord, CANONICAL_DPI_LADDER, DPI_LEVEL_COUNT, PALETTE_SIZE,
};
use tracing::trace;

/// Payload length in bytes.
pub const PAYLOAD_LEN: usize = 63;

/// A complete configuration payload.
pub type Payload = [u8; PAYLOAD_LEN];

/// Embedded write-config command tag.
pub const WRITE_CONFIG_TAG: [u8; 3] = [0xA0, 0x01, 0x02];

/// Field offsets within the payload.
///
/// The first DPI triplet starts at 9, not 8: byte 8 is a reserved `0x00` in
/// the factory payload, and only offset 9 lets the factory record encode to
/// [`FACTORY_PAYLOAD`](super::FACTORY_PAYLOAD) byte for byte.
pub mod offsets {
    pub const COMMAND: usize = 0;
    pub const ACTIVE_DPI_INDEX: usize = 3;
    pub const POLLING_RATE: usize = 6;
    pub const DPI_ENABLE_MASK: usize = 7;
    pub const DPI_VALUES_START: usize = 9;
    pub const SENSOR_PERF: usize = 34;
    pub const LED_MODE_ID: usize = 36;
    pub const LED_SPEED: usize = 37;
    pub const LED_BRIGHTNESS: usize = 38;
    pub const LED_PALETTE_FLAG: usize = 40;
    pub const DPI_COLORS_START: usize = 41;
}

const ANGLE_SNAP_BIT: u8 = 0x01;
const RIPPLE_CONTROL_BIT: u8 = 0x02;
const DEBOUNCE_SHIFT: u8 = 2;
const DEBOUNCE_MASK: u8 = 0x3F;

/// Factory payload, byte for byte.
#[rustfmt::skip]
pub const FACTORY_PAYLOAD: Payload = [
    0xA0, 0x01, 0x02, // write-config tag
    0x01,             // active stage 2
    0x02,
    0xA5,
    0x01,             // polling index 1 -> 250 Hz
    0x7F,             // all 7 stages enabled
    0x00,

    0x09, 0x09, 0x00, // 400
    0x12, 0x12, 0x00, // 800
    0x1B, 0x1B, 0x00, // 1200
    0x37, 0x37, 0x00, // 2400
    0x4A, 0x4A, 0x00, // 3200
    0x91, 0x91, 0x00, // 6200
    0x94, 0x94, 0x00, // 12400

    0x00, 0x00, 0x02,
    0x18,             // angle adjust / lift-off distance
    0x14,             // debounce 12 ms, snap and ripple off
    0xA5,

    0x00,             // prismo
    0x01,             // medium
    0x0A,             // brightness 10
    0x01,
    0x7F,             // palette flag for prismo

    0xFF, 0x00, 0x00, // red
    0x00, 0xFF, 0x00, // green
    0x00, 0x00, 0xFF, // blue
    0xFF, 0xFF, 0x00, // yellow
    0x00, 0xFF, 0xFF, // cyan
    0xFF, 0x00, 0xFF, // purple
    0xFF, 0xFF, 0xFF, // white

    0x00,
];

/// Copy a byte slice into a [`Payload`], rejecting any other length.
pub fn payload_from_slice(bytes: &[u8]) -> Result<Payload> {
    Payload::try_from(bytes).map_err(|_| Error::InvalidPayloadLength {
        expected: PAYLOAD_LEN,
        actual: bytes.len(),
    })
}

/// Encode a record onto the factory payload.
pub fn encode(record: &SettingsRecord) -> Result<Payload> {
    encode_onto(record, &FACTORY_PAYLOAD)
}

/// Encode a record onto `base`, keeping `base`'s reserved bytes.
///
/// The record is validated first; nothing is built for an invalid record.
pub fn encode_onto(record: &SettingsRecord, base: &Payload) -> Result<Payload> {
    safety::validate_record(record)?;

    let mut payload = *base;
    payload[offsets::COMMAND..offsets::COMMAND + WRITE_CONFIG_TAG.len()]
        .copy_from_slice(&WRITE_CONFIG_TAG);
    payload[offsets::ACTIVE_DPI_INDEX] = record.active_dpi_level;

    // DPI register triplets and enable mask
    for (i, level) in record.dpi_levels.iter().enumerate() {
        let (_, raw) = dpi::quantized_raw_byte(level.dpi)?;
        let at = offsets::DPI_VALUES_START + i * 3;
        payload[at..at + 3].copy_from_slice(&[raw, raw, 0x00]);
    }
    payload[offsets::DPI_ENABLE_MASK] = record.dpi_enable_mask();

    let polling = safety::validate_polling_rate(record.polling_rate_hz)?;
    payload[offsets::POLLING_RATE] = polling.index();
    payload[offsets::SENSOR_PERF] = sensor_byte(record)?;

    payload[offsets::LED_MODE_ID] = record.led_mode_id;
    payload[offsets::LED_SPEED] = safety::validate_led_speed(record.led_speed_level)?;
    payload[offsets::LED_BRIGHTNESS] = record.led_brightness;
    payload[offsets::LED_PALETTE_FLAG] = led::palette_flag(record.led_mode_id);

    // All seven slots are written, used by the mode or not.
    for (i, color) in record.palette.iter().enumerate() {
        let at = offsets::DPI_COLORS_START + i * 3;
        payload[at..at + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    trace!(payload_hex = format_args!("{:02X?}", payload), "encoded payload");
    Ok(payload)
}

fn sensor_byte(record: &SettingsRecord) -> Result<u8> {
    let debounce = safety::validate_debounce(record.debounce_ms)?;
    let mut byte = debounce << DEBOUNCE_SHIFT;
    if record.angle_snap {
        byte |= ANGLE_SNAP_BIT;
    }
    if record.ripple_control {
        byte |= RIPPLE_CONTROL_BIT;
    }
    Ok(byte)
}

/// Decode a payload, falling back to factory values for unknown bytes.
pub fn decode(payload: &[u8]) -> Result<SettingsRecord> {
    decode_over(payload, &SettingsRecord::factory())
}

/// Decode a payload into a fresh record.
///
/// Fields whose byte is not in its table keep `prior`'s value. DPI values are
/// not recoverable from register bytes: the canonical ladder is used and only
/// the enable bits come from the payload.
pub fn decode_over(payload: &[u8], prior: &SettingsRecord) -> Result<SettingsRecord> {
    let payload = payload_from_slice(payload)?;
    let mut record = prior.clone();

    let mask = payload[offsets::DPI_ENABLE_MASK];
    let mut dpi_levels = [DpiLevel {
        enabled: false,
        dpi: 0,
    }; DPI_LEVEL_COUNT];
    for (i, level) in dpi_levels.iter_mut().enumerate() {
        *level = DpiLevel {
            enabled: (mask >> i) & 0x01 != 0,
            dpi: CANONICAL_DPI_LADDER[i],
        };
    }
    record.dpi_levels = dpi_levels;

    let active = payload[offsets::ACTIVE_DPI_INDEX];
    if safety::validate_active_level(active).is_ok() {
        record.active_dpi_level = active;
    }

    if let Some(rate) = PollingRate::from_index(payload[offsets::POLLING_RATE]) {
        record.polling_rate_hz = rate.as_hz();
    }

    let sensor = payload[offsets::SENSOR_PERF];
    record.angle_snap = sensor & ANGLE_SNAP_BIT != 0;
    record.ripple_control = sensor & RIPPLE_CONTROL_BIT != 0;
    if let Some(ms) = device::debounce_ms((sensor >> DEBOUNCE_SHIFT) & DEBOUNCE_MASK) {
        record.debounce_ms = ms;
    }

    let mode = payload[offsets::LED_MODE_ID];
    if safety::validate_led_mode(mode).is_ok() {
        record.led_mode_id = mode;
    }
    record.led_speed_level = led::speed_level(payload[offsets::LED_SPEED]);
    let brightness = payload[offsets::LED_BRIGHTNESS];
    if safety::validate_led_brightness(brightness).is_ok() {
        record.led_brightness = brightness;
    }

    let mut palette = [Rgb::default(); PALETTE_SIZE];
    for (i, color) in palette.iter_mut().enumerate() {
        let at = offsets::DPI_COLORS_START + i * 3;
        *color = Rgb::new(payload[at], payload[at + 1], payload[at + 2]);
    }
    record.palette = palette;

    Ok(record)
}
