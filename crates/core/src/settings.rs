//! The plain settings record exchanged with the presentation layer.
//!
//! The core never keeps a reference to a caller's record: encoding reads a
//! borrowed record, decoding hands back a fresh one.

use crate::led::LedMode;
use serde::{Deserialize, Serialize};

/// Number of DPI stages the firmware cycles through.
pub const DPI_LEVEL_COUNT: usize = 7;

/// Number of RGB slots in the LED palette.
pub const PALETTE_SIZE: usize = 7;

/// DPI values the firmware ships with, one per stage.
///
/// Decoding cannot recover DPI values from register bytes, so every decoded
/// record carries this ladder.
pub const CANONICAL_DPI_LADDER: [u32; DPI_LEVEL_COUNT] = [400, 800, 1200, 2400, 3200, 6200, 12400];

/// Factory palette: red, green, blue, yellow, cyan, purple, white.
pub const DEFAULT_PALETTE: [Rgb; PALETTE_SIZE] = [
    Rgb::new(0xFF, 0x00, 0x00),
    Rgb::new(0x00, 0xFF, 0x00),
    Rgb::new(0x00, 0x00, 0xFF),
    Rgb::new(0xFF, 0xFF, 0x00),
    Rgb::new(0x00, 0xFF, 0xFF),
    Rgb::new(0xFF, 0x00, 0xFF),
    Rgb::new(0xFF, 0xFF, 0xFF),
];

/// One DPI stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpiLevel {
    pub enabled: bool,
    /// Requested DPI; snapped to a supported step on encode.
    pub dpi: u32,
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
        };
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Everything the configurator can change on the mouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub dpi_levels: [DpiLevel; DPI_LEVEL_COUNT],
    /// Stage the mouse starts in (0-based).
    pub active_dpi_level: u8,
    pub polling_rate_hz: u16,
    /// Even value in 2..=30.
    pub debounce_ms: u8,
    pub angle_snap: bool,
    pub ripple_control: bool,
    /// 0..=9, see [`LedMode`].
    pub led_mode_id: u8,
    /// 0 slow, 1 medium, 2 fast.
    pub led_speed_level: u8,
    /// 0..=10.
    pub led_brightness: u8,
    pub palette: [Rgb; PALETTE_SIZE],
}

impl SettingsRecord {
    /// The settings the mouse leaves the factory with.
    pub fn factory() -> Self {
        Self {
            dpi_levels: CANONICAL_DPI_LADDER.map(|dpi| DpiLevel { enabled: true, dpi }),
            active_dpi_level: 1,
            polling_rate_hz: 250,
            debounce_ms: 12,
            angle_snap: false,
            ripple_control: false,
            led_mode_id: LedMode::Prismo.id(),
            led_speed_level: 1,
            led_brightness: 10,
            palette: DEFAULT_PALETTE,
        }
    }

    /// Bit `i` set when stage `i` is enabled.
    pub fn dpi_enable_mask(&self) -> u8 {
        self.dpi_levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.enabled)
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    /// Set every stage's enabled flag from a bitmask (bit 7 ignored).
    pub fn set_dpi_enable_mask(&mut self, mask: u8) {
        for (i, level) in self.dpi_levels.iter_mut().enumerate() {
            level.enabled = (mask >> i) & 0x01 != 0;
        }
    }

    /// The LED mode, if the id is known.
    pub fn led_mode(&self) -> Option<LedMode> {
        LedMode::from_id(self.led_mode_id)
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self::factory()
    }
}
