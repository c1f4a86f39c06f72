//! LED lighting tables: modes, speed encoding and palette flags.

/// Backlight effect. The discriminant is the firmware mode id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LedMode {
    Prismo = 0,
    Breathe = 1,
    Steady = 2,
    Neon = 3,
    Tail = 4,
    ColorfulTail = 5,
    Stream = 6,
    Reaction = 7,
    Heart = 8,
    Off = 9,
}

impl LedMode {
    /// All modes in id order.
    pub const ALL: &'static [LedMode] = &[
        LedMode::Prismo,
        LedMode::Breathe,
        LedMode::Steady,
        LedMode::Neon,
        LedMode::Tail,
        LedMode::ColorfulTail,
        LedMode::Stream,
        LedMode::Reaction,
        LedMode::Heart,
        LedMode::Off,
    ];

    /// Highest mode id.
    pub const MAX_ID: u8 = 9;

    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Firmware name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prismo => "prismo",
            Self::Breathe => "breathe",
            Self::Steady => "steady",
            Self::Neon => "neon",
            Self::Tail => "tail",
            Self::ColorfulTail => "colorful_tail",
            Self::Stream => "stream",
            Self::Reaction => "reaction",
            Self::Heart => "heart",
            Self::Off => "off",
        }
    }

    /// Case-insensitive lookup by name; `-` and `_` are interchangeable.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == normalized)
    }

    /// How many palette slots the effect draws from (0, 1 or 7).
    pub fn color_slots(&self) -> u8 {
        match self {
            Self::Breathe | Self::Steady | Self::Tail | Self::Heart => 1,
            Self::ColorfulTail | Self::Reaction => 7,
            Self::Prismo | Self::Neon | Self::Stream | Self::Off => 0,
        }
    }

    /// Byte telling the firmware how to read the palette for this effect.
    pub fn palette_flag(&self) -> u8 {
        palette_flag(self.id())
    }
}

impl std::fmt::Display for LedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Palette flag for a raw mode id.
///
/// breathe/tail → 0x01, steady/heart → 0x00, colorful_tail → 0x4F, any other
/// id (including ids outside the table) → 0x7F.
pub fn palette_flag(mode_id: u8) -> u8 {
    match LedMode::from_id(mode_id) {
        Some(LedMode::Breathe | LedMode::Tail) => 0x01,
        Some(LedMode::Steady | LedMode::Heart) => 0x00,
        Some(LedMode::ColorfulTail) => 0x4F,
        _ => 0x7F,
    }
}

/// Effect speed level → firmware byte. The firmware counts backwards.
const SPEED_TABLE: [(u8, u8); 3] = [(0, 0x02), (1, 0x01), (2, 0x00)];

/// Highest speed level (fast).
pub const SPEED_MAX_LEVEL: u8 = 2;

/// Level used when a speed byte matches nothing in the table.
pub const SPEED_FALLBACK_LEVEL: u8 = 2;

/// Encode a speed level (0 slow, 1 medium, 2 fast).
pub fn speed_byte(level: u8) -> Option<u8> {
    SPEED_TABLE
        .iter()
        .find(|&&(l, _)| l == level)
        .map(|&(_, raw)| raw)
}

/// Decode a speed byte. First match wins; no match is level 2 (fast).
pub fn speed_level(raw: u8) -> u8 {
    SPEED_TABLE
        .iter()
        .find(|&&(_, r)| r == raw)
        .map(|&(level, _)| level)
        .unwrap_or(SPEED_FALLBACK_LEVEL)
}

/// Human-readable speed label.
pub fn speed_label(level: u8) -> &'static str {
    match level {
        0 => "slow",
        1 => "medium",
        _ => "fast",
    }
}

/// Highest brightness step.
pub const BRIGHTNESS_MAX: u8 = 10;
