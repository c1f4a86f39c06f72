//! DPI quantization against the firmware's fixed register table.
//!
//! The sensor only accepts twelve DPI steps. Each step has a one-byte
//! register value; the payload stores that byte, never the DPI itself.
//!
//! | DPI   | Register |
//! |-------|----------|
//! | 400   | 0x09     |
//! | 800   | 0x12     |
//! | 1200  | 0x1B     |
//! | 1500  | 0x22     |
//! | 1800  | 0x29     |
//! | 2000  | 0x2E     |
//! | 2100  | 0x30     |
//! | 2400  | 0x37     |
//! | 3000  | 0x45     |
//! | 3200  | 0x4A     |
//! | 6200  | 0x91     |
//! | 12400 | 0x94     |

use crate::error::{Error, Result};

/// Supported DPI values and their register bytes, ascending by DPI.
pub const DPI_REGISTERS: [(u32, u8); 12] = [
    (400, 0x09),
    (800, 0x12),
    (1200, 0x1B),
    (1500, 0x22),
    (1800, 0x29),
    (2000, 0x2E),
    (2100, 0x30),
    (2400, 0x37),
    (3000, 0x45),
    (3200, 0x4A),
    (6200, 0x91),
    (12400, 0x94),
];

/// Smallest supported DPI.
pub const DPI_MIN: u32 = 400;
/// Largest supported DPI.
pub const DPI_MAX: u32 = 12400;

/// Whether `dpi` is exactly one of the supported steps.
pub fn is_supported(dpi: u32) -> bool {
    DPI_REGISTERS.iter().any(|&(value, _)| value == dpi)
}

/// Snap a requested DPI to the nearest supported step.
///
/// Exact matches are returned unchanged. Otherwise the table is scanned in
/// ascending order and a candidate only replaces the current best when it is
/// strictly closer, so a tie resolves to the smaller DPI (1000 → 800).
pub fn quantize(requested: u32) -> u32 {
    if is_supported(requested) {
        return requested;
    }

    let mut best = DPI_MIN;
    let mut best_diff = u32::MAX;
    for &(value, _) in DPI_REGISTERS.iter() {
        let diff = value.abs_diff(requested);
        if diff < best_diff {
            best_diff = diff;
            best = value;
        }
    }
    best
}

/// Register byte for a supported DPI.
///
/// Callers are expected to pass a value produced by [`quantize`]; anything
/// else is rejected with [`Error::InvalidDpi`].
pub fn raw_byte(dpi: u32) -> Result<u8> {
    DPI_REGISTERS
        .iter()
        .find(|&&(value, _)| value == dpi)
        .map(|&(_, raw)| raw)
        .ok_or(Error::InvalidDpi(dpi))
}

/// Quantize and look up the register byte in one step.
pub fn quantized_raw_byte(requested: u32) -> Result<(u32, u8)> {
    let dpi = quantize(requested);
    Ok((dpi, raw_byte(dpi)?))
}
