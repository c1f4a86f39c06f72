//! edge-config-core: interface discovery, HID transport, and the settings
//! codec for the ZET/ARDOR GAMING Edge mouse.
//!
//! The mouse is configured by exchanging 64-byte HID reports with one of
//! its interfaces. Callers work with [`settings::SettingsRecord`] values and
//! [`status::Status`] updates; byte offsets stay inside [`codec`].

#[cfg(feature = "async")]
pub mod background;
pub mod codec;
pub mod device;
pub mod dpi;
pub mod error;
#[cfg(test)]
mod integration_tests;
pub mod led;
pub mod locator;
pub mod safety;
pub mod session;
pub mod settings;
pub mod status;
pub mod transport;

/// USB Vendor ID of the mouse.
pub const VENDOR_ID: u16 = 0x2EA8;

/// USB Product ID of the mouse.
pub const PRODUCT_ID: u16 = 0x2203;

/// How long the handshake reply may take, in milliseconds.
pub const PROBE_TIMEOUT_MS: i32 = 500;

/// How long each read-config reply may take, in milliseconds.
pub const READ_TIMEOUT_MS: i32 = 1000;
