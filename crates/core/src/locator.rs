//! Discovery of the configuration interface.
//!
//! The mouse enumerates as several HID interfaces under one VID/PID; only
//! one answers configuration commands. Lookup is two-tier:
//!
//! 1. the cached path of the last interface that answered, opened without
//!    re-probing;
//! 2. otherwise a full enumeration, probing each candidate in order with
//!    `A0 01 00` and accepting the first whose reply starts with
//!    `04 A0 01 00 00 0A 23`.

use crate::device::InterfaceInfo;
use crate::error::{Error, ReadPacket, Result};
use crate::transport::{command_frame, HidBackend, TransportSession};
use crate::{PRODUCT_ID, PROBE_TIMEOUT_MS, VENDOR_ID};
use std::ffi::{CStr, CString};
use tracing::{debug, info, warn};

/// Handshake command.
pub const PROBE_COMMAND: [u8; 3] = [0xA0, 0x01, 0x00];

/// Reply prefix identifying the configuration interface.
pub const PROBE_REPLY: [u8; 7] = [0x04, 0xA0, 0x01, 0x00, 0x00, 0x0A, 0x23];

/// Finds and opens the configuration interface, remembering where it was.
///
/// Only the locator writes the cached path.
pub struct DeviceLocator<B: HidBackend> {
    backend: B,
    vendor_id: u16,
    product_id: u16,
    cached_path: Option<CString>,
}

impl<B: HidBackend> DeviceLocator<B> {
    /// Locator for the Edge mouse.
    pub fn new(backend: B) -> Self {
        Self::with_ids(backend, VENDOR_ID, PRODUCT_ID)
    }

    pub fn with_ids(backend: B, vendor_id: u16, product_id: u16) -> Self {
        Self {
            backend,
            vendor_id,
            product_id,
            cached_path: None,
        }
    }

    /// Path of the last interface that answered the probe.
    pub fn cached_path(&self) -> Option<&CStr> {
        self.cached_path.as_deref()
    }

    /// Enumerate candidate interfaces without probing them.
    pub fn list_interfaces(&mut self) -> Result<Vec<InterfaceInfo>> {
        self.backend.enumerate(self.vendor_id, self.product_id)
    }

    /// Open the configuration interface.
    ///
    /// A cached path that no longer opens is dropped and the lookup falls
    /// through to enumeration.
    pub fn locate(&mut self) -> Result<TransportSession> {
        if let Some(session) = self.open_cached() {
            return Ok(session);
        }
        self.scan()
    }

    fn open_cached(&mut self) -> Option<TransportSession> {
        let path = self.cached_path.as_deref()?;
        match TransportSession::open(&self.backend, path) {
            Ok(session) => {
                debug!(path = %path.to_string_lossy(), "Reusing cached interface");
                Some(session)
            }
            Err(e) => {
                warn!(
                    path = %path.to_string_lossy(),
                    error = %e,
                    "Cached interface failed to open, rescanning"
                );
                self.cached_path = None;
                None
            }
        }
    }

    fn scan(&mut self) -> Result<TransportSession> {
        let candidates = self.list_interfaces()?;
        if candidates.is_empty() {
            debug!(
                vid = format_args!("0x{:04X}", self.vendor_id),
                pid = format_args!("0x{:04X}", self.product_id),
                "No matching HID interfaces"
            );
            return Err(Error::DeviceNotFound);
        }

        for candidate in &candidates {
            let path = candidate.path.as_c_str();
            let session = match TransportSession::open(&self.backend, path) {
                Ok(session) => session,
                Err(e) => {
                    debug!(path = %candidate.path_lossy(), error = %e, "Candidate failed to open");
                    continue;
                }
            };

            if let Some(session) = probe(session) {
                info!(
                    path = %candidate.path_lossy(),
                    interface = candidate.interface_number,
                    "Configuration interface found"
                );
                self.cached_path = Some(candidate.path.clone());
                return Ok(session);
            }
        }

        warn!(
            candidates = candidates.len(),
            "No interface answered the probe"
        );
        Err(Error::InterfaceNotFound)
    }
}

/// Send the handshake and keep the session only if the reply matches.
///
/// The session is closed on every other outcome.
fn probe(mut session: TransportSession) -> Option<TransportSession> {
    if let Err(e) = session.write(&command_frame(&PROBE_COMMAND)) {
        debug!(path = %session.path().to_string_lossy(), error = %e, "Probe write failed");
        return None;
    }

    match session.read_with_timeout(PROBE_TIMEOUT_MS, ReadPacket::Probe) {
        Ok(reply) if reply.starts_with(&PROBE_REPLY) => Some(session),
        Ok(reply) => {
            debug!(
                path = %session.path().to_string_lossy(),
                reply_hex = format_args!("{:02X?}", &reply[..reply.len().min(PROBE_REPLY.len())]),
                "Probe reply mismatch"
            );
            None
        }
        Err(e) => {
            debug!(path = %session.path().to_string_lossy(), error = %e, "No probe reply");
            None
        }
    }
}
