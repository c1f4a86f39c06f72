//! HID transport abstraction for device communication.
//!
//! Provides a trait-based backend so that real HID interfaces and simulated
//! ones share the same interface, plus [`TransportSession`], the scoped
//! owner of the single open handle.

use crate::codec::{Payload, PAYLOAD_LEN};
use crate::device::InterfaceInfo;
use crate::error::{Error, ReadPacket, Result};
use std::ffi::{CStr, CString};
use tracing::{debug, trace, warn};

/// Report ID carried by every outgoing frame.
pub const REPORT_ID: u8 = 0x04;

/// Full frame length: report ID + 63 bytes.
pub const FRAME_LEN: usize = PAYLOAD_LEN + 1;

/// A full outgoing frame.
pub type Frame = [u8; FRAME_LEN];

/// Build a zero-padded frame from a command (report ID prepended).
pub fn command_frame(command: &[u8]) -> Frame {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = REPORT_ID;
    let len = command.len().min(FRAME_LEN - 1);
    frame[1..=len].copy_from_slice(&command[..len]);
    frame
}

/// Build the write-config frame: report ID followed by the payload.
pub fn payload_frame(payload: &Payload) -> Frame {
    command_frame(payload)
}

/// An open HID interface. Dropping the handle closes it.
pub trait HidHandle: Send {
    /// Write one output report, returning the number of bytes written.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read one input report, waiting at most `timeout_ms`.
    ///
    /// Returns 0 when nothing arrived in time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

/// Enumerates and opens HID interfaces.
pub trait HidBackend {
    /// List interfaces matching a vendor/product pair, in enumeration order.
    fn enumerate(&mut self, vendor_id: u16, product_id: u16) -> Result<Vec<InterfaceInfo>>;

    /// Open an interface by platform path.
    fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>>;
}

/// Scoped ownership of one open interface.
///
/// The handle is released when the session is closed or dropped, and
/// immediately after any failed write or read.
pub struct TransportSession {
    path: CString,
    handle: Option<Box<dyn HidHandle>>,
}

impl TransportSession {
    pub fn new(path: CString, handle: Box<dyn HidHandle>) -> Self {
        debug!(path = %path.to_string_lossy(), "HID interface opened");
        Self {
            path,
            handle: Some(handle),
        }
    }

    /// Open `path` through `backend`.
    pub fn open(backend: &dyn HidBackend, path: &CStr) -> Result<Self> {
        let handle = backend.open(path)?;
        Ok(Self::new(path.to_owned(), handle))
    }

    /// Path of the interface this session was opened on.
    pub fn path(&self) -> &CStr {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Write a frame. A failed write closes the session.
    pub fn write(&mut self, frame: &[u8]) -> Result<usize> {
        let handle = self.handle_mut()?;
        trace!(report_hex = format_args!("{:02X?}", frame), "HID TX");

        match handle.write(frame) {
            Ok(written) => Ok(written),
            Err(e) => {
                warn!(path = %self.path.to_string_lossy(), error = %e, "HID write failed");
                self.release();
                Err(Error::WriteFailed(e.to_string()))
            }
        }
    }

    /// Read one reply frame within `timeout_ms`.
    ///
    /// An empty read is reported as [`Error::ReadTimeout`] for `packet`.
    /// Any failure closes the session.
    pub fn read_with_timeout(&mut self, timeout_ms: i32, packet: ReadPacket) -> Result<Vec<u8>> {
        let handle = self.handle_mut()?;
        let mut buf = [0u8; FRAME_LEN];

        let n = match handle.read_timeout(&mut buf, timeout_ms) {
            Ok(n) => n,
            Err(e) => {
                warn!(%packet, error = %e, "HID read failed");
                self.release();
                return Err(Error::ReadTimeout { packet });
            }
        };

        if n == 0 {
            debug!(%packet, timeout_ms, "HID read timed out");
            self.release();
            return Err(Error::ReadTimeout { packet });
        }

        let reply = buf[..n.min(FRAME_LEN)].to_vec();
        trace!(report_hex = format_args!("{:02X?}", reply), "HID RX");
        Ok(reply)
    }

    /// Close the interface.
    pub fn close(mut self) {
        self.release();
    }

    fn handle_mut(&mut self) -> Result<&mut Box<dyn HidHandle>> {
        self.handle
            .as_mut()
            .ok_or_else(|| Error::Hid("HID session already closed".into()))
    }

    fn release(&mut self) {
        if self.handle.take().is_some() {
            debug!(path = %self.path.to_string_lossy(), "HID interface closed");
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

/// [`HidBackend`] over the system HID stack via `hidapi`.
pub struct HidApiBackend {
    api: hidapi::HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new().map_err(|e| Error::Hid(format!("hidapi init: {e}")))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&mut self, vendor_id: u16, product_id: u16) -> Result<Vec<InterfaceInfo>> {
        self.api
            .refresh_devices()
            .map_err(|e| Error::Hid(format!("refresh devices: {e}")))?;

        let interfaces: Vec<InterfaceInfo> = self
            .api
            .device_list()
            .filter(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
            .map(|info| InterfaceInfo {
                path: info.path().to_owned(),
                interface_number: info.interface_number(),
                usage_page: info.usage_page(),
                usage: info.usage(),
            })
            .collect();

        debug!(
            vid = format_args!("0x{:04X}", vendor_id),
            pid = format_args!("0x{:04X}", product_id),
            count = interfaces.len(),
            "HID enumeration complete"
        );
        Ok(interfaces)
    }

    fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>> {
        let device = self.api.open_path(path).map_err(|e| {
            Error::Hid(format!(
                "open HID interface {}: {e}",
                path.to_string_lossy()
            ))
        })?;
        Ok(Box::new(HidApiHandle { device }))
    }
}

struct HidApiHandle {
    device: hidapi::HidDevice,
}

impl HidHandle for HidApiHandle {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.device
            .write(data)
            .map_err(|e| Error::Hid(format!("write: {e}")))
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| Error::Hid(format!("read_timeout: {e}")))
    }
}

/// A simulated HID backend for testing.
///
/// Each interface follows a scripted [`MockBehavior`]; the `Mouse` behavior
/// emulates the configuration firmware (probe, read-config, write-config).
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::codec::FACTORY_PAYLOAD;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Probe reply the firmware sends.
    pub const PROBE_REPLY: [u8; 7] = [0x04, 0xA0, 0x01, 0x00, 0x00, 0x0A, 0x23];

    /// How a simulated interface reacts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockBehavior {
        /// Configuration interface of the mouse.
        Mouse,
        /// Accepts writes, never replies.
        Silent,
        /// Replies to everything with a near-miss of the probe reply.
        WrongReply,
        /// Cannot be opened.
        Unopenable,
        /// Opens, but every write fails.
        WriteFails,
        /// Like `Mouse`, but the read-config header is corrupted.
        BadHeader,
        /// Like `Mouse`, but only the first read-config reply is sent.
        DropsSecondReply,
    }

    #[derive(Debug)]
    struct MockInterface {
        info: InterfaceInfo,
        behavior: MockBehavior,
    }

    #[derive(Debug)]
    struct MockState {
        interfaces: Vec<MockInterface>,
        config: Payload,
        enumerations: usize,
        opens: Vec<String>,
        live_handles: usize,
        writes: Vec<(String, Vec<u8>)>,
        read_timeouts: Vec<i32>,
    }

    /// Shared-state simulated backend; clones observe the same device.
    #[derive(Debug, Clone)]
    pub struct MockBackend {
        state: Arc<Mutex<MockState>>,
    }

    impl MockBackend {
        /// Build a backend with one interface per behavior, named `mock-0`, `mock-1`, ...
        pub fn new(behaviors: &[MockBehavior]) -> Self {
            let interfaces = behaviors
                .iter()
                .enumerate()
                .map(|(i, &behavior)| MockInterface {
                    info: InterfaceInfo {
                        path: CString::new(format!("mock-{i}")).unwrap(),
                        interface_number: i as i32,
                        usage_page: 0xFF00,
                        usage: 0x0001,
                    },
                    behavior,
                })
                .collect();
            Self {
                state: Arc::new(Mutex::new(MockState {
                    interfaces,
                    config: FACTORY_PAYLOAD,
                    enumerations: 0,
                    opens: Vec::new(),
                    live_handles: 0,
                    writes: Vec::new(),
                    read_timeouts: Vec::new(),
                })),
            }
        }

        /// Number of enumerations performed.
        pub fn enumerations(&self) -> usize {
            self.state.lock().unwrap().enumerations
        }

        /// Paths opened so far, in order.
        pub fn opens(&self) -> Vec<String> {
            self.state.lock().unwrap().opens.clone()
        }

        /// Handles currently open.
        pub fn live_handles(&self) -> usize {
            self.state.lock().unwrap().live_handles
        }

        /// Every frame written, with the path it went to.
        pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
            self.state.lock().unwrap().writes.clone()
        }

        /// Timeout of every read, in order.
        pub fn read_timeouts(&self) -> Vec<i32> {
            self.state.lock().unwrap().read_timeouts.clone()
        }

        /// Payload the emulated firmware currently holds.
        pub fn stored_config(&self) -> Payload {
            self.state.lock().unwrap().config
        }

        pub fn set_stored_config(&self, config: Payload) {
            self.state.lock().unwrap().config = config;
        }

        /// Change how an interface behaves (e.g. to unplug it).
        pub fn set_behavior(&self, index: usize, behavior: MockBehavior) {
            self.state.lock().unwrap().interfaces[index].behavior = behavior;
        }

        /// Remove every interface, as if the mouse were unplugged.
        pub fn unplug(&self) {
            self.state.lock().unwrap().interfaces.clear();
        }
    }

    impl HidBackend for MockBackend {
        fn enumerate(&mut self, _vendor_id: u16, _product_id: u16) -> Result<Vec<InterfaceInfo>> {
            let mut state = self.state.lock().unwrap();
            state.enumerations += 1;
            Ok(state.interfaces.iter().map(|i| i.info.clone()).collect())
        }

        fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>> {
            let mut state = self.state.lock().unwrap();
            let path_str = path.to_string_lossy().into_owned();
            state.opens.push(path_str.clone());

            let behavior = state
                .interfaces
                .iter()
                .find(|i| i.info.path.as_c_str() == path)
                .map(|i| i.behavior)
                .ok_or_else(|| Error::Hid(format!("mock: no such interface {path_str}")))?;
            if behavior == MockBehavior::Unopenable {
                return Err(Error::Hid(format!("mock: permission denied for {path_str}")));
            }

            state.live_handles += 1;
            Ok(Box::new(MockHandle {
                path: path_str,
                behavior,
                pending: VecDeque::new(),
                state: Arc::clone(&self.state),
            }))
        }
    }

    struct MockHandle {
        path: String,
        behavior: MockBehavior,
        pending: VecDeque<Vec<u8>>,
        state: Arc<Mutex<MockState>>,
    }

    fn reply(prefix: &[u8], body: &[u8]) -> Vec<u8> {
        let mut frame = prefix.to_vec();
        frame.extend_from_slice(body);
        frame.resize(FRAME_LEN, 0);
        frame
    }

    impl MockHandle {
        fn emulate_firmware(&mut self, data: &[u8]) {
            let mut state = self.state.lock().unwrap();
            match data.get(1..4) {
                Some([0xA0, 0x01, 0x00]) => self.pending.push_back(reply(&PROBE_REPLY, &[])),
                Some([0xA0, 0x01, 0x01]) => {
                    let header: &[u8] = if self.behavior == MockBehavior::BadHeader {
                        &[0x04, 0xA0, 0x01, 0x01, 0x00]
                    } else {
                        &[0x04, 0xA0, 0x01, 0x01, 0x01]
                    };
                    let config = state.config;
                    self.pending.push_back(reply(header, &config[..59]));
                    if self.behavior != MockBehavior::DropsSecondReply {
                        self.pending
                            .push_back(reply(&[0x04, 0xA0, 0x01, 0x01, 0x02], &config[59..]));
                    }
                }
                Some([0xA0, 0x01, 0x02]) if data.len() == FRAME_LEN => {
                    state.config.copy_from_slice(&data[1..]);
                }
                _ => {}
            }
        }
    }

    impl HidHandle for MockHandle {
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            self.state
                .lock()
                .unwrap()
                .writes
                .push((self.path.clone(), data.to_vec()));

            match self.behavior {
                MockBehavior::WriteFails => {
                    return Err(Error::Hid("mock: write failed".into()));
                }
                MockBehavior::Silent | MockBehavior::Unopenable => {}
                MockBehavior::WrongReply => {
                    self.pending
                        .push_back(reply(&[0x04, 0xA0, 0x01, 0x00, 0x00, 0x0A, 0x24], &[]));
                }
                MockBehavior::Mouse
                | MockBehavior::BadHeader
                | MockBehavior::DropsSecondReply => self.emulate_firmware(data),
            }
            Ok(data.len())
        }

        fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
            self.state.lock().unwrap().read_timeouts.push(timeout_ms);
            match self.pending.pop_front() {
                Some(frame) => {
                    let n = frame.len().min(buf.len());
                    buf[..n].copy_from_slice(&frame[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            if let Ok(mut state) = self.state.lock() {
                state.live_handles -= 1;
            }
        }
    }
}
