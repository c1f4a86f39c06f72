//! Configuration session: the write/read/restore operations.
//!
//! Write: encode → locate → send `[report ID] + payload` → close.
//! Read: locate → send `A0 01 01` → two replies → payload → decode.
//!
//! Nothing is retried; a caller wanting another attempt re-runs the
//! operation, which starts again from the cached interface path.

use crate::codec::{self, Payload, FACTORY_PAYLOAD, PAYLOAD_LEN};
use crate::error::{Error, ReadPacket, Result};
use crate::locator::DeviceLocator;
use crate::settings::SettingsRecord;
use crate::status::{LogStatus, Status, StatusSink};
use crate::transport::{command_frame, payload_frame, HidBackend};
use crate::READ_TIMEOUT_MS;
use tracing::{debug, info, warn};

/// Read-config command.
pub const READ_CONFIG_COMMAND: [u8; 3] = [0xA0, 0x01, 0x01];

/// Header expected on the first read-config reply.
pub const READ_CONFIG_HEADER: [u8; 5] = [0x04, 0xA0, 0x01, 0x01, 0x01];

/// Bytes of each reply that precede payload data.
const REPLY_DATA_OFFSET: usize = 5;

/// Orchestrates device I/O for one mouse.
pub struct ConfigSession<B: HidBackend> {
    locator: DeviceLocator<B>,
    last_payload: Payload,
    status: Box<dyn StatusSink>,
}

impl<B: HidBackend> ConfigSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_locator(DeviceLocator::new(backend))
    }

    pub fn with_locator(locator: DeviceLocator<B>) -> Self {
        Self {
            locator,
            last_payload: FACTORY_PAYLOAD,
            status: Box::new(LogStatus),
        }
    }

    /// Route status updates to `sink` instead of the log.
    pub fn with_status_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.status = Box::new(sink);
        self.status.report(&Status::Ready);
        self
    }

    pub fn locator_mut(&mut self) -> &mut DeviceLocator<B> {
        &mut self.locator
    }

    /// Payload last read from or written to the device.
    ///
    /// Writes are encoded on top of it so reserved bytes survive.
    pub fn last_payload(&self) -> &Payload {
        &self.last_payload
    }

    /// Encode `record` and write it to the device.
    pub fn write_settings(&mut self, record: &SettingsRecord) -> Result<()> {
        self.status.report(&Status::Writing);
        let result = codec::encode_onto(record, &self.last_payload)
            .and_then(|payload| self.send_payload(&payload).map(|()| payload));
        match result {
            Ok(payload) => {
                self.last_payload = payload;
                self.finish(Ok(()), Status::Written)
            }
            Err(e) => self.finish(Err(e), Status::Written),
        }
    }

    /// Read the device's current settings.
    pub fn read_settings(&mut self) -> Result<SettingsRecord> {
        self.status.report(&Status::Reading);
        let result = self.read_payload().and_then(|payload| {
            let record = codec::decode(&payload)?;
            Ok((payload, record))
        });
        match result {
            Ok((payload, record)) => {
                self.last_payload = payload;
                self.finish(Ok(record), Status::ReadDone)
            }
            Err(e) => self.finish(Err(e), Status::ReadDone),
        }
    }

    /// Write the factory payload verbatim and return the factory record.
    pub fn restore_factory_defaults(&mut self) -> Result<SettingsRecord> {
        self.status.report(&Status::Restoring);
        match self.send_payload(&FACTORY_PAYLOAD) {
            Ok(()) => {
                self.last_payload = FACTORY_PAYLOAD;
                self.finish(Ok(SettingsRecord::factory()), Status::Restored)
            }
            Err(e) => self.finish(Err(e), Status::Restored),
        }
    }

    /// Locate the mouse and return the interface path, closing it again.
    pub fn probe(&mut self) -> Result<String> {
        let session = self.locator.locate()?;
        let path = session.path().to_string_lossy().into_owned();
        session.close();
        Ok(path)
    }

    fn finish<T>(&self, result: Result<T>, done: Status) -> Result<T> {
        match &result {
            Ok(_) => self.status.report(&done),
            Err(e) => self.status.report(&Status::failed(e)),
        }
        result
    }

    fn send_payload(&mut self, payload: &[u8]) -> Result<()> {
        let payload = codec::payload_from_slice(payload)?;
        let mut session = self.locator.locate()?;

        let written = session.write(&payload_frame(&payload))?;
        session.close();
        info!(bytes = written, "Settings payload written");
        Ok(())
    }

    fn read_payload(&mut self) -> Result<Payload> {
        let mut session = self.locator.locate()?;
        session.write(&command_frame(&READ_CONFIG_COMMAND))?;

        let first = session.read_with_timeout(READ_TIMEOUT_MS, ReadPacket::First)?;
        if !first.starts_with(&READ_CONFIG_HEADER) {
            warn!(
                header_hex = format_args!("{:02X?}", &first[..first.len().min(REPLY_DATA_OFFSET)]),
                "Unexpected read-config header"
            );
            session.close();
            return Err(Error::MalformedResponse {
                expected: READ_CONFIG_HEADER.to_vec(),
                actual: first.iter().take(READ_CONFIG_HEADER.len()).copied().collect(),
            });
        }

        let second = session.read_with_timeout(READ_TIMEOUT_MS, ReadPacket::Second)?;
        session.close();

        let payload = reassemble(&first, &second)?;
        debug!(payload_hex = format_args!("{:02X?}", payload), "Read-config payload");
        Ok(payload)
    }
}

/// Join the data parts (bytes 5..) of both replies and keep the first
/// 63 bytes.
fn reassemble(first: &[u8], second: &[u8]) -> Result<Payload> {
    let data: Vec<u8> = first
        .iter()
        .skip(REPLY_DATA_OFFSET)
        .chain(second.iter().skip(REPLY_DATA_OFFSET))
        .take(PAYLOAD_LEN)
        .copied()
        .collect();
    codec::payload_from_slice(&data)
}
