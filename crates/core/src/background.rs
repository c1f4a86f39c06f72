//! Off-thread execution of session operations.
//!
//! Device I/O blocks for up to a second per read. Event-loop driven callers
//! use [`BackgroundSession`], which runs each operation on tokio's blocking
//! pool and hands the result back as a future. Operations are serialized:
//! only one interface is ever open.
//!
//! Compiled with the `async` feature.

use crate::error::{Error, Result};
use crate::session::ConfigSession;
use crate::settings::SettingsRecord;
use crate::transport::HidBackend;
use std::sync::{Arc, Mutex};

/// Shareable handle to a [`ConfigSession`] driven from async code.
pub struct BackgroundSession<B: HidBackend> {
    inner: Arc<Mutex<ConfigSession<B>>>,
}

impl<B: HidBackend> Clone for BackgroundSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> BackgroundSession<B>
where
    B: HidBackend + Send + 'static,
{
    pub fn new(session: ConfigSession<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Encode and write `record`. The record is moved in; the caller keeps
    /// its own copy.
    pub async fn write_settings(&self, record: SettingsRecord) -> Result<()> {
        self.run(move |session| session.write_settings(&record)).await
    }

    pub async fn read_settings(&self) -> Result<SettingsRecord> {
        self.run(|session| session.read_settings()).await
    }

    pub async fn restore_factory_defaults(&self) -> Result<SettingsRecord> {
        self.run(|session| session.restore_factory_defaults()).await
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ConfigSession<B>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut session = inner
                .lock()
                .map_err(|_| Error::Hid("session lock poisoned".into()))?;
            op(&mut session)
        })
        .await
        .map_err(|e| Error::Hid(format!("background task failed: {e}")))?
    }
}
