//! Integration tests: exercise the full flow against a simulated mouse.
//!
//! The simulated backend exposes several interfaces, only one of which runs
//! the configuration firmware, and stores whatever payload is written so it
//! can be read back.

#[cfg(test)]
mod tests {
    use crate::codec::{self, offsets, FACTORY_PAYLOAD};
    use crate::error::Error;
    use crate::led::LedMode;
    use crate::session::ConfigSession;
    use crate::settings::{Rgb, SettingsRecord, CANONICAL_DPI_LADDER};
    use crate::status::Status;
    use crate::transport::mock::{MockBackend, MockBehavior};
    use std::sync::{Arc, Mutex};

    /// Keyboard-style interface, vendor interface with wrong firmware, then
    /// the configuration interface.
    fn create_mock_edge() -> MockBackend {
        MockBackend::new(&[
            MockBehavior::Silent,
            MockBehavior::WrongReply,
            MockBehavior::Mouse,
        ])
    }

    /// Test: write → read cycle carries every recoverable field.
    #[test]
    fn full_write_read_cycle() {
        let backend = create_mock_edge();
        let mut session = ConfigSession::new(backend.clone());

        let mut record = SettingsRecord::factory();
        record.active_dpi_level = 4;
        record.polling_rate_hz = 1000;
        record.debounce_ms = 4;
        record.angle_snap = true;
        record.ripple_control = true;
        record.led_mode_id = LedMode::ColorfulTail.id();
        record.led_speed_level = 2;
        record.led_brightness = 7;
        record.palette[0] = Rgb::new(0x10, 0x20, 0x30);
        record.dpi_levels[1].enabled = false;
        record.dpi_levels[5].enabled = false;

        session.write_settings(&record).unwrap();
        let stored = backend.stored_config();
        assert_eq!(stored[offsets::LED_PALETTE_FLAG], 0x4F);
        assert_eq!(stored[offsets::LED_SPEED], 0x00);

        let read = session.read_settings().unwrap();
        assert_eq!(read, record);
        assert_eq!(backend.enumerations(), 1);
        assert_eq!(backend.live_handles(), 0);
    }

    /// Test: DPI values are snapped on write, and come back as the ladder.
    #[test]
    fn dpi_values_are_not_recovered_on_read() {
        let backend = create_mock_edge();
        let mut session = ConfigSession::new(backend.clone());

        let mut record = SettingsRecord::factory();
        record.dpi_levels[0].dpi = 1000;
        record.dpi_levels[6].dpi = 20_000;
        session.write_settings(&record).unwrap();

        let stored = backend.stored_config();
        let at = |i: usize| offsets::DPI_VALUES_START + i * 3;
        assert_eq!(stored[at(0)], 0x12);
        assert_eq!(stored[at(6)], 0x94);

        let read = session.read_settings().unwrap();
        let values: Vec<u32> = read.dpi_levels.iter().map(|l| l.dpi).collect();
        assert_eq!(values, CANONICAL_DPI_LADDER.to_vec());
    }

    /// Test: reserved bytes read from the device survive the next write.
    #[test]
    fn reserved_bytes_survive_read_modify_write() {
        let backend = create_mock_edge();
        let mut device_payload = FACTORY_PAYLOAD;
        device_payload[4] = 0x03;
        device_payload[33] = 0x1C;
        device_payload[39] = 0x00;
        backend.set_stored_config(device_payload);

        let mut session = ConfigSession::new(backend.clone());
        let mut record = session.read_settings().unwrap();
        record.led_mode_id = LedMode::Breathe.id();
        session.write_settings(&record).unwrap();

        let stored = backend.stored_config();
        assert_eq!(stored[4], 0x03);
        assert_eq!(stored[33], 0x1C);
        assert_eq!(stored[39], 0x00);
        assert_eq!(stored[offsets::LED_MODE_ID], LedMode::Breathe.id());
        assert_eq!(stored[offsets::LED_PALETTE_FLAG], 0x01);
    }

    /// Test: restore after changes puts the factory payload back.
    #[test]
    fn restore_after_changes() {
        let backend = create_mock_edge();
        let mut session = ConfigSession::new(backend.clone());

        let mut record = SettingsRecord::factory();
        record.led_mode_id = LedMode::Off.id();
        session.write_settings(&record).unwrap();
        assert_ne!(backend.stored_config(), FACTORY_PAYLOAD);

        let restored = session.restore_factory_defaults().unwrap();
        assert_eq!(restored, SettingsRecord::factory());
        assert_eq!(backend.stored_config(), FACTORY_PAYLOAD);
        assert_eq!(session.read_settings().unwrap(), SettingsRecord::factory());
    }

    /// Test: the factory record written through a session matches the literal.
    #[test]
    fn factory_record_write_matches_restore() {
        let backend = create_mock_edge();
        let mut session = ConfigSession::new(backend.clone());
        session.write_settings(&SettingsRecord::factory()).unwrap();
        assert_eq!(backend.stored_config(), FACTORY_PAYLOAD);
        assert_eq!(codec::encode(&SettingsRecord::factory()).unwrap(), FACTORY_PAYLOAD);
    }

    /// Test: a failed operation can simply be re-invoked.
    #[test]
    fn operations_are_reinvocable_after_failure() {
        let backend = create_mock_edge();
        backend.set_behavior(2, MockBehavior::Unopenable);
        let mut session = ConfigSession::new(backend.clone());

        assert!(matches!(
            session.read_settings(),
            Err(Error::InterfaceNotFound)
        ));

        backend.set_behavior(2, MockBehavior::Mouse);
        assert_eq!(session.read_settings().unwrap(), SettingsRecord::factory());
        assert_eq!(backend.enumerations(), 2);
    }

    /// Test: status stream for a mixed session.
    #[test]
    fn status_stream_for_mixed_session() {
        let backend = create_mock_edge();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |s: &Status| seen.lock().unwrap().push(s.clone())
        };
        let mut session = ConfigSession::new(backend.clone()).with_status_sink(sink);

        session.read_settings().unwrap();
        backend.unplug();
        assert!(session.write_settings(&SettingsRecord::factory()).is_err());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[..3], [Status::Ready, Status::Reading, Status::ReadDone]);
        assert_eq!(seen[3], Status::Writing);
        assert!(seen[4].is_failure());
        assert_eq!(seen.len(), 5);
    }

    /// Test: repeated operations never leave a handle open.
    #[test]
    fn sequential_handles_never_overlap() {
        let backend = create_mock_edge();
        let mut session = ConfigSession::new(backend.clone());
        for _ in 0..3 {
            session.write_settings(&SettingsRecord::factory()).unwrap();
            assert_eq!(backend.live_handles(), 0);
            session.read_settings().unwrap();
            assert_eq!(backend.live_handles(), 0);
        }
    }
}
