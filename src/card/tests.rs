use super::*;
use crate::config::CardConfig;
use crate::point::{TagValue, CARD_UID_TAG};
use crate::store::TagStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Scripted reader: replays state changes, then times out forever
struct MockReader {
    changes: VecDeque<Result<Option<ReaderState>, CardError>>,
    responses: VecDeque<Result<Vec<u8>, CardError>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockReader {
    fn new(
        changes: Vec<Result<Option<ReaderState>, CardError>>,
        responses: Vec<Result<Vec<u8>, CardError>>,
    ) -> Self {
        Self {
            changes: changes.into(),
            responses: responses.into(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl CardReader for MockReader {
    fn wait_for_change(&mut self, timeout: Duration) -> Result<Option<ReaderState>, CardError> {
        match self.changes.pop_front() {
            Some(change) => change,
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn transmit(&mut self, apdu: &[u8]) -> Result<Vec<u8>, CardError> {
        self.sent.lock().unwrap().push(apdu.to_vec());
        self.responses
            .pop_front()
            .unwrap_or(Err(CardError::Reader("no card".to_string())))
    }
}

const PRESENT: ReaderState = ReaderState {
    empty: false,
    present: true,
};

const EMPTY: ReaderState = ReaderState {
    empty: true,
    present: false,
};

fn fast_config() -> CardConfig {
    CardConfig {
        enabled: true,
        event_timeout_ms: 5,
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn test_decode_uid() {
    assert_eq!(decode_uid(&[0x04, 0xa2, 0x3b, 0x1c, 0x90, 0x00]).unwrap(), "4a23b1c");
    assert_eq!(decode_uid(&[0x00, 0x01, 0x90, 0x00]).unwrap(), "1");
}

#[test]
fn test_decode_uid_keeps_last_eight_bytes() {
    let response = [1, 2, 3, 4, 5, 6, 7, 8, 9, 0x90, 0x00];
    assert_eq!(decode_uid(&response).unwrap(), "203040506070809");
}

#[test]
fn test_decode_uid_errors() {
    assert_eq!(decode_uid(&[0x90]), Err(CardError::ShortResponse(1)));
    assert_eq!(decode_uid(&[0x01, 0x63, 0x00]), Err(CardError::Status(0x63, 0x00)));
    assert_eq!(decode_uid(&[0x90, 0x00]), Err(CardError::NoUid));
}

#[test]
fn test_card_error_display() {
    assert_eq!(
        CardError::Status(0x6a, 0x81).to_string(),
        "reader returned status 6a81"
    );
    assert_eq!(
        CardError::ShortResponse(0).to_string(),
        "reader response too short (0 bytes)"
    );
}

#[test]
fn test_monitor_publishes_card_uid() {
    let store = Arc::new(TagStore::new());
    let reader = MockReader::new(vec![Ok(Some(PRESENT))], vec![Ok(vec![0xde, 0xad, 0x90, 0x00])]);
    let sent = Arc::clone(&reader.sent);

    let mut monitor = CardMonitor::new(&fast_config());
    let mut events = monitor.events();
    monitor.start(reader, Arc::clone(&store)).unwrap();

    assert!(wait_until(|| store.get_point("Card.UID").is_valid()));
    assert_eq!(
        store.get_point(CARD_UID_TAG).value,
        TagValue::Text("dead".to_string())
    );
    assert_eq!(monitor.current_id(), Some("dead".to_string()));
    assert_eq!(sent.lock().unwrap()[0], GET_UID_APDU.to_vec());

    monitor.stop();
    assert!(!monitor.is_running());

    assert_eq!(events.try_recv().unwrap(), CardEvent::Inserted);
    assert_eq!(events.try_recv().unwrap(), CardEvent::Read("dead".to_string()));
}

#[test]
fn test_monitor_reports_removal() {
    let store = Arc::new(TagStore::new());
    let reader = MockReader::new(vec![Ok(Some(EMPTY))], vec![]);

    let mut monitor = CardMonitor::new(&fast_config());
    let mut events = monitor.events();
    monitor.start(reader, Arc::clone(&store)).unwrap();

    assert!(wait_until(|| !events.is_empty()));
    monitor.stop();

    assert_eq!(events.try_recv().unwrap(), CardEvent::Removed);
    assert!(store.is_empty());
}

#[test]
fn test_failed_read_publishes_nothing() {
    let store = Arc::new(TagStore::new());
    let reader = MockReader::new(
        vec![Ok(Some(PRESENT))],
        vec![Ok(vec![0x01, 0x63, 0x00])],
    );

    let mut monitor = CardMonitor::new(&fast_config());
    let mut events = monitor.events();
    monitor.start(reader, Arc::clone(&store)).unwrap();

    assert!(wait_until(|| !events.is_empty()));
    // Give the worker time to attempt the read
    std::thread::sleep(Duration::from_millis(20));
    monitor.stop();

    assert_eq!(events.try_recv().unwrap(), CardEvent::Inserted);
    assert!(events.try_recv().is_err());
    assert!(store.is_empty());
    assert_eq!(monitor.current_id(), None);
}

#[test]
fn test_monitor_survives_reader_errors() {
    let store = Arc::new(TagStore::new());
    let reader = MockReader::new(
        vec![
            Err(CardError::Reader("transient".to_string())),
            Ok(Some(PRESENT)),
        ],
        vec![Ok(vec![0x42, 0x90, 0x00])],
    );

    let mut monitor = CardMonitor::new(&fast_config());
    monitor.start(reader, Arc::clone(&store)).unwrap();

    assert!(wait_until(|| store.get_point(CARD_UID_TAG).is_valid()));
    assert_eq!(monitor.current_id(), Some("42".to_string()));
}

#[test]
fn test_disabled_monitor_does_not_start() {
    let config = CardConfig {
        enabled: false,
        event_timeout_ms: 5,
    };
    let mut monitor = CardMonitor::new(&config);
    assert!(!monitor.is_enabled());

    monitor
        .start(MockReader::new(vec![], vec![]), Arc::new(TagStore::new()))
        .unwrap();

    assert!(!monitor.is_running());
}

#[test]
fn test_monitor_follows_card_config() {
    let monitor = CardMonitor::new(&CardConfig::default());

    assert!(monitor.is_enabled());
    assert!(!monitor.is_running());
    assert_eq!(monitor.current_id(), None);
}

#[test]
fn test_restart_replaces_worker() {
    let store = Arc::new(TagStore::new());
    let mut monitor = CardMonitor::new(&fast_config());

    monitor
        .start(MockReader::new(vec![], vec![]), Arc::clone(&store))
        .unwrap();
    assert!(monitor.is_running());

    let reader = MockReader::new(vec![Ok(Some(PRESENT))], vec![Ok(vec![0x07, 0x90, 0x00])]);
    monitor.start(reader, Arc::clone(&store)).unwrap();

    assert!(wait_until(|| monitor.current_id().is_some()));
    assert_eq!(monitor.current_id(), Some("7".to_string()));
}
