use crate::card::{read_uid, CardEvent, CardReader};
use crate::config::CardConfig;
use crate::point::{DataPoint, CARD_UID_TAG};
use crate::store::TagStore;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Polls a card reader on a dedicated thread and publishes card UIDs.
///
/// Every UID read is published to the store under [`CARD_UID_TAG`]; insert,
/// remove and read events are also broadcast to [`CardMonitor::events`]
/// receivers.
pub struct CardMonitor {
    timeout: Duration,
    enabled: bool,
    active: Arc<AtomicBool>,
    current_id: Arc<RwLock<Option<String>>>,
    events_tx: broadcast::Sender<CardEvent>,
    worker: Option<JoinHandle<()>>,
}

impl CardMonitor {
    pub fn new(config: &CardConfig) -> Self {
        let (events_tx, _) = broadcast::channel(64);

        Self {
            timeout: Duration::from_millis(config.event_timeout_ms),
            enabled: config.enabled,
            active: Arc::new(AtomicBool::new(false)),
            current_id: Arc::new(RwLock::new(None)),
            events_tx,
            worker: None,
        }
    }

    /// Subscribe to card events
    pub fn events(&self) -> broadcast::Receiver<CardEvent> {
        self.events_tx.subscribe()
    }

    /// Most recently read UID
    pub fn current_id(&self) -> Option<String> {
        self.current_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `start` will spawn a worker
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| !w.is_finished())
    }

    /// Start polling `reader`, replacing any running worker.
    ///
    /// Does nothing when card monitoring is disabled in the configuration.
    pub fn start<R: CardReader>(&mut self, reader: R, store: Arc<TagStore>) -> Result<()> {
        if !self.enabled {
            info!("Card monitoring disabled");
            return Ok(());
        }

        self.stop();

        let active = Arc::new(AtomicBool::new(true));
        self.active = Arc::clone(&active);

        let worker = Worker {
            reader,
            store,
            timeout: self.timeout,
            active,
            current_id: Arc::clone(&self.current_id),
            events_tx: self.events_tx.clone(),
        };

        let handle = thread::Builder::new()
            .name("card-monitor".to_string())
            .spawn(move || worker.run())
            .context("Failed to spawn card monitor thread")?;

        self.worker = Some(handle);
        info!(timeout_ms = self.timeout.as_millis() as u64, "Card monitor started");
        Ok(())
    }

    /// Signal the worker and wait for it to exit (at most one poll timeout)
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Card monitor thread panicked");
            }
            info!("Card monitor stopped");
        }
    }
}

impl Drop for CardMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker<R> {
    reader: R,
    store: Arc<TagStore>,
    timeout: Duration,
    active: Arc<AtomicBool>,
    current_id: Arc<RwLock<Option<String>>>,
    events_tx: broadcast::Sender<CardEvent>,
}

impl<R: CardReader> Worker<R> {
    fn run(mut self) {
        while self.active.load(Ordering::SeqCst) {
            match self.reader.wait_for_change(self.timeout) {
                Ok(None) => continue,
                Ok(Some(state)) => {
                    if state.empty {
                        debug!("Card removed");
                        self.emit(CardEvent::Removed);
                    }
                    if state.present {
                        debug!("Card inserted");
                        self.emit(CardEvent::Inserted);
                        self.read_card();
                    }
                }
                Err(e) => {
                    error!(error = %e, "Unexpected reader status");
                    // Back off so a failing reader does not spin
                    thread::sleep(self.timeout);
                }
            }
        }
    }

    fn read_card(&mut self) {
        match read_uid(&mut self.reader) {
            Ok(uid) => {
                info!(uid = %uid, "Card read");
                *self
                    .current_id
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(uid.clone());
                self.store.publish(DataPoint::new(CARD_UID_TAG, uid.as_str()));
                self.emit(CardEvent::Read(uid));
            }
            Err(e) => warn!(error = %e, "Failed to read ID from card"),
        }
    }

    fn emit(&self, event: CardEvent) {
        // Err only means nobody is listening
        let _ = self.events_tx.send(event);
    }
}
