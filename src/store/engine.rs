use crate::config::StoreConfig;
use crate::point::{normalize_tag, DataPoint};
use crate::store::subscriber::{Registration, SubscriberId, TagSubscriber};
use dashmap::DashMap;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};
use tokio::sync::broadcast;
use tracing::{debug, error};

static GLOBAL: OnceLock<Arc<TagStore>> = OnceLock::new();

/// Latest value per tag plus tag-scoped subscriber fan-out.
///
/// Tags are case-folded on every entry point, so "Game.Name" and
/// "game.name" address the same slot.
pub struct TagStore {
    /// Latest point per normalized tag
    points: DashMap<String, DataPoint>,

    /// Subscribers per normalized tag
    subscribers: RwLock<HashMap<String, Vec<Registration>>>,

    /// Unfiltered "new point" notification
    point_tx: broadcast::Sender<DataPoint>,

    published: AtomicU64,
}

impl TagStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        let (point_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            points: DashMap::new(),
            subscribers: RwLock::new(HashMap::new()),
            point_tx,
            published: AtomicU64::new(0),
        }
    }

    /// Process-wide instance, created on first call
    pub fn global() -> Arc<TagStore> {
        GLOBAL.get_or_init(|| Arc::new(TagStore::new())).clone()
    }

    /// Record `point` as the latest value for its tag and fan it out.
    ///
    /// Subscribers run on the caller's thread before this returns. The
    /// registry lock is released first, so a subscriber may publish,
    /// subscribe or unsubscribe; registration changes apply from the next
    /// publish. Valueless points are stored and delivered like any other.
    pub fn publish(&self, point: DataPoint) {
        let key = normalize_tag(&point.tag);

        self.points.insert(key.clone(), point.clone());
        self.published.fetch_add(1, Ordering::Relaxed);

        // Err only means nobody is watching
        let _ = self.point_tx.send(point.clone());

        let (targets, stale) = self.targets(&key);

        for subscriber in targets {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| subscriber.handle_data(&point)));
            if delivered.is_err() {
                error!(tag = %point.tag, "Subscriber panicked while handling data point");
            }
        }

        if stale {
            self.prune(&key);
        }
    }

    /// Register `subscriber` for `tag`. Registering the same pair twice is a no-op.
    pub fn subscribe<S>(&self, tag: &str, subscriber: &Arc<S>)
    where
        S: TagSubscriber + 'static,
    {
        let weak: Weak<S> = Arc::downgrade(subscriber);
        self.register(normalize_tag(tag), SubscriberId::of(subscriber), weak);
    }

    /// Register an already type-erased subscriber
    pub fn subscribe_dyn(&self, tag: &str, subscriber: &Arc<dyn TagSubscriber>) {
        self.register(
            normalize_tag(tag),
            SubscriberId::of(subscriber),
            Arc::downgrade(subscriber),
        );
    }

    /// Remove the (tag, subscriber) association if present
    pub fn unsubscribe<S: ?Sized>(&self, tag: &str, subscriber: &Arc<S>) {
        self.unsubscribe_id(tag, SubscriberId::of(subscriber));
    }

    pub fn unsubscribe_id(&self, tag: &str, id: SubscriberId) {
        let key = normalize_tag(tag);
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(registrations) = subscribers.get_mut(&key) {
            registrations.retain(|r| r.id != id);
            if registrations.is_empty() {
                subscribers.remove(&key);
            }
        }
    }

    /// Remove every association of `subscriber`, across all tags
    pub fn unsubscribe_all<S: ?Sized>(&self, subscriber: &Arc<S>) {
        self.unsubscribe_all_id(SubscriberId::of(subscriber));
    }

    pub fn unsubscribe_all_id(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|_, registrations| {
            registrations.retain(|r| r.id != id);
            !registrations.is_empty()
        });
    }

    /// Latest point for `tag`, or [`DataPoint::empty`] if it was never published
    pub fn get_point(&self, tag: &str) -> DataPoint {
        self.points
            .get(&normalize_tag(tag))
            .map(|p| p.clone())
            .unwrap_or_else(DataPoint::empty)
    }

    /// All latest points, ordered by normalized tag
    pub fn snapshot(&self) -> Vec<DataPoint> {
        let mut points: Vec<(String, DataPoint)> = self
            .points
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));
        points.into_iter().map(|(_, p)| p).collect()
    }

    /// Receive every published point, regardless of tag
    pub fn watch(&self) -> broadcast::Receiver<DataPoint> {
        self.point_tx.subscribe()
    }

    /// Number of distinct tags ever published
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total publish calls since creation
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Live subscribers registered for `tag`
    pub fn subscriber_count(&self, tag: &str) -> usize {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers
            .get(&normalize_tag(tag))
            .map(|regs| regs.iter().filter(|r| r.is_live()).count())
            .unwrap_or(0)
    }

    fn register(&self, key: String, id: SubscriberId, subscriber: Weak<dyn TagSubscriber>) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let registrations = subscribers.entry(key).or_default();

        // A dead registration may share the address of a new allocation
        registrations.retain(|r| r.is_live());
        if registrations.iter().any(|r| r.id == id) {
            return;
        }
        registrations.push(Registration { id, subscriber });
    }

    /// Upgrade the registrations for `key`; also reports whether any were dead
    fn targets(&self, key: &str) -> (Vec<Arc<dyn TagSubscriber>>, bool) {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(registrations) = subscribers.get(key) else {
            return (Vec::new(), false);
        };

        let targets: Vec<Arc<dyn TagSubscriber>> = registrations
            .iter()
            .filter_map(|r| r.subscriber.upgrade())
            .collect();
        let stale = targets.len() != registrations.len();
        (targets, stale)
    }

    fn prune(&self, key: &str) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(registrations) = subscribers.get_mut(key) {
            registrations.retain(|r| r.is_live());
            if registrations.is_empty() {
                subscribers.remove(key);
            }
        }
        debug!(tag = %key, "Pruned dropped subscribers");
    }
}

impl Default for TagStore {
    fn default() -> Self {
        Self::new()
    }
}
