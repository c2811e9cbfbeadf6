use crate::point::DataPoint;
use std::sync::{Arc, Weak};

/// Receives every point published to a tag it is registered for.
///
/// Called synchronously on the publisher's thread; long-running work here
/// slows the producer down.
pub trait TagSubscriber: Send + Sync {
    fn handle_data(&self, point: &DataPoint);
}

impl<F> TagSubscriber for F
where
    F: Fn(&DataPoint) + Send + Sync,
{
    fn handle_data(&self, point: &DataPoint) {
        self(point)
    }
}

/// Identity of a subscriber handle (address of its shared allocation)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
    pub fn of<S: ?Sized>(subscriber: &Arc<S>) -> Self {
        Self(Arc::as_ptr(subscriber) as *const () as usize)
    }
}

/// Non-owning (tag, subscriber) association held by the store
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: SubscriberId,
    pub(crate) subscriber: Weak<dyn TagSubscriber>,
}

impl Registration {
    pub(crate) fn is_live(&self) -> bool {
        self.subscriber.strong_count() > 0
    }
}
