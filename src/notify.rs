//! Change notification between the provider and whoever observes its data.

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Seam through which the provider reports reads and writes.
pub trait ChangeNotifier: Send + Sync {
    /// Called after a successful query with the URI that was read.
    fn register(&self, uri: &Url);

    /// Called once the reader of `uri` no longer needs change events.
    fn unregister(&self, uri: &Url);

    /// Called after a successful write with the URI that was written to.
    fn notify_change(&self, uri: &Url);
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn register(&self, _uri: &Url) {}

    fn unregister(&self, _uri: &Url) {}

    fn notify_change(&self, _uri: &Url) {}
}

/// A write to `changed` that affects data previously read through `observed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub observed: Url,
    pub changed: Url,
}

#[derive(Default)]
struct Observers {
    registered: Vec<Url>,
    subscribers: Vec<UnboundedSender<ChangeEvent>>,
}

/// Keeps every URI that was queried and fans changes out to subscribers.
///
/// A change to `C` reaches each registered `R` under the same authority when
/// one path is a segment prefix of the other, so writing to `weather`
/// reaches readers of `weather/94043` and writing to `weather/94043/20140705`
/// reaches readers of `weather`.
#[derive(Default)]
pub struct ObserverRegistry {
    inner: Mutex<Observers>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Observers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A stream of every change event delivered from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<ChangeEvent> {
        let (sender, receiver) = unbounded();
        self.lock().subscribers.push(sender);
        receiver
    }

    pub fn registered(&self) -> Vec<Url> {
        self.lock().registered.clone()
    }
}

impl ChangeNotifier for ObserverRegistry {
    fn register(&self, uri: &Url) {
        let mut observers = self.lock();
        if !observers.registered.contains(uri) {
            observers.registered.push(uri.clone());
        }
    }

    fn unregister(&self, uri: &Url) {
        self.lock().registered.retain(|observed| observed != uri);
    }

    fn notify_change(&self, uri: &Url) {
        let mut observers = self.lock();
        let events: Vec<ChangeEvent> = observers
            .registered
            .iter()
            .filter(|observed| overlaps(observed, uri))
            .map(|observed| ChangeEvent {
                observed: observed.clone(),
                changed: uri.clone(),
            })
            .collect();
        log::debug!("change to {uri} reaches {} observer(s)", events.len());

        observers.subscribers.retain(|subscriber| {
            events
                .iter()
                .all(|event| subscriber.unbounded_send(event.clone()).is_ok())
        });
    }
}

fn overlaps(observed: &Url, changed: &Url) -> bool {
    if observed.scheme() != changed.scheme() || observed.host_str() != changed.host_str() {
        return false;
    }
    let segments = |uri: &Url| -> Vec<String> {
        uri.path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default()
    };
    let (observed, changed) = (segments(observed), segments(changed));
    let shared = observed.len().min(changed.len());
    observed[..shared] == changed[..shared]
}
