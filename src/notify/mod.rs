//! Fan-out of store deltas to subscribers.
//!
//! Two kinds of subscribers are supported:
//!
//! - callback subscribers, held weakly by the bus; the returned
//!   [`Subscription`] owns the callback and unsubscribes when dropped
//! - channel subscribers, fed through `std::sync::mpsc` and pruned once their
//!   receiver is dropped
//!
//! Events are delivered after the mutation that produced them has committed
//! and every store lock has been released. Callbacks run synchronously on the
//! mutating thread; consumers that must not slow the mutator should use a
//! channel subscription and drain it elsewhere.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::domain::{Account, Category, Contact, Currency, Icon, Transaction};

/// A single add/update/remove delta for one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<E> {
    Added(E),
    Updated { old: E, new: E },
    Removed(E),
}

impl<E> ChangeEvent<E> {
    /// Value before the change, absent for additions.
    pub fn old_value(&self) -> Option<&E> {
        match self {
            ChangeEvent::Added(_) => None,
            ChangeEvent::Updated { old, .. } => Some(old),
            ChangeEvent::Removed(old) => Some(old),
        }
    }

    /// Value after the change, absent for removals.
    pub fn new_value(&self) -> Option<&E> {
        match self {
            ChangeEvent::Added(new) => Some(new),
            ChangeEvent::Updated { new, .. } => Some(new),
            ChangeEvent::Removed(_) => None,
        }
    }
}

/// Store-wide transitions that are not tied to a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A bulk preload replaced every table.
    PreloadFinished,
    /// The store was emptied because its backend was reinitialized.
    Cleared,
}

type Callback<T> = dyn Fn(&T) + Send + Sync;

struct TopicState<T> {
    callbacks: Vec<Weak<Callback<T>>>,
    channels: Vec<Sender<T>>,
}

/// Subscriber list for one event type.
pub struct Topic<T> {
    state: Mutex<TopicState<T>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(TopicState {
                callbacks: Vec::new(),
                channels: Vec::new(),
            }),
        }
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Topic")
            .field("callbacks", &state.callbacks.len())
            .field("channels", &state.channels.len())
            .finish()
    }
}

impl<T> Topic<T> {
    fn lock(&self) -> MutexGuard<'_, TopicState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Topic<T> {
    /// Registers `callback`; it stays registered for as long as the returned guard lives.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Arc<Callback<T>> = Arc::new(callback);
        self.lock().callbacks.push(Arc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Returns a receiver that yields every subsequent event.
    pub fn subscribe_channel(&self) -> Receiver<T> {
        let (sender, receiver) = mpsc::channel();
        self.lock().channels.push(sender);
        receiver
    }

    /// Delivers `event` to every live subscriber and prunes dead ones.
    ///
    /// Callbacks run on the publishing thread. A panicking callback is
    /// logged and skipped; the remaining subscribers still receive the event.
    pub fn publish(&self, event: &T) {
        let live: Vec<Arc<Callback<T>>> = {
            let mut state = self.lock();
            state.callbacks.retain(|weak| weak.strong_count() > 0);
            state.channels.retain(|sender| sender.send(event.clone()).is_ok());
            state.callbacks.iter().filter_map(Weak::upgrade).collect()
        };
        // Invoked without the lock so callbacks may subscribe or query the store.
        for callback in live {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                tracing::warn!("change subscriber panicked");
            }
        }
    }

    /// Number of subscribers still alive. Dead callbacks are pruned first.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.callbacks.retain(|weak| weak.strong_count() > 0);
        state.callbacks.len() + state.channels.len()
    }
}

/// Keeps a callback subscription alive. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any + Send + Sync>,
}

impl Subscription {
    /// Explicitly ends the subscription.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// One topic per entity kind plus the store lifecycle topic.
#[derive(Debug, Default)]
pub struct ChangeBus {
    pub(crate) icons: Topic<ChangeEvent<Icon>>,
    pub(crate) categories: Topic<ChangeEvent<Category>>,
    pub(crate) currencies: Topic<ChangeEvent<Currency>>,
    pub(crate) accounts: Topic<ChangeEvent<Account>>,
    pub(crate) contacts: Topic<ChangeEvent<Contact>>,
    pub(crate) transactions: Topic<ChangeEvent<Transaction>>,
    pub(crate) lifecycle: Topic<StoreEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dropped_subscription_stops_delivery() {
        let topic: Topic<u32> = Topic::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let subscription = topic.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        topic.publish(&1);
        drop(subscription);
        topic.publish(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(topic.subscriber_count(), 0);
    }

    #[test]
    fn channel_subscriber_is_pruned_after_receiver_drop() {
        let topic: Topic<u32> = Topic::default();
        let receiver = topic.subscribe_channel();
        topic.publish(&7);
        assert_eq!(receiver.try_recv(), Ok(7));

        drop(receiver);
        topic.publish(&8);
        assert_eq!(topic.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_may_subscribe_while_being_notified() {
        let topic: Arc<Topic<u32>> = Arc::new(Topic::default());
        let inner = Arc::clone(&topic);
        let nested = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&nested);
        let _subscription = topic.subscribe(move |_| {
            sink.lock().unwrap().push(inner.subscribe(|_| {}));
        });

        topic.publish(&1);
        assert_eq!(nested.lock().unwrap().len(), 1);
    }

    #[test]
    fn panicking_callback_does_not_starve_other_subscribers() {
        let topic: Topic<u32> = Topic::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _faulty = topic.subscribe(|_| panic!("subscriber bug"));
        let _healthy = topic.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        topic.publish(&1);
        topic.publish(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(format!("{:?}", topic), "Topic { callbacks: 2, channels: 0 }");
    }

    #[test]
    fn change_event_exposes_old_and_new_values() {
        let added = ChangeEvent::Added(1);
        let updated = ChangeEvent::Updated { old: 1, new: 2 };
        let removed = ChangeEvent::Removed(2);

        assert_eq!(added.old_value(), None);
        assert_eq!(updated.old_value(), Some(&1));
        assert_eq!(updated.new_value(), Some(&2));
        assert_eq!(removed.new_value(), None);
    }
}
