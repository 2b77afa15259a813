// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pattern-keyed callback table and synchronous dispatch.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`NotificationRouter`] - Subscription table shared by all poll loops

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::SubscriptionError;
use crate::event::Notification;

use super::EventPattern;

/// Unique identifier for a subscription.
///
/// Returned when binding a callback and used to unbind it later. Ids are
/// UUID v4 values, unique across routers and processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generates a fresh subscription id.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for notification callbacks.
type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Callbacks registered under one pattern.
struct PatternEntry {
    pattern: EventPattern,
    callbacks: HashMap<SubscriptionId, Callback>,
}

/// Routes notifications to the callbacks whose pattern matches.
///
/// One router is created by the application (or by
/// [`Client`](crate::Client)) and shared through an `Arc` with every poll
/// loop. The table is guarded by a `parking_lot::RwLock`, so concurrent
/// publishing from several loops and concurrent subscribe/unsubscribe calls
/// are safe.
///
/// Callbacks run synchronously on the publishing task, after the lock has
/// been released; a callback may therefore subscribe or unsubscribe. A
/// panicking callback is caught and logged, and the remaining callbacks
/// still run.
///
/// # Examples
///
/// ```
/// use sensibo_lib::event::{EventName, EventSource, Notification};
/// use sensibo_lib::subscription::NotificationRouter;
/// use sensibo_lib::types::PodId;
///
/// let router = NotificationRouter::new();
/// let id = router
///     .subscribe("Bedroom.*", |n| println!("{} = {}", n.name(), n.value()))
///     .unwrap();
///
/// let delivered = router.publish(&Notification::new(
///     EventName::new("Bedroom.power"),
///     true,
///     EventSource::Pod { id: PodId::new("abc"), name: "Bedroom".into() },
/// ));
/// assert_eq!(delivered, 1);
///
/// router.unsubscribe(id).unwrap();
/// assert!(router.is_empty());
/// ```
#[derive(Default)]
pub struct NotificationRouter {
    /// Entries keyed by the pattern string as given.
    entries: RwLock<HashMap<String, PatternEntry>>,
}

impl NotificationRouter {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback under a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::InvalidPattern`] if the pattern is
    /// malformed.
    pub fn subscribe<F>(&self, pattern: &str, callback: F) -> Result<SubscriptionId, SubscriptionError>
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let pattern = EventPattern::parse(pattern)?;
        let id = SubscriptionId::new();

        tracing::debug!(pattern = %pattern, id = %id, "Registering subscription");

        self.entries
            .write()
            .entry(pattern.as_str().to_string())
            .or_insert_with(|| PatternEntry {
                pattern,
                callbacks: HashMap::new(),
            })
            .callbacks
            .insert(id, Arc::new(callback));
        Ok(id)
    }

    /// Removes a callback wherever it is registered.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::UnknownSubscription`] if no callback is
    /// registered with this id; the table is left unchanged.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SubscriptionError> {
        let mut entries = self.entries.write();

        let owner = entries
            .iter_mut()
            .find_map(|(key, entry)| entry.callbacks.remove(&id).map(|_| key.clone()));

        match owner {
            Some(key) => {
                if entries.get(&key).is_some_and(|entry| entry.callbacks.is_empty()) {
                    entries.remove(&key);
                }
                tracing::debug!(pattern = %key, id = %id, "Removed subscription");
                Ok(())
            }
            None => Err(SubscriptionError::UnknownSubscription(id)),
        }
    }

    /// Delivers a notification to every callback whose pattern matches.
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, notification: &Notification) -> usize {
        let event_name = notification.name().as_str();

        let matched: Vec<Callback> = {
            let entries = self.entries.read();
            entries
                .values()
                .filter(|entry| entry.pattern.matches(event_name))
                .flat_map(|entry| entry.callbacks.values().cloned())
                .collect()
        };

        tracing::trace!(event = %event_name, callbacks = matched.len(), "Publishing notification");

        for callback in &matched {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(notification))) {
                tracing::error!(
                    event = %event_name,
                    panic = %panic_message(payload.as_ref()),
                    "Notification callback panicked"
                );
            }
        }

        matched.len()
    }

    /// Drops all subscriptions.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .map(|entry| entry.callbacks.len())
            .sum()
    }

    /// Returns the number of distinct patterns with at least one callback.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRouter")
            .field("pattern_count", &self.pattern_count())
            .field("subscription_count", &self.subscription_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventName, EventSource};
    use crate::types::PodId;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    fn notification(name: &str) -> Notification {
        Notification::new(
            EventName::new(name),
            true,
            EventSource::Pod {
                id: PodId::new("pod"),
                name: "device1".to_string(),
            },
        )
    }

    fn counter_callback(counter: &Arc<AtomicU32>) -> impl Fn(&Notification) + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new();
        assert!(id.to_string().starts_with("Sub("));
    }

    #[test]
    fn subscription_ids_are_unique() {
        let router = NotificationRouter::new();
        let id1 = router.subscribe("a.b", |_| {}).unwrap();
        let id2 = router.subscribe("a.b", |_| {}).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(router.subscription_count(), 2);
        assert_eq!(router.pattern_count(), 1);
    }

    #[test]
    fn new_router_is_empty() {
        let router = NotificationRouter::new();
        assert!(router.is_empty());
        assert_eq!(router.publish(&notification("device1.power")), 0);
    }

    #[test]
    fn wildcard_receives_only_its_device() {
        let router = NotificationRouter::new();
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        router
            .subscribe("device1.*", move |n| sink.lock().push(n.name().to_string()))
            .unwrap();

        router.publish(&notification("device1.power"));
        router.publish(&notification("device1.cool.temp"));
        router.publish(&notification("device2.power"));

        assert_eq!(*received.lock(), ["device1.power", "device1.cool.temp"]);
    }

    #[test]
    fn exact_pattern_is_case_insensitive() {
        let router = NotificationRouter::new();
        let counter = Arc::new(AtomicU32::new(0));
        router
            .subscribe("DEVICE1.Power", counter_callback(&counter))
            .unwrap();

        router.publish(&notification("device1.power"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_matching_callback_fires_once() {
        let router = NotificationRouter::new();
        let counter = Arc::new(AtomicU32::new(0));
        router.subscribe("device1.*", counter_callback(&counter)).unwrap();
        router.subscribe("*.power", counter_callback(&counter)).unwrap();
        router.subscribe("device1.power", counter_callback(&counter)).unwrap();
        router.subscribe("device1.mode", counter_callback(&counter)).unwrap();

        let delivered = router.publish(&notification("device1.power"));
        assert_eq!(delivered, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let router = NotificationRouter::new();
        let counter = Arc::new(AtomicU32::new(0));
        let id = router.subscribe("device1.*", counter_callback(&counter)).unwrap();

        router.publish(&notification("device1.power"));
        router.unsubscribe(id).unwrap();
        router.publish(&notification("device1.power"));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(router.is_empty());
    }

    #[test]
    fn unsubscribe_unknown_id_reports_error() {
        let router = NotificationRouter::new();
        router.subscribe("device1.*", |_| {}).unwrap();
        let unknown = SubscriptionId::new();

        assert_eq!(
            router.unsubscribe(unknown),
            Err(SubscriptionError::UnknownSubscription(unknown))
        );
        assert_eq!(router.subscription_count(), 1);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let router = NotificationRouter::new();
        let result = router.subscribe("device1..power", |_| {});
        assert!(matches!(result, Err(SubscriptionError::InvalidPattern { .. })));
        assert!(router.is_empty());
    }

    #[test]
    fn panicking_callback_does_not_stop_dispatch() {
        let router = NotificationRouter::new();
        let counter = Arc::new(AtomicU32::new(0));
        router
            .subscribe("device1.power", |_| panic!("callback failure"))
            .unwrap();
        router.subscribe("device1.*", counter_callback(&counter)).unwrap();

        let delivered = router.publish(&notification("device1.power"));
        assert_eq!(delivered, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_can_unsubscribe_itself() {
        let router = Arc::new(NotificationRouter::new());
        let slot = Arc::new(parking_lot::Mutex::new(None::<SubscriptionId>));
        let (router_ref, slot_ref) = (Arc::clone(&router), Arc::clone(&slot));
        let id = router
            .subscribe("device1.*", move |_| {
                if let Some(id) = slot_ref.lock().take() {
                    router_ref.unsubscribe(id).unwrap();
                }
            })
            .unwrap();
        *slot.lock() = Some(id);

        router.publish(&notification("device1.power"));
        assert!(router.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let router = NotificationRouter::new();
        router.subscribe("a.b", |_| {}).unwrap();
        router.subscribe("c.*", |_| {}).unwrap();
        router.clear();
        assert!(router.is_empty());
        assert_eq!(router.subscription_count(), 0);
    }

    #[test]
    fn concurrent_publishers_deliver_every_event_once() {
        const EVENTS_PER_DEVICE: usize = 2_000;

        let router = Arc::new(NotificationRouter::new());
        let device1 = Arc::new(AtomicUsize::new(0));
        let device2 = Arc::new(AtomicUsize::new(0));
        let all = Arc::new(AtomicUsize::new(0));

        for (pattern, counter) in [("device1.*", &device1), ("device2.*", &device2), ("*", &all)] {
            let counter = Arc::clone(counter);
            router
                .subscribe(pattern, move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        let publishers: Vec<_> = ["device1", "device2"]
            .into_iter()
            .map(|device| {
                let router = Arc::clone(&router);
                std::thread::spawn(move || {
                    for i in 0..EVENTS_PER_DEVICE {
                        let property = if i % 2 == 0 { "power" } else { "cool.temp" };
                        router.publish(&notification(&format!("{device}.{property}")));
                    }
                })
            })
            .collect();

        // Churn unrelated subscriptions while the publishers run.
        for _ in 0..200 {
            let id = router.subscribe("device3.*", |_| {}).unwrap();
            router.unsubscribe(id).unwrap();
        }

        for publisher in publishers {
            publisher.join().unwrap();
        }

        assert_eq!(device1.load(Ordering::SeqCst), EVENTS_PER_DEVICE);
        assert_eq!(device2.load(Ordering::SeqCst), EVENTS_PER_DEVICE);
        assert_eq!(all.load(Ordering::SeqCst), 2 * EVENTS_PER_DEVICE);
    }

    #[test]
    fn router_debug() {
        let router = NotificationRouter::new();
        router.subscribe("a.b", |_| {}).unwrap();
        let debug = format!("{router:?}");
        assert!(debug.contains("NotificationRouter"));
        assert!(debug.contains("subscription_count: 1"));
    }
}
