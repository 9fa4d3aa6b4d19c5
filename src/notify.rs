use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// What part of the store a mutation touched. List views use this to decide
/// whether they need to refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Words,
    Idioms,
    All,
}

type Callback = Arc<dyn Fn(StoreChange) + Send + Sync>;
type Registry = Mutex<HashMap<u64, Callback>>;

/// Change notifier for store mutations. Any number of subscribers may be
/// registered at once; each subscription is tied to the returned guard and
/// ends when the guard is dropped.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    callbacks: Arc<Registry>,
    next_id: Arc<Mutex<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns its subscription guard.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(StoreChange) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.callbacks
            .lock()
            .unwrap()
            .insert(id, Arc::new(callback));
        Subscription {
            id,
            callbacks: Arc::downgrade(&self.callbacks),
        }
    }

    /// Invokes every live callback. Callbacks run outside the registry lock
    /// so a callback may subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, change: StoreChange) {
        let callbacks: Vec<Callback> =
            self.callbacks.lock().unwrap().values().cloned().collect();
        for callback in callbacks {
            callback(change);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.callbacks.lock().unwrap().len())
            .finish()
    }
}

/// Keeps one callback registered. Dropping the guard removes the callback.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    callbacks: Weak<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(callbacks) = self.callbacks.upgrade() {
            callbacks.lock().unwrap().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_reaches_subscriber() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        let _sub = notifier.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.notify(StoreChange::Words);
        notifier.notify(StoreChange::Idioms);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_subscribers_all_called() {
        let notifier = ChangeNotifier::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        let a_clone = a.clone();
        let b_clone = b.clone();
        let _sub_a = notifier.subscribe(move |_| {
            a_clone.fetch_add(1, Ordering::SeqCst);
        });
        let _sub_b = notifier.subscribe(move |_| {
            b_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.notify(StoreChange::All);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        let sub = notifier.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        notifier.notify(StoreChange::Words);
        drop(sub);
        notifier.notify(StoreChange::Words);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_sees_change_kind() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _sub = notifier.subscribe(move |change| {
            seen_clone.lock().unwrap().push(change);
        });

        notifier.notify(StoreChange::Idioms);
        notifier.notify(StoreChange::All);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreChange::Idioms, StoreChange::All]
        );
    }

    #[test]
    fn test_notify_with_no_subscribers_is_noop() {
        let notifier = ChangeNotifier::new();
        notifier.notify(StoreChange::Words);
    }
}
