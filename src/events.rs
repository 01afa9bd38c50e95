//! Change notification between repositories and their subscribers.
//!
//! The bus is constructed by the application context and injected into each
//! repository; there is no global singleton. Signals carry no payload, so
//! subscribers re-query after every notification. `subscribe` hands back a
//! [`Subscription`] and `unsubscribe` removes exactly that registration,
//! regardless of how many other subscribers share the topic.

use std::sync::{Arc, Mutex};

/// The three record kinds a subscriber can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Transactions,
    Budgets,
    RecurringTransactions,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    id: u64,
    topic: Topic,
    callback: Callback,
}

/// Handle identifying one registration on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    topic: Topic,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        topic: Topic,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let mut registry = self.registry.lock().expect("subscriber registry poisoned");
        registry.next_id += 1;
        let id = registry.next_id;
        registry.registrations.push(Registration {
            id,
            topic,
            callback: Arc::new(callback),
        });
        Subscription { id, topic }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut registry = self.registry.lock().expect("subscriber registry poisoned");
        registry
            .registrations
            .retain(|registration| registration.id != subscription.id);
    }

    pub fn publish(&self, topic: Topic) {
        // Callbacks run outside the lock so a subscriber may re-subscribe or
        // unsubscribe while being notified.
        let callbacks: Vec<Callback> = {
            let registry = self.registry.lock().expect("subscriber registry poisoned");
            registry
                .registrations
                .iter()
                .filter(|registration| registration.topic == topic)
                .map(|registration| Arc::clone(&registration.callback))
                .collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let registry = self.registry.lock().expect("subscriber registry poisoned");
        registry
            .registrations
            .iter()
            .filter(|registration| registration.topic == topic)
            .count()
    }
}
