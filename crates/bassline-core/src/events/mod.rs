//! Event bus for listeners outside the interpreter
//!
//! Words subscribe to events through their `hook` attribute; everything else
//! (the REPL's toast printer, embedding applications) subscribes here and
//! receives events over an unbounded channel.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// An emitted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub payload: serde_json::Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Event {
    pub fn new(name: &str, payload: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPattern {
    /// Match events by exact name
    Exact(String),
    /// Match events whose name starts with the prefix
    Prefix(String),
    /// Match all events
    All,
}

impl EventPattern {
    /// Parse `name`, `prefix*` or `*`
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            EventPattern::All
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            EventPattern::Prefix(prefix.to_string())
        } else {
            EventPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, event_name: &str) -> bool {
        match self {
            EventPattern::Exact(name) => event_name == name,
            EventPattern::Prefix(prefix) => event_name.starts_with(prefix.as_str()),
            EventPattern::All => true,
        }
    }
}

/// Event subscription handle
pub struct Subscription {
    pub id: u64,
    pub pattern: EventPattern,
    pub receiver: UnboundedReceiver<Arc<Event>>,
}

/// Pub/sub registry
#[derive(Default)]
pub struct EventBus {
    subscriptions: DashMap<u64, (EventPattern, UnboundedSender<Arc<Event>>)>,
    next_subscription_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every matching subscriber; returns how many got it
    pub fn publish(&self, event: Event) -> usize {
        let event = Arc::new(event);
        let mut delivered = 0;
        let mut dead_subs = Vec::new();

        for entry in self.subscriptions.iter() {
            let (pattern, sender) = entry.value();
            if !pattern.matches(&event.name) {
                continue;
            }
            if sender.send(event.clone()).is_err() {
                dead_subs.push(*entry.key());
            } else {
                delivered += 1;
            }
        }

        for id in dead_subs {
            debug!(subscription = id, "Dropping disconnected subscriber");
            self.subscriptions.remove(&id);
        }

        delivered
    }

    pub fn subscribe(&self, pattern: EventPattern) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.subscriptions.insert(id, (pattern.clone(), sender));

        Subscription {
            id,
            pattern,
            receiver,
        }
    }

    pub fn unsubscribe(&self, subscription_id: u64) -> bool {
        self.subscriptions.remove(&subscription_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_pattern_matching() {
        assert!(EventPattern::parse("toast:show").matches("toast:show"));
        assert!(EventPattern::parse("*").matches("chron:poll"));
        assert!(EventPattern::parse("chron:*").matches("chron:poll"));
        assert!(!EventPattern::parse("chron:*").matches("toast:show"));
        assert!(!EventPattern::parse("toast").matches("toast:show"));
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_only() {
        let bus = EventBus::new();
        let mut toasts = bus.subscribe(EventPattern::parse("toast:*"));
        let mut all = bus.subscribe(EventPattern::All);

        let delivered = bus.publish(Event::new("toast:show", serde_json::json!({"type": "info"})));
        assert_eq!(delivered, 2);
        bus.publish(Event::new("chron:poll", serde_json::Value::Null));

        assert_eq!(toasts.receiver.try_recv().unwrap().name, "toast:show");
        assert!(toasts.receiver.try_recv().is_err());
        assert_eq!(all.receiver.try_recv().unwrap().name, "toast:show");
        assert_eq!(all.receiver.try_recv().unwrap().name, "chron:poll");
    }

    #[test]
    fn test_dead_subscribers_are_pruned() {
        let bus = EventBus::new();
        let sub = bus.subscribe(EventPattern::All);
        drop(sub);
        assert_eq!(bus.publish(Event::new("x", serde_json::Value::Null)), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let sub = bus.subscribe(EventPattern::All);
        assert!(bus.unsubscribe(sub.id));
        assert!(!bus.unsubscribe(sub.id));
    }
}
