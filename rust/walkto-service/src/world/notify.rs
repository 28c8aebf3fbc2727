use std::sync::{Arc, Mutex};

use tracing::info;

use super::EntityId;

/// User-facing feedback channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, entity: EntityId, text: &str);
}

/// Writes every message to the log; the default when no client transport is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, entity: EntityId, text: &str) {
        info!(entity = entity.0, text, "notify");
    }
}

/// Keeps messages in memory, in send order.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(EntityId, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self { Self::default() }

    pub fn messages(&self) -> Vec<(EntityId, String)> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn messages_for(&self, entity: EntityId) -> Vec<String> {
        self.messages().into_iter().filter(|(e, _)| *e == entity).map(|(_, t)| t).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, entity: EntityId, text: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((entity, text.to_string()));
        }
    }
}
