use crate::domain::messages::BroadcastMessage;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

pub type ObserverId = Uuid;

/// Default per-observer queue depth before an observer counts as too slow
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Why a delivery to one observer did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The observer's queue is full; it is not keeping up
    Lagging,
    /// The connection side dropped its receiver
    Closed,
    /// Already marked dead by an earlier failure
    Dead,
}

/// A live observer connection as seen by the broadcaster.
///
/// Messages are queued in a bounded FIFO drained by the connection task.
pub struct Observer {
    id: ObserverId,
    connected_at: DateTime<Utc>,
    alive: AtomicBool,
    tx: mpsc::Sender<Arc<BroadcastMessage>>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Non-blocking enqueue. Never waits on a slow consumer.
    pub fn deliver(&self, message: Arc<BroadcastMessage>) -> Result<(), DeliveryFailure> {
        if !self.is_alive() {
            return Err(DeliveryFailure::Dead);
        }
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryFailure::Lagging,
            mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Closed,
        })
    }
}

/// Handle returned to the connection that registered: its identity plus the
/// receiving end of its delivery queue.
pub struct Subscription {
    pub observer: Arc<Observer>,
    pub receiver: mpsc::Receiver<Arc<BroadcastMessage>>,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.observer.id()
    }
}

/// Registry of currently connected observers
#[derive(Clone)]
pub struct ObserverRegistry {
    observers: Arc<RwLock<HashMap<ObserverId, Arc<Observer>>>>,
    queue_capacity: usize,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            observers: Arc::new(RwLock::new(HashMap::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Create and store a new observer
    pub async fn register(&self) -> Subscription {
        let (tx, receiver) = mpsc::channel(self.queue_capacity);
        let observer = Arc::new(Observer {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
            tx,
        });

        let count = {
            let mut observers = self.observers.write().await;
            observers.insert(observer.id, observer.clone());
            observers.len()
        };
        info!("ObserverRegistry: {} connected ({} total)", observer.id, count);

        Subscription { observer, receiver }
    }

    /// Remove an observer. Unknown or already-removed ids are a no-op.
    pub async fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.write().await.remove(&id);
        match removed {
            Some(observer) => {
                observer.mark_dead();
                info!("ObserverRegistry: {} disconnected", id);
                true
            }
            None => {
                debug!("ObserverRegistry: {} already removed", id);
                false
            }
        }
    }

    /// Point-in-time copy of the current members
    pub async fn snapshot(&self) -> Vec<Arc<Observer>> {
        self.observers.read().await.values().cloned().collect()
    }

    pub async fn contains(&self, id: ObserverId) -> bool {
        self.observers.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.observers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.observers.read().await.is_empty()
    }

    /// Drop every observer; their connection tasks see a closed queue and exit
    pub async fn clear(&self) -> usize {
        let drained: Vec<_> = self.observers.write().await.drain().collect();
        for (_, observer) in &drained {
            observer.mark_dead();
        }
        drained.len()
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::MessageKind;
    use serde_json::json;

    fn message(n: u64) -> Arc<BroadcastMessage> {
        Arc::new(BroadcastMessage::new(
            MessageKind::ScenarioCompleted,
            json!({ "n": n }),
        ))
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let registry = ObserverRegistry::new();
        assert!(registry.is_empty().await);

        let sub = registry.register().await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains(sub.id()).await);

        assert!(registry.unregister(sub.id()).await);
        assert!(!registry.contains(sub.id()).await);
        assert!(!sub.observer.is_alive());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ObserverRegistry::new();
        let sub = registry.register().await;

        assert!(registry.unregister(sub.id()).await);
        assert!(!registry.unregister(sub.id()).await);
        assert!(!registry.unregister(Uuid::new_v4()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_changes() {
        let registry = ObserverRegistry::new();
        let a = registry.register().await;
        let _b = registry.register().await;

        let snapshot = registry.snapshot().await;
        registry.unregister(a.id()).await;
        let _c = registry.register().await;

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_deliver_reports_lagging_and_closed() {
        let registry = ObserverRegistry::with_capacity(1);
        let sub = registry.register().await;

        assert_eq!(sub.observer.deliver(message(1)), Ok(()));
        assert_eq!(sub.observer.deliver(message(2)), Err(DeliveryFailure::Lagging));

        let Subscription { observer, receiver } = sub;
        drop(receiver);
        assert_eq!(observer.deliver(message(3)), Err(DeliveryFailure::Closed));

        observer.mark_dead();
        assert_eq!(observer.deliver(message(4)), Err(DeliveryFailure::Dead));
    }

    #[tokio::test]
    async fn test_concurrent_register_unregister() {
        let registry = ObserverRegistry::new();
        let mut handles = Vec::new();

        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let sub = registry.register().await;
                tokio::task::yield_now().await;
                registry.unregister(sub.id()).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(registry.is_empty().await);
    }
}
