use crate::application::broadcasting::registry::{DeliveryFailure, ObserverRegistry};
use crate::domain::messages::{BroadcastMessage, MessageKind};
use crate::infrastructure::observability::Metrics;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Telemetry for one fan-out. Never an error for the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// Fans messages out to every registered observer.
///
/// Fan-outs are serialized, so every observer queue sees broadcasts in the
/// same relative order. Enqueueing never blocks: a full or closed queue evicts
/// that observer and the fan-out carries on.
#[derive(Clone)]
pub struct Broadcaster {
    registry: ObserverRegistry,
    metrics: Metrics,
    fanout: Arc<Mutex<()>>,
}

impl Broadcaster {
    pub fn new(registry: ObserverRegistry, metrics: Metrics) -> Self {
        Self {
            registry,
            metrics,
            fanout: Arc::new(Mutex::new(())),
        }
    }

    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    /// Serialize `payload` and broadcast it under `kind`
    pub async fn publish<T: Serialize>(&self, kind: MessageKind, payload: &T) -> DeliveryReport {
        self.broadcast(BroadcastMessage::from_payload(kind, payload))
            .await
    }

    pub async fn broadcast(&self, message: BroadcastMessage) -> DeliveryReport {
        let kind = message.kind();
        let message = Arc::new(message);
        let mut failed = Vec::new();
        let mut delivered = 0;

        {
            let _fanout = self.fanout.lock().await;
            for observer in self.registry.snapshot().await {
                match observer.deliver(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(reason) => {
                        observer.mark_dead();
                        failed.push((observer.id(), reason));
                    }
                }
            }
        }

        let mut evicted = 0;
        for (id, reason) in failed {
            if reason != DeliveryFailure::Dead {
                warn!(
                    "Broadcaster: delivery of {} to {} failed ({:?}), evicting observer",
                    kind, id, reason
                );
            }
            if self.registry.unregister(id).await {
                evicted += 1;
                self.metrics.delivery_failures_total.inc();
            }
        }

        self.metrics.inc_broadcast(kind.as_str());
        self.metrics
            .observers_connected
            .set(self.registry.len().await as i64);
        debug!(
            "Broadcaster: {} delivered to {} observer(s), {} evicted",
            kind, delivered, evicted
        );

        DeliveryReport { delivered, evicted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn broadcaster(capacity: usize) -> Broadcaster {
        let registry = ObserverRegistry::with_capacity(capacity);
        Broadcaster::new(registry, Metrics::new().expect("Failed to create metrics"))
    }

    fn message(tag: &str) -> BroadcastMessage {
        BroadcastMessage::new(MessageKind::ScenarioCompleted, json!({ "tag": tag }))
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_observers() {
        let bus = broadcaster(8);
        let mut a = bus.registry().register().await;
        let mut b = bus.registry().register().await;

        let report = bus.broadcast(message("A")).await;
        assert_eq!(report, DeliveryReport { delivered: 2, evicted: 0 });

        assert_eq!(a.receiver.recv().await.unwrap().data()["tag"], "A");
        assert_eq!(b.receiver.recv().await.unwrap().data()["tag"], "A");
    }

    #[tokio::test]
    async fn test_broadcast_with_no_observers() {
        let bus = broadcaster(8);
        let report = bus.broadcast(message("A")).await;
        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn test_failed_observer_is_evicted_without_affecting_others() {
        let bus = broadcaster(8);
        let dead = bus.registry().register().await;
        let mut live = bus.registry().register().await;
        let dead_id = dead.id();
        drop(dead);

        let report = bus.broadcast(message("A")).await;
        assert_eq!(report, DeliveryReport { delivered: 1, evicted: 1 });
        assert!(!bus.registry().contains(dead_id).await);
        assert_eq!(live.receiver.recv().await.unwrap().data()["tag"], "A");
    }

    #[tokio::test]
    async fn test_slow_observer_is_evicted() {
        let bus = broadcaster(2);
        let slow = bus.registry().register().await;
        let mut fast = bus.registry().register().await;

        for tag in ["A", "B", "C"] {
            bus.broadcast(message(tag)).await;
            fast.receiver.recv().await.unwrap();
        }

        assert!(!bus.registry().contains(slow.id()).await);
        assert!(bus.registry().contains(fast.id()).await);
    }

    #[tokio::test]
    async fn test_fifo_per_observer() {
        let bus = broadcaster(16);
        let mut sub = bus.registry().register().await;

        bus.broadcast(message("A")).await;
        let remote = bus.clone();
        tokio::spawn(async move { remote.broadcast(message("B")).await })
            .await
            .unwrap();
        bus.broadcast(message("C")).await;

        for expected in ["A", "B", "C"] {
            assert_eq!(sub.receiver.recv().await.unwrap().data()["tag"], expected);
        }
    }
}
