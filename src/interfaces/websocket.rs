//! Live metrics stream over WebSocket.
//!
//! Each connection registers one observer, forwards every broadcast as a JSON
//! text frame and answers `ping` with `pong`.

use crate::application::broadcasting::{ObserverRegistry, Subscription};
use crate::infrastructure::observability::Metrics;
use crate::interfaces::api::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

pub async fn metrics_stream(ws: WebSocketUpgrade, State(app): State<AppState>) -> Response {
    let registry = app.registry.clone();
    let metrics = app.metrics.clone();
    ws.on_upgrade(move |socket| serve_observer(socket, registry, metrics))
}

async fn serve_observer(socket: WebSocket, registry: ObserverRegistry, metrics: Metrics) {
    let Subscription {
        observer,
        mut receiver,
    } = registry.register().await;
    let id = observer.id();
    // The registry holds the only sender, so eviction closes `receiver`
    drop(observer);
    metrics.observers_connected.set(registry.len().await as i64);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outbound = receiver.recv() => {
                // None: evicted or registry cleared
                let Some(message) = outbound else { break };
                if let Err(e) = sink.send(Message::Text(message.to_json().into())).await {
                    debug!("WebSocket: send to {} failed: {}", id, e);
                    break;
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if text.as_str().trim() == "ping"
                        && let Err(e) = sink.send(Message::Text("pong".into())).await
                    {
                        debug!("WebSocket: pong to {} failed: {}", id, e);
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket: receive error from {}: {}", id, e);
                    break;
                }
            },
        }
    }

    registry.unregister(id).await;
    metrics.observers_connected.set(registry.len().await as i64);
    info!("WebSocket: observer {} closed", id);
}
