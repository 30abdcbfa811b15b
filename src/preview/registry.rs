//! Connected preview clients

use std::path::Path;

use serde::Serialize;
use tokio::sync::broadcast;

use super::ReloadSink;

/// Buffered messages per client before a slow client starts lagging
const CHANNEL_CAPACITY: usize = 64;

/// Instruction sent to browsers over the reload socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    Reload,
    Inject { path: String },
}

impl ReloadMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

/// Fan-out of reload messages to every open WebSocket
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    tx: broadcast::Sender<ReloadMessage>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a client; dropping the receiver unregisters it
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, message: ReloadMessage) {
        match self.tx.send(message) {
            Ok(clients) => tracing::debug!(clients, "reload signal sent"),
            Err(broadcast::error::SendError(message)) => {
                tracing::trace!(?message, "no preview clients connected")
            }
        }
    }
}

impl ReloadSink for ClientRegistry {
    fn broadcast_reload(&self) {
        tracing::info!("Reloading browsers");
        self.send(ReloadMessage::Reload);
    }

    fn inject_asset(&self, path: &Path) {
        let url = format!("/{}", path.to_string_lossy().replace('\\', "/").trim_start_matches('/'));
        tracing::info!(asset = %url, "Injecting changed asset");
        self.send(ReloadMessage::Inject { path: url });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_json_shape() {
        assert_eq!(ReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
        let inject = ReloadMessage::Inject {
            path: "/css/resume.min.css".to_string(),
        };
        assert_eq!(
            inject.to_json(),
            r#"{"type":"inject","path":"/css/resume.min.css"}"#
        );
    }

    #[tokio::test]
    async fn broadcasts_to_every_client() {
        let registry = ClientRegistry::new();
        let mut a = registry.subscribe();
        let mut b = registry.subscribe();
        assert_eq!(registry.client_count(), 2);

        registry.broadcast_reload();

        assert_eq!(a.recv().await.unwrap(), ReloadMessage::Reload);
        assert_eq!(b.recv().await.unwrap(), ReloadMessage::Reload);
    }

    #[tokio::test]
    async fn inject_uses_url_paths() {
        let registry = ClientRegistry::new();
        let mut rx = registry.subscribe();

        registry.inject_asset(Path::new("css/resume.min.css"));

        assert_eq!(
            rx.recv().await.unwrap(),
            ReloadMessage::Inject {
                path: "/css/resume.min.css".to_string()
            }
        );
    }

    #[test]
    fn sending_without_clients_is_fine() {
        let registry = ClientRegistry::new();
        registry.broadcast_reload();
        assert_eq!(registry.client_count(), 0);
    }

    #[test]
    fn dropped_receivers_unregister() {
        let registry = ClientRegistry::new();
        let rx = registry.subscribe();
        assert_eq!(registry.client_count(), 1);
        drop(rx);
        assert_eq!(registry.client_count(), 0);
    }
}
