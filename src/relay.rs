//! WebSocket relay.
//!
//! Process-local fanout of edit notifications within a project group. Each
//! connection registers an outbound channel and may tag itself with a
//! project id via a `join_project` frame; `file_change` frames are
//! rebroadcast verbatim to every other tagged connection in the same group.
//! No persistence, no delivery guarantee, no resync after reconnect.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

struct Peer {
    project_id: Option<i32>,
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct RelayInner {
    next_id: u64,
    peers: HashMap<u64, Peer>,
}

/// Shared registry of open relay connections.
#[derive(Clone, Default)]
pub struct Relay {
    inner: Arc<Mutex<RelayInner>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; the receiver yields frames to forward to the
    /// peer's socket.
    pub async fn register(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.peers.insert(
            id,
            Peer {
                project_id: None,
                tx,
            },
        );
        tracing::debug!(conn = id, "relay connection registered");
        (id, rx)
    }

    pub async fn deregister(&self, id: u64) {
        self.inner.lock().await.peers.remove(&id);
        tracing::debug!(conn = id, "relay connection closed");
    }

    /// Handle one inbound text frame. Malformed frames are logged and
    /// dropped; unknown frame types are ignored.
    pub async fn handle_frame(&self, sender: u64, raw: &str) {
        let data: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(conn = sender, error = %e, "dropping malformed relay frame");
                return;
            }
        };

        match data["type"].as_str() {
            Some("join_project") => {
                let Some(project_id) = data["projectId"].as_i64() else {
                    tracing::warn!(conn = sender, "join_project frame without projectId");
                    return;
                };
                let mut inner = self.inner.lock().await;
                if let Some(peer) = inner.peers.get_mut(&sender) {
                    peer.project_id = Some(project_id as i32);
                }
                tracing::debug!(conn = sender, project_id, "relay connection joined project");
            }
            Some("file_change") => {
                self.broadcast_from(sender, raw).await;
            }
            other => {
                tracing::debug!(conn = sender, frame_type = ?other, "ignoring relay frame");
            }
        }
    }

    /// Send the raw payload to every other peer in the sender's project
    /// group. Untagged senders broadcast to nobody.
    async fn broadcast_from(&self, sender: u64, raw: &str) {
        let inner = self.inner.lock().await;
        let Some(project_id) = inner.peers.get(&sender).and_then(|p| p.project_id) else {
            return;
        };
        for (id, peer) in inner.peers.iter() {
            if *id == sender || peer.project_id != Some(project_id) {
                continue;
            }
            // A closed receiver just means the peer is going away; its entry
            // is removed on deregister.
            let _ = peer.tx.send(raw.to_string());
        }
    }
}
