use axum::extract::ws::Message;
use beacon_core::{ParticipantId, ServerEnvelope};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Live side of one registered connection. The session task that owns the
/// socket holds one clone; the registry holds another. The `closed` flag is
/// shared so the Closed transition runs at most once no matter which side
/// triggers it.
#[derive(Clone)]
pub struct ConnectionHandle {
    conn_id: u64,
    outbound: mpsc::UnboundedSender<Message>,
    closed: Arc<AtomicBool>,
}

impl ConnectionHandle {
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flip the flag; true only for the caller that closed it first.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Ask the writer task to emit a Close frame and stop. Used when a
    /// connection is superseded by a reconnect under the same identity.
    pub(crate) fn send_close_frame(&self) {
        let _ = self.outbound.send(Message::Close(None));
    }
}

/// Maps each live participant identity to its outbound channel; the single
/// source of truth for "is this participant reachable right now".
///
/// Every entry's channel is unbounded and drained by that connection's
/// writer task, so [`ConnectionRegistry::deliver`] never blocks and never
/// holds a map shard lock across a socket write.
pub struct ConnectionRegistry {
    peers: DashMap<ParticipantId, ConnectionHandle>,
    next_conn_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Store the mapping for a new connection. The caller (the session
    /// lifecycle) must have closed any previous connection for this
    /// identity first; see `SignalingService::connect`.
    pub fn register(
        &self,
        identity: ParticipantId,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> ConnectionHandle {
        let handle = ConnectionHandle {
            conn_id: self.next_conn_id.fetch_add(1, Ordering::Relaxed),
            outbound,
            closed: Arc::new(AtomicBool::new(false)),
        };
        self.peers.insert(identity, handle.clone());
        handle
    }

    /// Remove the mapping, but only if it still belongs to `conn_id`.
    /// A superseded session tearing down late must not evict the
    /// connection that replaced it. Idempotent.
    pub fn unregister(&self, identity: &ParticipantId, conn_id: u64) {
        self.peers
            .remove_if(identity, |_, handle| handle.conn_id == conn_id);
    }

    /// Handle of the current connection for an identity, if any.
    pub fn handle_of(&self, identity: &ParticipantId) -> Option<ConnectionHandle> {
        self.peers.get(identity).map(|h| h.clone())
    }

    /// Best-effort delivery: serialize and queue on the recipient's
    /// outbound channel. A missing identity or a gone writer task is a
    /// silent drop (the recipient's own session runs its cleanup); the
    /// sender is never handed a hard error.
    pub fn deliver(&self, identity: &ParticipantId, envelope: &ServerEnvelope) -> bool {
        let Some(handle) = self.peers.get(identity) else {
            debug!(%identity, "dropping delivery to unknown participant");
            return false;
        };
        let json = match envelope.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("failed to serialize envelope: {e}");
                return false;
            }
        };
        if handle.outbound.send(Message::Text(json.into())).is_err() {
            debug!(%identity, "dropping delivery, participant channel closed");
            return false;
        }
        true
    }

    pub fn is_live(&self, identity: &ParticipantId) -> bool {
        self.peers.contains_key(identity)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
