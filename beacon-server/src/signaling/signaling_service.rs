use crate::room::RoomTable;
use crate::signaling::{ConnectionHandle, ConnectionRegistry, MessageRouter};
use axum::extract::ws::Message;
use beacon_core::{ParticipantId, ServerEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The relay's shared state: connection registry, room membership table and
/// the router over both. One instance is created at startup and handed to
/// the listener as axum state; clones are cheap handle copies.
#[derive(Clone)]
pub struct SignalingService {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
    router: MessageRouter,
}

impl SignalingService {
    pub fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomTable::new());
        let router = MessageRouter::new(registry.clone(), rooms.clone());
        Self {
            registry,
            rooms,
            router,
        }
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn is_live(&self, identity: &ParticipantId) -> bool {
        self.registry.is_live(identity)
    }

    /// Admit a connection for `identity`. If the identity already has a live
    /// channel, that connection is superseded: its Closed transition runs
    /// here and its writer is told to emit a Close frame, so there are never
    /// two live channels for one identity.
    pub fn connect(
        &self,
        identity: &ParticipantId,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> ConnectionHandle {
        if let Some(prev) = self.registry.handle_of(identity) {
            warn!(%identity, "duplicate connect, superseding previous channel");
            self.disconnect(identity, &prev);
            prev.send_close_frame();
        }
        info!(%identity, "participant active");
        self.registry.register(identity.clone(), outbound)
    }

    /// The Closed transition. Runs at most once per connection regardless of
    /// how many times it is triggered (read error, explicit close frame and
    /// a supersede can all race into here).
    ///
    /// Ordering is load-bearing: snapshot-and-remove room membership first,
    /// then drop the registry mapping, then notify each former room's
    /// remaining members. The departing participant is gone from both
    /// structures before anyone is told, so it is never re-notified and no
    /// `user_left` is lost.
    pub fn disconnect(&self, identity: &ParticipantId, handle: &ConnectionHandle) {
        if !handle.mark_closed() {
            return;
        }

        let rooms = self.rooms.leave_all(identity);
        self.registry.unregister(identity, handle.conn_id());

        for room_id in rooms {
            let left = ServerEnvelope::UserLeft {
                user_id: identity.clone(),
                room_id: room_id.clone(),
            };
            for peer in self.rooms.members_of(&room_id) {
                self.registry.deliver(&peer, &left);
            }
        }
        info!(%identity, "participant closed");
    }

    /// Report a per-message error back to the offending sender. The
    /// connection stays active.
    pub fn report_error(&self, identity: &ParticipantId, message: &str) {
        self.registry.deliver(
            identity,
            &ServerEnvelope::Error {
                message: message.to_string(),
            },
        );
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}
