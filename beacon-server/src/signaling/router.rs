use crate::room::RoomTable;
use crate::signaling::ConnectionRegistry;
use beacon_core::{ClientEnvelope, ParticipantId, RoomId, ServerEnvelope};
use std::sync::Arc;
use tracing::debug;

/// Interprets inbound signaling envelopes and dispatches them: personal
/// delivery for offer/answer/candidate, room broadcast for membership
/// changes. `from_user` on forwarded envelopes is always the identity the
/// sending connection registered under, so a client cannot spoof it.
#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
}

impl MessageRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomTable>) -> Self {
        Self { registry, rooms }
    }

    pub fn handle(&self, sender: &ParticipantId, envelope: ClientEnvelope) {
        match envelope {
            ClientEnvelope::JoinRoom { room_id } => self.handle_join(sender, room_id),
            ClientEnvelope::LeaveRoom { room_id } => self.handle_leave(sender, room_id),
            ClientEnvelope::WebrtcOffer { target_user, offer } => self.forward(
                sender,
                target_user,
                |from_user| ServerEnvelope::WebrtcOffer { offer, from_user },
            ),
            ClientEnvelope::WebrtcAnswer {
                target_user,
                answer,
            } => self.forward(sender, target_user, |from_user| {
                ServerEnvelope::WebrtcAnswer { answer, from_user }
            }),
            ClientEnvelope::IceCandidate {
                target_user,
                candidate,
            } => self.forward(sender, target_user, |from_user| {
                ServerEnvelope::IceCandidate {
                    candidate,
                    from_user,
                }
            }),
        }
    }

    fn handle_join(&self, sender: &ParticipantId, room_id: RoomId) {
        self.rooms.join(&room_id, sender);

        let peers: Vec<ParticipantId> = self
            .rooms
            .members_of(&room_id)
            .into_iter()
            .filter(|p| p != sender)
            .collect();

        let joined = ServerEnvelope::UserJoined {
            user_id: sender.clone(),
            room_id,
        };
        for peer in &peers {
            self.registry.deliver(peer, &joined);
        }

        self.registry
            .deliver(sender, &ServerEnvelope::Participants { participants: peers });
    }

    fn handle_leave(&self, sender: &ParticipantId, room_id: RoomId) {
        // Recipients are computed before removal; the sender is excluded
        // from its own notification.
        let recipients = self.rooms.members_of(&room_id);
        self.rooms.leave(&room_id, sender);

        let left = ServerEnvelope::UserLeft {
            user_id: sender.clone(),
            room_id,
        };
        for peer in recipients.iter().filter(|p| *p != sender) {
            self.registry.deliver(peer, &left);
        }
    }

    fn forward<F>(&self, sender: &ParticipantId, target: ParticipantId, build: F)
    where
        F: FnOnce(ParticipantId) -> ServerEnvelope,
    {
        if !self.registry.is_live(&target) {
            debug!(%sender, %target, "dropping signal to unknown target");
            return;
        }
        self.registry.deliver(&target, &build(sender.clone()));
    }
}
