use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure to decode an inbound envelope. The message names the offending
/// variant or field so it can be echoed back to the sender verbatim.
#[derive(Debug, thiserror::Error)]
#[error("malformed envelope: {reason}")]
pub struct EnvelopeError {
    reason: String,
}

impl EnvelopeError {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            reason: e.to_string(),
        }
    }
}

/// Signaling envelope sent by a client. The `offer`/`answer`/`candidate`
/// payloads are opaque to the relay and forwarded verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEnvelope {
    JoinRoom {
        room_id: RoomId,
    },
    WebrtcOffer {
        target_user: ParticipantId,
        offer: Value,
    },
    WebrtcAnswer {
        target_user: ParticipantId,
        answer: Value,
    },
    IceCandidate {
        target_user: ParticipantId,
        candidate: Value,
    },
    LeaveRoom {
        room_id: RoomId,
    },
}

impl ClientEnvelope {
    /// Decode one text frame. Unknown `type` values and missing required
    /// fields both surface as an [`EnvelopeError`] naming the problem.
    pub fn from_json(text: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Signaling envelope sent to a client. `from_user` is always the identity
/// the relay knows the sending connection by, never a client-supplied field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEnvelope {
    UserJoined {
        user_id: ParticipantId,
        room_id: RoomId,
    },
    Participants {
        participants: Vec<ParticipantId>,
    },
    WebrtcOffer {
        offer: Value,
        from_user: ParticipantId,
    },
    WebrtcAnswer {
        answer: Value,
        from_user: ParticipantId,
    },
    IceCandidate {
        candidate: Value,
        from_user: ParticipantId,
    },
    UserLeft {
        user_id: ParticipantId,
        room_id: RoomId,
    },
    Error {
        message: String,
    },
}

impl ServerEnvelope {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
