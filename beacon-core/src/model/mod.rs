mod envelope;
mod participant;
mod room;

pub use envelope::{ClientEnvelope, EnvelopeError, ServerEnvelope};
pub use participant::ParticipantId;
pub use room::RoomId;
