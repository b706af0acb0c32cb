pub mod model;

pub use model::{ClientEnvelope, EnvelopeError, ParticipantId, RoomId, ServerEnvelope};
