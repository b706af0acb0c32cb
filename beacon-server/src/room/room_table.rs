use beacon_core::{ParticipantId, RoomId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Which participants are currently joined to which rooms.
///
/// A single mutex guards the whole table so that compound operations,
/// in particular [`RoomTable::leave_all`]'s snapshot-then-remove, are one
/// atomic step with respect to every other caller. Member lists keep join
/// order and never hold duplicates. An empty room is pruned immediately;
/// there is no room "close" event.
pub struct RoomTable {
    rooms: Mutex<HashMap<RoomId, Vec<ParticipantId>>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<RoomId, Vec<ParticipantId>>> {
        self.rooms.lock().expect("room table lock poisoned")
    }

    /// Add a participant to a room, creating the room entry if absent.
    /// Idempotent; returns false if the participant was already a member.
    pub fn join(&self, room_id: &RoomId, identity: &ParticipantId) -> bool {
        let mut table = self.table();
        let members = table.entry(room_id.clone()).or_insert_with(|| {
            debug!(%room_id, "creating room entry");
            Vec::new()
        });
        if members.contains(identity) {
            return false;
        }
        members.push(identity.clone());
        true
    }

    /// Remove a participant from a room. Idempotent; prunes the room when
    /// the last member leaves.
    pub fn leave(&self, room_id: &RoomId, identity: &ParticipantId) -> bool {
        let mut table = self.table();
        let Some(members) = table.get_mut(room_id) else {
            return false;
        };
        let Some(pos) = members.iter().position(|m| m == identity) else {
            return false;
        };
        members.remove(pos);
        if members.is_empty() {
            debug!(%room_id, "pruning empty room");
            table.remove(room_id);
        }
        true
    }

    /// Remove a participant from every room it belongs to, returning the
    /// rooms it was a member of at the moment of removal. The snapshot and
    /// the removal happen under one lock acquisition: any operation that
    /// starts after this returns observes the participant in no room.
    pub fn leave_all(&self, identity: &ParticipantId) -> Vec<RoomId> {
        let mut table = self.table();
        let mut left = Vec::new();
        table.retain(|room_id, members| {
            if let Some(pos) = members.iter().position(|m| m == identity) {
                members.remove(pos);
                left.push(room_id.clone());
            }
            if members.is_empty() {
                debug!(%room_id, "pruning empty room");
                false
            } else {
                true
            }
        });
        left
    }

    /// Current member list of a room, in join order. Returns a copy so the
    /// caller can iterate without holding the table lock.
    pub fn members_of(&self, room_id: &RoomId) -> Vec<ParticipantId> {
        self.table().get(room_id).cloned().unwrap_or_default()
    }

    /// Number of room entries; lets tests observe pruning, which
    /// `members_of` alone cannot distinguish from an empty room.
    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.table().len()
    }
}

impl Default for RoomTable {
    fn default() -> Self {
        Self::new()
    }
}
