use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// Display name a participant chose when connecting.
pub type ParticipantName = String;

/// Opaque identifier for a transport connection.
/// Assigned by the transport layer and stable for the connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry entry. `joined` orders entries by registration so that reverse
/// lookups and roster snapshots are deterministic.
#[derive(Debug, Clone)]
struct Registration {
    participant_name: ParticipantName,
    joined: u64,
}

/// Thread-safe store of who is online, with dual indices for O(1) lookups.
///
/// All mutations go through the primary map's entry lock first and only then
/// touch the name index, so the two indices never disagree for a reader.
///
/// DashMap iterates one shard at a time, so a plain walk over `connections`
/// could mix states from before and after concurrent mutations. Mutations
/// share `membership` while whole-registry reads take it exclusively, which
/// makes `snapshot()` and `connection_ids()` a state the registry actually had.
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, Registration>,

    /// Secondary index: participant name to its live connections, in join order
    name_index: DashMap<ParticipantName, BTreeMap<u64, ConnectionId>>,

    next_joined: AtomicU64,

    membership: RwLock<()>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            name_index: DashMap::new(),
            next_joined: AtomicU64::new(0),
            membership: RwLock::new(()),
        }
    }

    /// Insert or overwrite the participant name for a connection.
    /// Re-adding the same name keeps the connection's original join position.
    pub fn add(&self, connection_id: ConnectionId, participant_name: ParticipantName) {
        let _membership = self.mutating();
        match self.connections.entry(connection_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().participant_name == participant_name {
                    return;
                }

                let previous = entry.get().clone();
                self.unindex(&previous, &connection_id);

                let joined = self.next_joined.fetch_add(1, Ordering::Relaxed);
                self.index(&participant_name, joined, &connection_id);
                debug!(
                    "Renamed connection {} from {} to {}",
                    connection_id, previous.participant_name, participant_name
                );
                entry.insert(Registration {
                    participant_name,
                    joined,
                });
            }
            Entry::Vacant(entry) => {
                let joined = self.next_joined.fetch_add(1, Ordering::Relaxed);
                self.index(&participant_name, joined, &connection_id);
                debug!("Registered connection {connection_id} as {participant_name}");
                entry.insert(Registration {
                    participant_name,
                    joined,
                });
            }
        }
    }

    /// Remove a connection, returning the name it was registered under.
    /// `None` means the connection was never added or is already gone.
    pub fn remove(&self, connection_id: &ConnectionId) -> Option<ParticipantName> {
        let _membership = self.mutating();
        match self.connections.entry(connection_id.clone()) {
            Entry::Occupied(entry) => {
                self.unindex(entry.get(), connection_id);
                let registration = entry.remove();
                debug!(
                    "Unregistered connection {} ({})",
                    connection_id, registration.participant_name
                );
                Some(registration.participant_name)
            }
            Entry::Vacant(_) => None,
        }
    }

    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<ParticipantName> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.participant_name.clone())
    }

    /// The earliest-joined live connection registered under `participant_name`.
    pub fn find_connection_by_name(&self, participant_name: &str) -> Option<ConnectionId> {
        self.name_index
            .get(participant_name)
            .and_then(|connections| connections.values().next().cloned())
    }

    /// Point-in-time copy of the connected participant names, in join order.
    pub fn snapshot(&self) -> Vec<ParticipantName> {
        self.ordered()
            .into_iter()
            .map(|(_, registration)| registration.participant_name)
            .collect()
    }

    /// Owned copy of the live connection ids, in join order.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.ordered()
            .into_iter()
            .map(|(connection_id, _)| connection_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn ordered(&self) -> Vec<(ConnectionId, Registration)> {
        // Holding the gate exclusively keeps every add/remove out of the walk.
        let _membership = self
            .membership
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(ConnectionId, Registration)> = self
            .connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(_, registration)| registration.joined);
        entries
    }

    fn mutating(&self) -> RwLockReadGuard<'_, ()> {
        // The gate guards no data, so a poisoned lock is still usable.
        self.membership.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self, participant_name: &str, joined: u64, connection_id: &ConnectionId) {
        self.name_index
            .entry(participant_name.to_string())
            .or_default()
            .insert(joined, connection_id.clone());
    }

    fn unindex(&self, registration: &Registration, connection_id: &ConnectionId) {
        let participant_name = &registration.participant_name;
        if let Some(mut entry) = self.name_index.get_mut(participant_name) {
            entry.remove(&registration.joined);

            // Clean up empty name entries
            if entry.is_empty() {
                drop(entry); // Release lock before removal
                self.name_index
                    .remove_if(participant_name, |_, connections| connections.is_empty());
            }
        } else {
            warn!("Name index missing {participant_name} for connection {connection_id}");
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
