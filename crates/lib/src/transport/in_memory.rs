use crate::path::Location;
use crate::transport::{
    Command, Delete, FetchMap, FetchMapResponse, MapOperation, MapValue, Response, Transport,
    TransportError, UpdateMap, UpdateMapResponse,
};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;

/// A stored Map and the version its causal context encodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredMap {
    map: MapValue,
    version: u64,
}

/// A transport that keeps Maps in a `HashMap` and applies updates the way a Riak node does.
///
/// This transport is suitable for tests and local development. Counters accumulate,
/// Set members are kept sorted and unique, nested Maps are created on demand, and
/// removing Set members without a causal context is rejected.
///
/// The causal context handed out is the object's version as 8 big-endian bytes. It is
/// only checked for presence, never for staleness.
///
/// Every executed command is recorded and can be inspected with [`commands`](Self::commands).
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    /// Stored objects with read-write lock for concurrent access
    objects: RwLock<HashMap<Location, StoredMap>>,
    /// Commands received, in order
    log: RwLock<Vec<Command>>,
}

/// Serializable version of InMemoryTransport for persistence
#[derive(Serialize, Deserialize)]
struct SerializableTransport {
    objects: Vec<(Location, StoredMap)>,
}

impl Serialize for InMemoryTransport {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let objects = self
            .objects
            .read()
            .map_err(|_| serde::ser::Error::custom("object store lock poisoned"))?
            .iter()
            .map(|(location, stored)| (location.clone(), stored.clone()))
            .collect();

        SerializableTransport { objects }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InMemoryTransport {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serializable = SerializableTransport::deserialize(deserializer)?;

        Ok(InMemoryTransport {
            objects: RwLock::new(serializable.objects.into_iter().collect()),
            log: RwLock::new(Vec::new()),
        })
    }
}

impl InMemoryTransport {
    /// Creates a new, empty `InMemoryTransport`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes all stored objects to JSON. The command log is not included.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }

    /// Restores a transport from JSON written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Returns a copy of the Map stored at `location`.
    pub fn stored(&self, location: &Location) -> Option<MapValue> {
        self.objects
            .read()
            .ok()?
            .get(location)
            .map(|stored| stored.map.clone())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all commands executed so far.
    pub fn commands(&self) -> Vec<Command> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    /// Returns the commands executed so far and clears the log.
    pub fn take_commands(&self) -> Vec<Command> {
        self.log
            .write()
            .map(|mut log| std::mem::take(&mut *log))
            .unwrap_or_default()
    }

    fn fetch(&self, cmd: FetchMap) -> std::result::Result<Response, TransportError> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        let response = match objects.get(&cmd.location) {
            Some(stored) => FetchMapResponse {
                map: stored.map.clone(),
                context: context_for(stored.version),
                not_found: false,
            },
            None => FetchMapResponse {
                not_found: true,
                ..Default::default()
            },
        };
        trace!(location = %cmd.location, not_found = response.not_found, "Fetched map");
        Ok(Response::FetchMap(response))
    }

    fn update(&self, cmd: UpdateMap) -> std::result::Result<Response, TransportError> {
        if cmd.location.bucket.is_empty() || cmd.location.bucket_type.is_empty() {
            return Err(TransportError::Protocol {
                reason: "bucket and bucket type are required".to_string(),
            });
        }
        if cmd.context.is_none() && cmd.operation.has_set_removes() {
            return Err(TransportError::Protocol {
                reason: "set removal requires the causal context".to_string(),
            });
        }

        let (location, generated_key) = if cmd.location.key.is_empty() {
            let key = uuid::Uuid::new_v4().simple().to_string();
            (cmd.location.with_key(key.clone()), Some(key))
        } else {
            (cmd.location, None)
        };

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        let stored = objects.entry(location.clone()).or_default();
        apply_operation(&mut stored.map, &cmd.operation);
        stored.version += 1;

        trace!(
            location = %location,
            version = stored.version,
            generated = generated_key.is_some(),
            "Applied map update"
        );

        Ok(Response::UpdateMap(UpdateMapResponse {
            generated_key,
            map: cmd.return_body.then(|| stored.map.clone()),
            context: context_for(stored.version),
        }))
    }

    fn delete(&self, cmd: Delete) -> std::result::Result<Response, TransportError> {
        let removed = self
            .objects
            .write()
            .map_err(|_| poisoned())?
            .remove(&cmd.location)
            .is_some();
        trace!(location = %cmd.location, removed, "Deleted object");
        Ok(Response::Delete)
    }
}

impl Transport for InMemoryTransport {
    fn execute(&self, command: Command) -> std::result::Result<Response, TransportError> {
        self.log.write().map_err(|_| poisoned())?.push(command.clone());

        match command {
            Command::FetchMap(cmd) => self.fetch(cmd),
            Command::UpdateMap(cmd) => self.update(cmd),
            Command::Delete(cmd) => self.delete(cmd),
        }
    }
}

fn context_for(version: u64) -> Vec<u8> {
    version.to_be_bytes().to_vec()
}

fn poisoned() -> TransportError {
    TransportError::Other {
        reason: "in-memory store lock poisoned".to_string(),
    }
}

/// Apply an update to a stored Map. Removes run before adds.
fn apply_operation(map: &mut MapValue, op: &MapOperation) {
    for (name, value) in &op.registers {
        map.registers.insert(name.clone(), value.clone());
    }
    for (name, increment) in &op.counters {
        *map.counters.entry(name.clone()).or_insert(0) += increment;
    }
    for (name, members) in &op.set_removes {
        if let Some(set) = map.sets.get_mut(name) {
            set.retain(|member| !members.contains(member));
        }
    }
    for (name, members) in &op.set_adds {
        let set = map.sets.entry(name.clone()).or_default();
        for member in members {
            if let Err(pos) = set.binary_search(member) {
                set.insert(pos, member.clone());
            }
        }
    }
    for (name, value) in &op.flags {
        map.flags.insert(name.clone(), *value);
    }
    for (name, child) in &op.maps {
        apply_operation(map.maps.entry(name.clone()).or_default(), child);
    }
}
