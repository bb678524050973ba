//! The boundary to a Riak protocol client.
//!
//! This module defines the [`Transport`] trait and the command and response types it
//! exchanges. The library never talks to the network itself: every logical operation
//! (fetching a Map, updating a Map, deleting an object) is one call to
//! [`Transport::execute`].
//!
//! [`InMemoryTransport`] simulates the Map semantics of a Riak node and backs the tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::Location;

mod errors;
pub mod in_memory;

pub use errors::TransportError;
pub use in_memory::InMemoryTransport;

/// Executes commands against a Riak cluster.
///
/// Implementations own connection handling, pooling and retries. They must be `Send`
/// and `Sync` so one transport can be shared by every session clone.
pub trait Transport: Send + Sync {
    /// Run one command and return its response.
    fn execute(&self, command: Command) -> std::result::Result<Response, TransportError>;
}

/// Read consistency for fetches. `None` leaves the choice to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Primary replicas that must respond
    pub pr: Option<u32>,
    /// Replicas that must respond
    pub r: Option<u32>,
}

impl ReadOptions {
    /// Fill unset values from `defaults`.
    pub fn or(self, defaults: &ReadOptions) -> ReadOptions {
        ReadOptions {
            pr: self.pr.or(defaults.pr),
            r: self.r.or(defaults.r),
        }
    }
}

/// Write consistency for updates and deletes. `None` leaves the choice to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Primary replicas that must acknowledge
    pub pw: Option<u32>,
    /// Replicas that must commit to durable storage
    pub dw: Option<u32>,
    /// Replicas that must acknowledge
    pub w: Option<u32>,
}

impl WriteOptions {
    /// Fill unset values from `defaults`.
    pub fn or(self, defaults: &WriteOptions) -> WriteOptions {
        WriteOptions {
            pw: self.pw.or(defaults.pw),
            dw: self.dw.or(defaults.dw),
            w: self.w.or(defaults.w),
        }
    }
}

/// A Map update as sent over the wire.
///
/// Produced by [`FieldFilter::apply`](crate::FieldFilter::apply), or directly from an
/// [`OperationNode`](crate::OperationNode) with `MapOperation::from`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOperation {
    pub registers: BTreeMap<String, Vec<u8>>,
    pub counters: BTreeMap<String, i64>,
    pub set_adds: BTreeMap<String, Vec<Vec<u8>>>,
    pub set_removes: BTreeMap<String, Vec<Vec<u8>>>,
    pub flags: BTreeMap<String, bool>,
    pub maps: BTreeMap<String, MapOperation>,
}

impl MapOperation {
    /// Returns true if this operation or any nested one removes Set members.
    pub fn has_set_removes(&self) -> bool {
        self.set_removes.values().any(|members| !members.is_empty())
            || self.maps.values().any(MapOperation::has_set_removes)
    }

    /// Returns true if no leaf operation is present at any depth.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
            && self.counters.is_empty()
            && self.set_adds.is_empty()
            && self.set_removes.is_empty()
            && self.flags.is_empty()
            && self.maps.values().all(MapOperation::is_empty)
    }
}

/// The current value of a fetched Map.
///
/// Set members are kept in the order the server returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapValue {
    pub registers: BTreeMap<String, Vec<u8>>,
    pub counters: BTreeMap<String, i64>,
    pub sets: BTreeMap<String, Vec<Vec<u8>>>,
    pub flags: BTreeMap<String, bool>,
    pub maps: BTreeMap<String, MapValue>,
}

impl MapValue {
    /// Walk nested Maps along `segments`.
    pub fn at_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&MapValue> {
        segments
            .iter()
            .try_fold(self, |map, segment| map.maps.get(segment.as_ref()))
    }

    /// Returns true if the Map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
            && self.counters.is_empty()
            && self.sets.is_empty()
            && self.flags.is_empty()
            && self.maps.is_empty()
    }
}

/// Fetch a Map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMap {
    pub location: Location,
    pub options: ReadOptions,
}

/// Apply a [`MapOperation`] to a Map, creating it if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMap {
    /// Target object. An empty key asks the server to generate one.
    pub location: Location,
    pub operation: MapOperation,
    /// Causal context from an earlier fetch, required for removals
    pub context: Option<Vec<u8>>,
    /// Ask the server to return the updated Map
    pub return_body: bool,
    pub options: WriteOptions,
}

/// Delete an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub location: Location,
    pub options: WriteOptions,
}

/// A command for [`Transport::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchMap(FetchMap),
    UpdateMap(UpdateMap),
    Delete(Delete),
}

impl Command {
    /// Short name of the command, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::FetchMap(_) => "fetch_map",
            Command::UpdateMap(_) => "update_map",
            Command::Delete(_) => "delete",
        }
    }

    /// The object this command targets.
    pub fn location(&self) -> &Location {
        match self {
            Command::FetchMap(cmd) => &cmd.location,
            Command::UpdateMap(cmd) => &cmd.location,
            Command::Delete(cmd) => &cmd.location,
        }
    }
}

/// Result of a [`FetchMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchMapResponse {
    /// The Map value, empty when `not_found` is set
    pub map: MapValue,
    /// Opaque causal context
    pub context: Vec<u8>,
    pub not_found: bool,
}

/// Result of an [`UpdateMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMapResponse {
    /// Key chosen by the server when the command had none
    pub generated_key: Option<String>,
    /// The updated Map, present when the body was requested
    pub map: Option<MapValue>,
    pub context: Vec<u8>,
}

/// A response from [`Transport::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    FetchMap(FetchMapResponse),
    UpdateMap(UpdateMapResponse),
    Delete,
}

impl Response {
    /// Short name of the response, matching [`Command::kind`].
    pub fn kind(&self) -> &'static str {
        match self {
            Response::FetchMap(_) => "fetch_map",
            Response::UpdateMap(_) => "update_map",
            Response::Delete => "delete",
        }
    }
}
