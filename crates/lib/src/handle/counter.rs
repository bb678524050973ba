use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::Result;
use crate::handle::{Binding, Handle, HandleKind};
use crate::operation::OperationNode;
use crate::session::Session;
use crate::transport::{MapValue, UpdateMap, WriteOptions};

/// A Riak Counter inside a document.
///
/// `increase` changes the local value immediately and remembers the increment until
/// it is sent, either by `exec` or as part of the next document update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    binding: Binding,
    value: i64,
    pending: i64,
}

impl Counter {
    /// An unbound counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Increment not yet sent to the server.
    pub fn pending(&self) -> i64 {
        self.pending
    }

    /// Add `amount` (which may be negative) to the counter.
    pub fn increase(&mut self, amount: i64) -> &mut Self {
        self.value += amount;
        self.pending += amount;
        self
    }

    /// Send the pending increment and refresh the value from the server.
    pub fn exec(&mut self, session: &Session) -> Result<()> {
        self.binding.validate(HandleKind::Counter)?;

        let pending = self.pending;
        let response = session.update_map(UpdateMap {
            location: self.binding.location().clone(),
            operation: self
                .binding
                .operation(|name, node| {
                    node.increment_counter(name, pending);
                }),
            context: None,
            return_body: true,
            options: WriteOptions::default(),
        })?;

        if let Some(value) = response
            .map
            .as_ref()
            .and_then(|map| self.binding.map_in(map))
            .and_then(|map| map.counters.get(&self.binding.name))
        {
            self.value = *value;
        }
        self.pending = 0;

        debug!(
            path = %self.binding.path,
            name = %self.binding.name,
            sent = pending,
            value = self.value,
            "Executed counter"
        );
        Ok(())
    }
}

impl Handle for Counter {
    const KIND: HandleKind = HandleKind::Counter;

    fn bound(binding: Binding) -> Self {
        Self {
            binding,
            ..Self::default()
        }
    }

    fn load(binding: Binding, map: &MapValue) -> Self {
        let value = map.counters.get(&binding.name).copied().unwrap_or(0);
        Self {
            binding,
            value,
            pending: 0,
        }
    }

    fn placeholder(name: &str, node: &mut OperationNode) {
        node.increment_counter(name, 0);
    }

    fn write_pending(&self, name: &str, node: &mut OperationNode) {
        node.increment_counter(name, self.pending);
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn exec(&mut self, session: &Session) -> Result<()> {
        Counter::exec(self, session)
    }
}

/// Serialized as the plain integer value.
impl Serialize for Counter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de> Deserialize<'de> for Counter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(Self {
            value,
            ..Self::default()
        })
    }
}
