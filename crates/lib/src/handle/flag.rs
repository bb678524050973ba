use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::Result;
use crate::handle::{Binding, Handle, HandleKind};
use crate::operation::OperationNode;
use crate::session::Session;
use crate::transport::{MapValue, UpdateMap, WriteOptions};

/// A Riak Flag inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flag {
    binding: Binding,
    value: bool,
}

impl Flag {
    /// An unbound flag, initially `false`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set(&mut self, value: bool) -> &mut Self {
        self.value = value;
        self
    }

    /// Send the current value.
    pub fn exec(&mut self, session: &Session) -> Result<()> {
        self.binding.validate(HandleKind::Flag)?;

        let value = self.value;
        session.update_map(UpdateMap {
            location: self.binding.location().clone(),
            operation: self.binding.operation(|name, node| {
                node.set_flag(name, value);
            }),
            context: self.binding.context_for_update(),
            return_body: false,
            options: WriteOptions::default(),
        })?;

        debug!(path = %self.binding.path, name = %self.binding.name, value, "Executed flag");
        Ok(())
    }
}

impl Handle for Flag {
    const KIND: HandleKind = HandleKind::Flag;

    fn bound(binding: Binding) -> Self {
        Self {
            binding,
            value: false,
        }
    }

    fn load(binding: Binding, map: &MapValue) -> Self {
        let value = map.flags.get(&binding.name).copied().unwrap_or(false);
        Self { binding, value }
    }

    // Flags cannot be created without a value.
    fn placeholder(_name: &str, _node: &mut OperationNode) {}

    fn write_pending(&self, name: &str, node: &mut OperationNode) {
        node.set_flag(name, self.value);
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn exec(&mut self, session: &Session) -> Result<()> {
        Flag::exec(self, session)
    }
}

/// Serialized as the plain boolean.
impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.value)
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = bool::deserialize(deserializer)?;
        Ok(Self {
            value,
            ..Self::default()
        })
    }
}
