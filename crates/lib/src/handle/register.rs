use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use tracing::debug;

use crate::Result;
use crate::handle::{Binding, Handle, HandleKind};
use crate::operation::OperationNode;
use crate::session::Session;
use crate::transport::{MapValue, UpdateMap, WriteOptions};

/// A Riak Register inside a document.
///
/// `Display` shows the value as (lossily decoded) text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    binding: Binding,
    value: Vec<u8>,
}

impl Register {
    /// An unbound, empty register.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<Vec<u8>>) -> &mut Self {
        self.value = value.into();
        self
    }

    pub fn set_string(&mut self, value: &str) -> &mut Self {
        self.set(value.as_bytes())
    }

    /// Send the current value.
    pub fn exec(&mut self, session: &Session) -> Result<()> {
        self.binding.validate(HandleKind::Register)?;

        session.update_map(UpdateMap {
            location: self.binding.location().clone(),
            operation: self.binding.operation(|name, node| {
                node.set_register(name, self.value.as_slice());
            }),
            context: self.binding.context_for_update(),
            return_body: false,
            options: WriteOptions::default(),
        })?;

        debug!(
            path = %self.binding.path,
            name = %self.binding.name,
            len = self.value.len(),
            "Executed register"
        );
        Ok(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.value))
    }
}

impl Handle for Register {
    const KIND: HandleKind = HandleKind::Register;

    fn bound(binding: Binding) -> Self {
        Self {
            binding,
            value: Vec::new(),
        }
    }

    fn load(binding: Binding, map: &MapValue) -> Self {
        let value = map.registers.get(&binding.name).cloned().unwrap_or_default();
        Self { binding, value }
    }

    // An empty register would overwrite whatever is stored.
    fn placeholder(_name: &str, _node: &mut OperationNode) {}

    fn write_pending(&self, name: &str, node: &mut OperationNode) {
        node.set_register(name, self.value.as_slice());
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn exec(&mut self, session: &Session) -> Result<()> {
        Register::exec(self, session)
    }
}

/// Serialized as a byte string.
impl Serialize for Register {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.value)
    }
}

impl<'de> Deserialize<'de> for Register {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = ByteBuf::deserialize(deserializer)?;
        Ok(Self {
            value: value.into_vec(),
            ..Self::default()
        })
    }
}
