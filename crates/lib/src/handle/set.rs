use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use tracing::debug;

use crate::Result;
use crate::constants::SET_PLACEHOLDER;
use crate::handle::{Binding, Handle, HandleKind};
use crate::operation::OperationNode;
use crate::session::Session;
use crate::transport::{MapValue, UpdateMap, WriteOptions};

/// A Riak Set inside a document.
///
/// Adds and removes apply to the local items right away and are remembered until
/// sent. An item is never pending as both an add and a remove.
///
/// Removing items requires the causal context, so a Set that should support removal
/// must come from a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set {
    binding: Binding,
    items: Vec<Vec<u8>>,
    adds: Vec<Vec<u8>>,
    removes: Vec<Vec<u8>>,
}

impl Set {
    /// An unbound, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// All items, in server order followed by local adds.
    pub fn value(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// All items as (lossily decoded) strings.
    pub fn strings(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| String::from_utf8_lossy(item).into_owned())
            .collect()
    }

    pub fn has(&self, item: &[u8]) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    pub fn has_string(&self, item: &str) -> bool {
        self.has(item.as_bytes())
    }

    /// Items added locally but not yet sent.
    pub fn pending_adds(&self) -> &[Vec<u8>] {
        &self.adds
    }

    /// Items removed locally but not yet sent.
    pub fn pending_removes(&self) -> &[Vec<u8>] {
        &self.removes
    }

    /// Add an item. Empty items and items already present are ignored.
    pub fn add(&mut self, item: impl Into<Vec<u8>>) -> &mut Self {
        let item = item.into();
        if item.is_empty() || self.has(&item) {
            return self;
        }

        self.removes.retain(|removed| *removed != item);
        self.items.push(item.clone());
        self.adds.push(item);
        self
    }

    /// Remove an item. The removal is sent even if the item is not known locally.
    pub fn remove(&mut self, item: impl Into<Vec<u8>>) -> &mut Self {
        let item = item.into();
        self.items.retain(|existing| *existing != item);
        self.adds.retain(|added| *added != item);
        self.removes.push(item);
        self
    }

    pub fn add_string(&mut self, item: &str) -> &mut Self {
        self.add(item.as_bytes())
    }

    pub fn remove_string(&mut self, item: &str) -> &mut Self {
        self.remove(item.as_bytes())
    }

    /// Send the pending adds and removes, then replace the items with the server's.
    pub fn exec(&mut self, session: &Session) -> Result<()> {
        self.binding.validate(HandleKind::Set)?;

        let response = session.update_map(UpdateMap {
            location: self.binding.location().clone(),
            operation: self.binding.operation(|name, node| self.write_pending(name, node)),
            context: self.binding.context_for_update(),
            return_body: true,
            options: WriteOptions::default(),
        })?;

        if let Some(map) = response.map.as_ref().and_then(|map| self.binding.map_in(map)) {
            self.items = stored_items(map, &self.binding.name);
        }
        if !response.context.is_empty() {
            self.binding.context = response.context;
        }

        debug!(
            path = %self.binding.path,
            name = %self.binding.name,
            added = self.adds.len(),
            removed = self.removes.len(),
            "Executed set"
        );

        self.adds.clear();
        self.removes.clear();
        Ok(())
    }
}

/// Members of the Set `name` without the placeholder.
fn stored_items(map: &MapValue, name: &str) -> Vec<Vec<u8>> {
    map.sets
        .get(name)
        .map(|members| {
            members
                .iter()
                .filter(|member| member.as_slice() != SET_PLACEHOLDER)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

impl Handle for Set {
    const KIND: HandleKind = HandleKind::Set;

    fn bound(binding: Binding) -> Self {
        Self {
            binding,
            ..Self::default()
        }
    }

    fn load(binding: Binding, map: &MapValue) -> Self {
        let items = stored_items(map, &binding.name);
        Self {
            binding,
            items,
            ..Self::default()
        }
    }

    fn placeholder(name: &str, node: &mut OperationNode) {
        node.add_to_set(name, SET_PLACEHOLDER);
    }

    fn write_pending(&self, name: &str, node: &mut OperationNode) {
        for item in &self.adds {
            node.add_to_set(name, item.as_slice());
        }
        for item in &self.removes {
            node.remove_from_set(name, item.as_slice());
        }
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn exec(&mut self, session: &Session) -> Result<()> {
        Set::exec(self, session)
    }
}

/// Serialized as the list of items, each a byte string.
impl Serialize for Set {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter().map(|item| serde_bytes::Bytes::new(item)))
    }
}

impl<'de> Deserialize<'de> for Set {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<ByteBuf>::deserialize(deserializer)?;
        Ok(Self {
            items: items.into_iter().map(ByteBuf::into_vec).collect(),
            ..Self::default()
        })
    }
}
