//! The in-memory operation tree built by the encoder.
//!
//! An [`OperationNode`] mirrors the structure of a Riak Map: every node collects the
//! register writes, counter increments, set changes and flag writes for one Map, plus
//! a child node per nested Map. It is pure data and performs no I/O.
//!
//! Callers can also build trees by hand and send them with
//! [`Bucket::map_operation`](crate::command::Bucket::map_operation).

use std::collections::BTreeMap;

/// Pending updates for one Riak Map and its nested Maps.
///
/// Ordered maps keep the flattened wire operation deterministic across encodes.
///
/// # Examples
///
/// ```
/// use riakmap::OperationNode;
///
/// let mut op = OperationNode::new();
/// op.set_register("name", "Alice");
/// op.increment_counter("visits", 2);
/// op.map("profile").set_flag("verified", true);
///
/// assert_eq!(op.register("name"), Some(&b"Alice"[..]));
/// assert_eq!(op.child("profile").and_then(|p| p.flag("verified")), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationNode {
    registers: BTreeMap<String, Vec<u8>>,
    counters: BTreeMap<String, i64>,
    set_adds: BTreeMap<String, Vec<Vec<u8>>>,
    set_removes: BTreeMap<String, Vec<Vec<u8>>>,
    flags: BTreeMap<String, bool>,
    maps: BTreeMap<String, OperationNode>,
}

impl OperationNode {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a Register, replacing any earlier write to the same name.
    pub fn set_register(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> &mut Self {
        let name = name.into();
        debug_assert!(
            !self.set_adds.contains_key(&name),
            "'{name}' is already a Set in this Map"
        );
        self.registers.insert(name, value.into());
        self
    }

    /// Increment a Counter. Increments to the same name accumulate.
    pub fn increment_counter(&mut self, name: impl Into<String>, increment: i64) -> &mut Self {
        *self.counters.entry(name.into()).or_insert(0) += increment;
        self
    }

    /// Add a member to a Set. A member already pending for that Set is not added twice.
    pub fn add_to_set(&mut self, name: impl Into<String>, member: impl Into<Vec<u8>>) -> &mut Self {
        let name = name.into();
        debug_assert!(
            !self.registers.contains_key(&name),
            "'{name}' is already a Register in this Map"
        );
        let member = member.into();
        let adds = self.set_adds.entry(name).or_default();
        if !adds.contains(&member) {
            adds.push(member);
        }
        self
    }

    /// Remove a member from a Set.
    pub fn remove_from_set(
        &mut self,
        name: impl Into<String>,
        member: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.set_removes
            .entry(name.into())
            .or_default()
            .push(member.into());
        self
    }

    /// Write a Flag, replacing any earlier write to the same name.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Get the child node for a nested Map, creating it if needed.
    pub fn map(&mut self, name: impl Into<String>) -> &mut OperationNode {
        self.maps.entry(name.into()).or_default()
    }

    /// Walk (and create) child nodes along `segments`.
    pub fn at_path_mut<S: AsRef<str>>(&mut self, segments: &[S]) -> &mut OperationNode {
        segments
            .iter()
            .fold(self, |node, segment| node.map(segment.as_ref()))
    }

    /// Get the pending write for a Register.
    pub fn register(&self, name: &str) -> Option<&[u8]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    /// Get the accumulated increment for a Counter.
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Get the pending adds for a Set.
    pub fn set_adds(&self, name: &str) -> Option<&[Vec<u8>]> {
        self.set_adds.get(name).map(Vec::as_slice)
    }

    /// Get the pending removes for a Set.
    pub fn set_removes(&self, name: &str) -> Option<&[Vec<u8>]> {
        self.set_removes.get(name).map(Vec::as_slice)
    }

    /// Get the pending write for a Flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    /// Get an existing child node.
    pub fn child(&self, name: &str) -> Option<&OperationNode> {
        self.maps.get(name)
    }

    /// Iterate over all Register writes.
    pub fn registers(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.registers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_slice()))
    }

    /// Iterate over all Counter increments.
    pub fn counters(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Iterate over all Set adds, grouped by Set.
    pub fn all_set_adds(&self) -> impl Iterator<Item = (&str, &[Vec<u8>])> {
        self.set_adds
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Iterate over all Set removes, grouped by Set.
    pub fn all_set_removes(&self) -> impl Iterator<Item = (&str, &[Vec<u8>])> {
        self.set_removes
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Iterate over all Flag writes.
    pub fn flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Iterate over all child nodes.
    pub fn children(&self) -> impl Iterator<Item = (&str, &OperationNode)> {
        self.maps.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Returns true if neither this node nor any child holds an operation.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
            && self.counters.is_empty()
            && self.set_adds.is_empty()
            && self.set_removes.is_empty()
            && self.flags.is_empty()
            && self.maps.values().all(OperationNode::is_empty)
    }
}
