//! Path based include/exclude filtering of leaf operations.
//!
//! A [`FieldFilter`] decides, for each register, counter, set and flag operation in an
//! [`OperationNode`], whether it is sent. Patterns are field paths from the document
//! root; a pattern matches every path it is a prefix of. When both an include and an
//! exclude pattern match, the longer (more specific) one wins, with ties going to the
//! include.

use tracing::trace;

use crate::operation::OperationNode;
use crate::transport::MapOperation;

/// Include/exclude path patterns applied before an update is sent.
///
/// # Examples
///
/// ```
/// use riakmap::FieldFilter;
///
/// let filter = FieldFilter::new().include(["A"]).exclude(["A", "B"]);
///
/// assert!(filter.allows(&["A", "C"]));
/// assert!(!filter.allows(&["A", "B"]));
/// assert!(!filter.allows(&["B"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    include: Vec<Vec<String>>,
    exclude: Vec<Vec<String>>,
}

impl FieldFilter {
    /// Create a filter that allows everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern. An empty pattern includes the whole document.
    pub fn include<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.push(path.into_iter().map(Into::into).collect());
        self
    }

    /// Add an exclude pattern. An empty pattern excludes the whole document.
    pub fn exclude<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.push(path.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if no pattern has been added.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Decide whether an operation on the field at `path` is sent.
    pub fn allows<S: AsRef<str>>(&self, path: &[S]) -> bool {
        if self.is_empty() {
            return true;
        }

        let included = longest_match(&self.include, path);
        let excluded = longest_match(&self.exclude, path);

        match (included, excluded) {
            (Some(include_depth), Some(exclude_depth)) => include_depth >= exclude_depth,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => self.include.is_empty(),
        }
    }

    /// Flatten an operation tree into the wire operation, dropping denied leaf operations.
    ///
    /// Nested maps are always traversed and emitted, even when every operation inside
    /// them was filtered out.
    pub fn apply(&self, node: &OperationNode) -> MapOperation {
        let mut path = Vec::new();
        self.apply_at(node, &mut path)
    }

    fn apply_at(&self, node: &OperationNode, path: &mut Vec<String>) -> MapOperation {
        let mut op = MapOperation::default();

        for (name, value) in node.registers() {
            if self.allows_field(path, name) {
                op.registers.insert(name.to_string(), value.to_vec());
            }
        }
        for (name, increment) in node.counters() {
            if self.allows_field(path, name) {
                op.counters.insert(name.to_string(), increment);
            }
        }
        for (name, members) in node.all_set_adds() {
            if self.allows_field(path, name) {
                op.set_adds.insert(name.to_string(), members.to_vec());
            }
        }
        for (name, members) in node.all_set_removes() {
            if self.allows_field(path, name) {
                op.set_removes.insert(name.to_string(), members.to_vec());
            }
        }
        for (name, value) in node.flags() {
            if self.allows_field(path, name) {
                op.flags.insert(name.to_string(), value);
            }
        }

        for (name, child) in node.children() {
            path.push(name.to_string());
            let child_op = self.apply_at(child, path);
            path.pop();
            op.maps.insert(name.to_string(), child_op);
        }

        op
    }

    fn allows_field(&self, path: &mut Vec<String>, name: &str) -> bool {
        path.push(name.to_string());
        let allowed = self.allows(path.as_slice());
        if !allowed {
            trace!(path = ?path, "Filtered out field operation");
        }
        path.pop();
        allowed
    }
}

/// Length of the longest pattern that is a prefix of `path`.
fn longest_match<S: AsRef<str>>(patterns: &[Vec<String>], path: &[S]) -> Option<usize> {
    patterns
        .iter()
        .filter(|pattern| {
            pattern.len() <= path.len()
                && pattern
                    .iter()
                    .zip(path)
                    .all(|(expected, actual)| expected == actual.as_ref())
        })
        .map(Vec::len)
        .max()
}

impl From<&OperationNode> for MapOperation {
    fn from(node: &OperationNode) -> Self {
        FieldFilter::new().apply(node)
    }
}
