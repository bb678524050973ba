//! Handles for the Riak CRDTs inside a stored document.
//!
//! A handle field (`Option<Counter>`, `Option<Set>`, `Option<Flag>`,
//! `Option<Register>`) remembers where it lives: the document location, the Map path
//! and its field name. Local changes can then be sent on their own with `exec`,
//! without encoding the rest of the document.
//!
//! Handles are bound by [`Bucket::get`](crate::Bucket::get) and by
//! [`Bucket::set`](crate::Bucket::set), which fills empty slots. Handles created with
//! `new()` are unbound and can only be sent as part of a document.
//!
//! ```
//! use riakmap::{Bucket, Counter, HandleSlot, MapDocument, Session};
//! use riakmap::transport::InMemoryTransport;
//!
//! #[derive(MapDocument, Default)]
//! struct Article {
//!     title: String,
//!     views: Option<Counter>,
//! }
//!
//! let session = Session::new(InMemoryTransport::new());
//! let bucket = Bucket::new("articles", "maps");
//!
//! let mut article = Article { title: "Hello".into(), views: None };
//! bucket.set(&mut article).key("hello").run(&session).unwrap();
//!
//! article.views.handle_mut().unwrap().increase(1);
//! article.views.exec(&session).unwrap();
//! assert_eq!(article.views.handle().unwrap().value(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::operation::OperationNode;
use crate::path::{Location, PathKey};
use crate::session::Session;
use crate::transport::{MapOperation, MapValue};

mod counter;
mod errors;
mod flag;
mod register;
mod set;

pub use counter::Counter;
pub use errors::HandleError;
pub use flag::Flag;
pub use register::Register;
pub use set::Set;

/// The CRDT a handle manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Counter,
    Set,
    Flag,
    Register,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandleKind::Counter => "Counter",
            HandleKind::Set => "Set",
            HandleKind::Flag => "Flag",
            HandleKind::Register => "Register",
        };
        f.write_str(name)
    }
}

/// Where a handle's CRDT lives: the Map path, the field name and the causal context
/// of the fetch that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub path: PathKey,
    /// Field name inside the Map at `path`; empty for an unbound handle
    pub name: String,
    pub context: Vec<u8>,
}

impl Binding {
    pub fn new(path: PathKey, name: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<u8>) -> Self {
        self.context = context;
        self
    }

    /// Returns true if the handle knows its field.
    pub fn is_bound(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn location(&self) -> &Location {
        &self.path.location
    }

    /// Check that a handle of `kind` can be sent.
    pub fn validate(&self, kind: HandleKind) -> Result<()> {
        if !self.is_bound() {
            return Err(HandleError::UnboundHandle { kind }.into());
        }
        if !self.path.location.is_complete() {
            return Err(HandleError::InvalidKey {
                kind,
                location: self.path.location.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Wrap the operations `write` produces for this field's Map into a document update.
    pub(crate) fn operation<F>(&self, write: F) -> MapOperation
    where
        F: FnOnce(&str, &mut OperationNode),
    {
        let mut root = OperationNode::new();
        write(&self.name, root.at_path_mut(&self.path.segments));
        MapOperation::from(&root)
    }

    /// The context to send, `None` if the handle never saw one.
    pub(crate) fn context_for_update(&self) -> Option<Vec<u8>> {
        (!self.context.is_empty()).then(|| self.context.clone())
    }

    /// The Map holding this field inside a returned document.
    pub(crate) fn map_in<'m>(&self, document: &'m MapValue) -> Option<&'m MapValue> {
        document.at_path(&self.path.segments)
    }
}

/// A CRDT handle stored in an `Option` slot of a document.
pub trait Handle: Sized {
    const KIND: HandleKind;

    /// A fresh handle bound to `binding`, as created for an empty slot.
    fn bound(binding: Binding) -> Self;

    /// A handle bound to `binding`, holding the value found in `map`.
    fn load(binding: Binding, map: &MapValue) -> Self;

    /// Operation emitted for an empty slot so the CRDT exists on the server.
    fn placeholder(name: &str, node: &mut OperationNode);

    /// Operation emitted for a filled slot.
    fn write_pending(&self, name: &str, node: &mut OperationNode);

    fn binding(&self) -> &Binding;

    /// Send the pending changes to the handle's document.
    fn exec(&mut self, session: &Session) -> Result<()>;
}

/// Access to the handle in an `Option` slot.
///
/// Every method fails with [`HandleError::NilHandle`] when the slot is `None`.
pub trait HandleSlot<H: Handle> {
    fn handle(&self) -> Result<&H>;

    fn handle_mut(&mut self) -> Result<&mut H>;

    /// Send the pending changes of the handle in this slot.
    fn exec(&mut self, session: &Session) -> Result<()>;
}

impl<H: Handle> HandleSlot<H> for Option<H> {
    fn handle(&self) -> Result<&H> {
        self.as_ref()
            .ok_or_else(|| HandleError::NilHandle { kind: H::KIND }.into())
    }

    fn handle_mut(&mut self) -> Result<&mut H> {
        self.as_mut()
            .ok_or_else(|| HandleError::NilHandle { kind: H::KIND }.into())
    }

    fn exec(&mut self, session: &Session) -> Result<()> {
        self.handle_mut()?.exec(session)
    }
}
