//! Query builder for documents stored as Riak Maps.
//!
//! A [`Bucket`] names a bucket and bucket type and carries the middleware for its
//! commands. Each command method returns a builder that is executed with `run`:
//!
//! ```
//! use riakmap::{Bucket, MapDocument, Session};
//! use riakmap::transport::InMemoryTransport;
//!
//! #[derive(MapDocument, Default, Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     admin: bool,
//! }
//!
//! let session = Session::new(InMemoryTransport::new());
//! let users = Bucket::new("users", "maps");
//!
//! let alice = User { name: "Alice".into(), admin: true };
//! let outcome = users.set_value(&alice).run(&session).unwrap();
//!
//! let mut fetched = User::default();
//! users.get(outcome.key, &mut fetched).run(&session).unwrap();
//! assert_eq!(fetched, alice);
//! ```

use std::fmt;

use thiserror::Error;

use crate::Result;
use crate::codec::MapDocument;
use crate::operation::OperationNode;
use crate::path::Location;

mod delete;
mod get;
pub mod middleware;
mod operation;
mod set;

pub use delete::DeleteCommand;
pub use get::GetCommand;
pub use middleware::{Middleware, Next, Request, RequestKind};
pub use operation::MapOperationCommand;
pub use set::SetCommand;

/// Result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The document key; the generated key when a set was run without one
    pub key: String,
    /// Causal context returned by the server
    pub context: Vec<u8>,
}

/// A bucket and bucket type, plus the middleware wrapping its commands.
#[derive(Clone, Default)]
pub struct Bucket {
    bucket: String,
    bucket_type: String,
    middleware: Vec<Middleware>,
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("bucket", &self.bucket)
            .field("bucket_type", &self.bucket_type)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl Bucket {
    pub fn new(bucket: impl Into<String>, bucket_type: impl Into<String>) -> Self {
        Self::with_middleware(bucket, bucket_type, Vec::new())
    }

    /// A bucket whose commands run through `middleware`, first element outermost.
    pub fn with_middleware(
        bucket: impl Into<String>,
        bucket_type: impl Into<String>,
        middleware: Vec<Middleware>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_type: bucket_type.into(),
            middleware,
        }
    }

    pub fn name(&self) -> &str {
        &self.bucket
    }

    pub fn bucket_type(&self) -> &str {
        &self.bucket_type
    }

    /// The location of `key` in this bucket.
    pub fn location(&self, key: impl Into<String>) -> Location {
        Location::new(self.bucket.clone(), self.bucket_type.clone(), key)
    }

    /// Fetch the document at `key` into `output`.
    pub fn get<'b, T: MapDocument>(
        &'b self,
        key: impl Into<String>,
        output: &'b mut T,
    ) -> GetCommand<'b, T> {
        GetCommand::new(self, key.into(), output)
    }

    /// Store `input`, filling its empty handle slots with bound handles.
    pub fn set<'b, T: MapDocument>(&'b self, input: &'b mut T) -> SetCommand<'b, T> {
        SetCommand::exclusive(self, input)
    }

    /// Store `input` without modifying it.
    pub fn set_value<'b, T: MapDocument>(&'b self, input: &'b T) -> SetCommand<'b, T> {
        SetCommand::shared(self, input)
    }

    /// Send a hand-built operation tree.
    pub fn map_operation(&self, operation: OperationNode) -> MapOperationCommand<'_> {
        MapOperationCommand::new(self, operation)
    }

    /// Delete the object at `key`.
    pub fn delete(&self, key: impl Into<String>) -> DeleteCommand<'_> {
        DeleteCommand::new(self, key.into())
    }

    fn request(&self, key: &str, kind: RequestKind) -> Request {
        Request {
            bucket: self.bucket.clone(),
            bucket_type: self.bucket_type.clone(),
            key: key.to_string(),
            kind,
        }
    }

    /// Run `exec` inside this bucket's middleware chain.
    fn run(
        &self,
        key: &str,
        kind: RequestKind,
        exec: &mut dyn FnMut() -> Result<Outcome>,
    ) -> Result<Outcome> {
        let request = self.request(key, kind);
        middleware::run_chain(&self.middleware, &request, exec)
    }
}

/// Errors raised by the command builder.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// No document is stored at the key.
    #[error("Not found: {bucket_type}/{bucket}/{key}")]
    NotFound {
        bucket: String,
        bucket_type: String,
        key: String,
    },

    /// The command needs a key but none was given.
    #[error("A key is required for {operation}")]
    MissingKey { operation: String },
}

impl ClientError {
    /// Check if the requested document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Check if a key was missing.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, ClientError::MissingKey { .. })
    }
}

impl From<ClientError> for crate::Error {
    fn from(err: ClientError) -> Self {
        crate::Error::Client(err)
    }
}
