//! Caller-supplied wrappers around command execution.
//!
//! Middleware is fixed when a [`Bucket`](crate::Bucket) is created and runs in
//! registration order around every command of that bucket. Each middleware receives
//! the [`Request`] and a [`Next`] continuation; it may inspect the request, call
//! `next.run()` and look at the outcome, or return without calling it.
//!
//! ```
//! use std::sync::Arc;
//! use riakmap::Bucket;
//! use riakmap::command::{Middleware, Next, Request};
//!
//! let log: Middleware = Arc::new(|request: &Request, next: Next<'_>| {
//!     let outcome = next.run()?;
//!     println!("{:?} {} -> {}", request.kind, request.bucket, outcome.key);
//!     Ok(outcome)
//! });
//!
//! let bucket = Bucket::with_middleware("users", "maps", vec![log]);
//! ```

use std::sync::Arc;

use crate::Result;
use crate::command::Outcome;

/// A wrapper around command execution.
pub type Middleware = Arc<dyn Fn(&Request, Next<'_>) -> Result<Outcome> + Send + Sync>;

/// The command kinds middleware can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get,
    Set,
    MapOperation,
    Delete,
}

/// What a command is about to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub bucket: String,
    pub bucket_type: String,
    /// Empty when the server will generate the key
    pub key: String,
    pub kind: RequestKind,
}

/// The rest of the chain, ending in the command itself.
pub struct Next<'a> {
    rest: &'a [Middleware],
    request: &'a Request,
    exec: &'a mut dyn FnMut() -> Result<Outcome>,
}

impl Next<'_> {
    /// Run the remaining middleware and the command.
    pub fn run(self) -> Result<Outcome> {
        run_chain(self.rest, self.request, self.exec)
    }
}

pub(crate) fn run_chain<'a>(
    chain: &'a [Middleware],
    request: &'a Request,
    exec: &'a mut dyn FnMut() -> Result<Outcome>,
) -> Result<Outcome> {
    match chain.split_first() {
        None => exec(),
        Some((first, rest)) => (first.as_ref())(
            request,
            Next {
                rest,
                request,
                exec,
            },
        ),
    }
}
