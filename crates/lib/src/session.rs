//! Shared access to a transport.

use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::config::SessionConfig;
use crate::transport::{
    Command, Delete, FetchMap, FetchMapResponse, Response, Transport, TransportError, UpdateMap,
    UpdateMapResponse,
};

/// A transport plus the defaults applied to every command sent through it.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    config: SessionConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with default options.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Create a session over a transport that is shared elsewhere.
    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: SessionConfig::default(),
        }
    }

    /// Replace the default options.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send a command as is.
    pub fn execute(&self, command: Command) -> Result<Response> {
        let kind = command.kind();
        let location = command.location().clone();
        let response = self.transport.execute(command)?;
        debug!(command = kind, location = %location, "Executed command");
        Ok(response)
    }

    pub(crate) fn fetch_map(&self, mut command: FetchMap) -> Result<FetchMapResponse> {
        command.options = command.options.or(&self.config.read);
        match self.execute(Command::FetchMap(command))? {
            Response::FetchMap(response) => Ok(response),
            other => Err(unexpected("fetch_map", &other)),
        }
    }

    pub(crate) fn update_map(&self, mut command: UpdateMap) -> Result<UpdateMapResponse> {
        command.options = command.options.or(&self.config.write);
        match self.execute(Command::UpdateMap(command))? {
            Response::UpdateMap(response) => Ok(response),
            other => Err(unexpected("update_map", &other)),
        }
    }

    pub(crate) fn delete(&self, mut command: Delete) -> Result<()> {
        command.options = command.options.or(&self.config.write);
        match self.execute(Command::Delete(command))? {
            Response::Delete => Ok(()),
            other => Err(unexpected("delete", &other)),
        }
    }
}

fn unexpected(expected: &str, actual: &Response) -> crate::Error {
    TransportError::UnexpectedResponse {
        expected: expected.to_string(),
        actual: actual.kind().to_string(),
    }
    .into()
}
