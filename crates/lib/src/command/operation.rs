use crate::Result;
use crate::command::{Bucket, Outcome, RequestKind};
use crate::operation::OperationNode;
use crate::session::Session;
use crate::transport::{MapOperation, UpdateMap, WriteOptions};

/// Sends a hand-built [`OperationNode`] unfiltered. Created by [`Bucket::map_operation`].
pub struct MapOperationCommand<'b> {
    bucket: &'b Bucket,
    operation: OperationNode,
    key: String,
    context: Option<Vec<u8>>,
    options: WriteOptions,
}

impl<'b> MapOperationCommand<'b> {
    pub(crate) fn new(bucket: &'b Bucket, operation: OperationNode) -> Self {
        Self {
            bucket,
            operation,
            key: String::new(),
            context: None,
            options: WriteOptions::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Causal context from an earlier fetch. Needed to remove Set members.
    pub fn context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_w(mut self, w: u32) -> Self {
        self.options.w = Some(w);
        self
    }

    pub fn run(self, session: &Session) -> Result<Outcome> {
        let location = self.bucket.location(self.key.as_str());
        let operation = MapOperation::from(&self.operation);
        let context = self.context;
        let options = self.options;

        let mut exec = || -> Result<Outcome> {
            let response = session.update_map(UpdateMap {
                location: location.clone(),
                operation: operation.clone(),
                context: context.clone(),
                return_body: false,
                options,
            })?;
            Ok(Outcome {
                key: response
                    .generated_key
                    .unwrap_or_else(|| location.key.clone()),
                context: response.context,
            })
        };

        self.bucket.run(&self.key, RequestKind::MapOperation, &mut exec)
    }
}
