use tracing::debug;

use crate::Result;
use crate::codec::{MapDocument, decode_document};
use crate::command::{Bucket, ClientError, Outcome, RequestKind};
use crate::path::PathKey;
use crate::session::Session;
use crate::transport::{FetchMap, ReadOptions};

/// Fetches a document and decodes it into a struct. Created by [`Bucket::get`].
///
/// Fields missing from the stored Map keep their current value. Handle slots are
/// always filled with handles bound to the fetched document.
pub struct GetCommand<'b, T> {
    bucket: &'b Bucket,
    key: String,
    output: &'b mut T,
    options: ReadOptions,
}

impl<'b, T: MapDocument> GetCommand<'b, T> {
    pub(crate) fn new(bucket: &'b Bucket, key: String, output: &'b mut T) -> Self {
        Self {
            bucket,
            key,
            output,
            options: ReadOptions::default(),
        }
    }

    pub fn with_pr(mut self, pr: u32) -> Self {
        self.options.pr = Some(pr);
        self
    }

    pub fn with_r(mut self, r: u32) -> Self {
        self.options.r = Some(r);
        self
    }

    /// Fetch and decode. Fails with [`ClientError::NotFound`] if nothing is stored.
    pub fn run(self, session: &Session) -> Result<Outcome> {
        let Self {
            bucket,
            key,
            output,
            options,
        } = self;

        if key.is_empty() {
            return Err(ClientError::MissingKey {
                operation: "get".to_string(),
            }
            .into());
        }

        let root = PathKey::root(bucket.location(key.as_str()));
        let mut exec = || -> Result<Outcome> {
            let response = session.fetch_map(FetchMap {
                location: root.location.clone(),
                options,
            })?;

            if response.not_found {
                return Err(ClientError::NotFound {
                    bucket: root.location.bucket.clone(),
                    bucket_type: root.location.bucket_type.clone(),
                    key: root.location.key.clone(),
                }
                .into());
            }

            decode_document(&response, &mut *output, &root)?;
            debug!(location = %root.location, "Fetched document");

            Ok(Outcome {
                key: root.location.key.clone(),
                context: response.context,
            })
        };

        bucket.run(&key, RequestKind::Get, &mut exec)
    }
}
