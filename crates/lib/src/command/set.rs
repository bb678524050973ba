use tracing::debug;

use crate::Result;
use crate::codec::{MapDocument, encode_document, encode_document_mut};
use crate::command::{Bucket, Outcome, RequestKind};
use crate::filter::FieldFilter;
use crate::path::PathKey;
use crate::session::Session;
use crate::transport::{UpdateMap, WriteOptions};

enum Input<'b, T> {
    Shared(&'b T),
    Exclusive(&'b mut T),
}

/// Encodes a struct and stores it. Created by [`Bucket::set`] and [`Bucket::set_value`].
///
/// Without a key the server generates one, returned in [`Outcome::key`]. Handles bound
/// by such a set have no key and cannot `exec` until the document is fetched again.
///
/// Pending changes on filled handle slots are sent with the document but stay pending
/// on the handles. A later `exec` on such a handle sends the same changes again.
pub struct SetCommand<'b, T> {
    bucket: &'b Bucket,
    input: Input<'b, T>,
    key: String,
    filter: FieldFilter,
    options: WriteOptions,
}

impl<'b, T: MapDocument> SetCommand<'b, T> {
    pub(crate) fn exclusive(bucket: &'b Bucket, input: &'b mut T) -> Self {
        Self::with_input(bucket, Input::Exclusive(input))
    }

    pub(crate) fn shared(bucket: &'b Bucket, input: &'b T) -> Self {
        Self::with_input(bucket, Input::Shared(input))
    }

    fn with_input(bucket: &'b Bucket, input: Input<'b, T>) -> Self {
        Self {
            bucket,
            input,
            key: String::new(),
            filter: FieldFilter::new(),
            options: WriteOptions::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Only send fields below `path` (and fields no include pattern covers, if an
    /// exclude pattern is more specific). An empty path includes the whole document.
    pub fn filter_include<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.include(path);
        self
    }

    /// Do not send fields below `path`. The longer of two matching patterns wins.
    pub fn filter_exclude<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.exclude(path);
        self
    }

    pub fn with_pw(mut self, pw: u32) -> Self {
        self.options.pw = Some(pw);
        self
    }

    pub fn with_dw(mut self, dw: u32) -> Self {
        self.options.dw = Some(dw);
        self
    }

    pub fn with_w(mut self, w: u32) -> Self {
        self.options.w = Some(w);
        self
    }

    /// Encode, filter and send the document.
    pub fn run(self, session: &Session) -> Result<Outcome> {
        let Self {
            bucket,
            mut input,
            key,
            filter,
            options,
        } = self;

        let root = PathKey::root(bucket.location(key.as_str()));
        let mut exec = || -> Result<Outcome> {
            let encoded = match &mut input {
                Input::Shared(value) => encode_document(*value, &root)?,
                Input::Exclusive(value) => encode_document_mut(&mut **value, &root)?,
            };
            let operation = filter.apply(&encoded.tree);
            let context = (!encoded.context.is_empty()).then_some(encoded.context);

            let response = session.update_map(UpdateMap {
                location: root.location.clone(),
                operation,
                context,
                return_body: false,
                options,
            })?;

            let key = response
                .generated_key
                .unwrap_or_else(|| root.location.key.clone());
            debug!(bucket = %root.location.bucket, key = %key, "Stored document");

            Ok(Outcome {
                key,
                context: response.context,
            })
        };

        bucket.run(&key, RequestKind::Set, &mut exec)
    }
}
