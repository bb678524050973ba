use crate::Result;
use crate::command::{Bucket, ClientError, Outcome, RequestKind};
use crate::session::Session;
use crate::transport::{Delete, WriteOptions};

/// Deletes an object. Created by [`Bucket::delete`].
pub struct DeleteCommand<'b> {
    bucket: &'b Bucket,
    key: String,
    options: WriteOptions,
}

impl<'b> DeleteCommand<'b> {
    pub(crate) fn new(bucket: &'b Bucket, key: String) -> Self {
        Self {
            bucket,
            key,
            options: WriteOptions::default(),
        }
    }

    pub fn with_w(mut self, w: u32) -> Self {
        self.options.w = Some(w);
        self
    }

    pub fn with_pw(mut self, pw: u32) -> Self {
        self.options.pw = Some(pw);
        self
    }

    pub fn run(self, session: &Session) -> Result<Outcome> {
        if self.key.is_empty() {
            return Err(ClientError::MissingKey {
                operation: "delete".to_string(),
            }
            .into());
        }

        let location = self.bucket.location(self.key.as_str());
        let options = self.options;
        let mut exec = || -> Result<Outcome> {
            session.delete(Delete {
                location: location.clone(),
                options,
            })?;
            Ok(Outcome {
                key: location.key.clone(),
                context: Vec::new(),
            })
        };

        self.bucket.run(&self.key, RequestKind::Delete, &mut exec)
    }
}
