//! Document locations and paths.
//!
//! A [`Location`] names a stored document (bucket type, bucket and key). A [`PathKey`]
//! extends it with the chain of Map field names leading from the document root to a
//! nested Map, which is what handles need to route their updates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bucket type, bucket and key of a stored document.
///
/// An empty key asks the server to generate one on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub bucket: String,
    pub bucket_type: String,
    pub key: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(
        bucket: impl Into<String>,
        bucket_type: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_type: bucket_type.into(),
            key: key.into(),
        }
    }

    /// Returns true if bucket, bucket type and key are all set.
    pub fn is_complete(&self) -> bool {
        !self.bucket.is_empty() && !self.bucket_type.is_empty() && !self.key.is_empty()
    }

    /// Returns a copy of this location with a different key.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bucket_type, self.bucket, self.key)
    }
}

/// Where a value lives: a document location plus the Map field names from the root.
///
/// Empty segments refer to the document root. Each handle gets its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathKey {
    pub location: Location,
    pub segments: Vec<String>,
}

impl PathKey {
    /// The root of the document at `location`.
    pub fn root(location: Location) -> Self {
        Self {
            location,
            segments: Vec::new(),
        }
    }

    /// Returns true if this path points at the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path one Map deeper.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self {
            location: self.location.clone(),
            segments,
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
