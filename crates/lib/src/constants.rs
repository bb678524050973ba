//! Constants used throughout the riakmap library.
//!
//! This module provides central definitions for reserved values that are shared
//! between the encoder, the decoder and the handle types.

/// Member written to a Set to make the server create an otherwise empty Set.
///
/// Decoded Sets drop zero-length members, so the placeholder never reaches user code.
pub const SET_PLACEHOLDER: &[u8] = b"";

/// Version byte leading every binary timestamp Register.
pub const TIMESTAMP_VERSION: u8 = 1;

/// Length in bytes of a binary timestamp Register.
pub const TIMESTAMP_LEN: usize = 15;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
pub const UNIX_TO_INTERNAL_SECONDS: i64 = 62_135_596_800;

/// Offset (in minutes) written for timestamps in UTC.
pub const UTC_OFFSET_MARKER: i16 = -1;
