//! Binary timestamp layout for `DateTime<Utc>` Registers.
//!
//! Timestamps are stored in the layout Go's `time.Time.MarshalBinary` produces, so
//! documents can be shared with Go clients:
//!
//! | bytes | content |
//! |---|---|
//! | 1 | version (`1`) |
//! | 8 | seconds since 0001-01-01T00:00:00Z, big-endian |
//! | 4 | nanoseconds, big-endian |
//! | 2 | zone offset in minutes, `-1` for UTC |
//!
//! Version 2 adds a trailing byte with offset seconds; it is accepted on read.
//! The offset only affects presentation, so decoding always yields UTC.

use chrono::{DateTime, Utc};

use crate::constants::{TIMESTAMP_LEN, TIMESTAMP_VERSION, UNIX_TO_INTERNAL_SECONDS, UTC_OFFSET_MARKER};

const TIMESTAMP_VERSION_WITH_SECONDS: u8 = 2;

/// Encode a UTC timestamp.
pub fn to_binary(value: &DateTime<Utc>) -> Vec<u8> {
    let seconds = value.timestamp() + UNIX_TO_INTERNAL_SECONDS;
    let nanos = value.timestamp_subsec_nanos();

    let mut bytes = Vec::with_capacity(TIMESTAMP_LEN);
    bytes.push(TIMESTAMP_VERSION);
    bytes.extend_from_slice(&seconds.to_be_bytes());
    bytes.extend_from_slice(&nanos.to_be_bytes());
    bytes.extend_from_slice(&UTC_OFFSET_MARKER.to_be_bytes());
    bytes
}

/// Decode a timestamp, returning why the bytes were rejected on failure.
pub fn from_binary(bytes: &[u8]) -> std::result::Result<DateTime<Utc>, String> {
    let Some((&version, rest)) = bytes.split_first() else {
        return Err("no data".to_string());
    };

    let expected_len = match version {
        TIMESTAMP_VERSION => TIMESTAMP_LEN,
        TIMESTAMP_VERSION_WITH_SECONDS => TIMESTAMP_LEN + 1,
        other => return Err(format!("unsupported version {other}")),
    };
    if bytes.len() != expected_len {
        return Err(format!("expected {expected_len} bytes, found {}", bytes.len()));
    }

    let (seconds, rest) = rest.split_at(8);
    let (nanos, _offset) = rest.split_at(4);

    let mut seconds_buf = [0u8; 8];
    seconds_buf.copy_from_slice(seconds);
    let mut nanos_buf = [0u8; 4];
    nanos_buf.copy_from_slice(nanos);

    let seconds = i64::from_be_bytes(seconds_buf)
        .checked_sub(UNIX_TO_INTERNAL_SECONDS)
        .ok_or_else(|| "timestamp out of range".to_string())?;
    let nanos = u32::from_be_bytes(nanos_buf);

    DateTime::from_timestamp(seconds, nanos).ok_or_else(|| "timestamp out of range".to_string())
}
