use std::sync::Arc;

use riakmap::transport::{FetchMapResponse, InMemoryTransport, MapValue, Transport};
use riakmap::{Bucket, Location, Session};

pub const BUCKET: &str = "documents";
pub const BUCKET_TYPE: &str = "maps";

/// A session over a fresh in-memory store, plus the store for inspection.
pub fn test_session() -> (Session, Arc<InMemoryTransport>) {
    let transport = Arc::new(InMemoryTransport::new());
    let session = Session::from_arc(transport.clone() as Arc<dyn Transport>);
    (session, transport)
}

pub fn test_bucket() -> Bucket {
    Bucket::new(BUCKET, BUCKET_TYPE)
}

pub fn location(key: &str) -> Location {
    Location::new(BUCKET, BUCKET_TYPE, key)
}

/// The Map stored at `key`, panicking if there is none.
pub fn stored(transport: &InMemoryTransport, key: &str) -> MapValue {
    transport
        .stored(&location(key))
        .unwrap_or_else(|| panic!("no document stored at {key}"))
}

/// A fetch response wrapping `map`, for decoding without a round trip.
pub fn fetched(map: MapValue, context: &[u8]) -> FetchMapResponse {
    FetchMapResponse {
        map,
        context: context.to_vec(),
        not_found: false,
    }
}
