/*!
 * Integration tests for riakmap.
 *
 * All integration tests are compiled into this single binary. Each module covers one
 * area of the public API and runs against the in-memory transport:
 *
 * - `codec`: struct encoding and decoding for every supported field kind
 * - `filter`: include/exclude filters applied through `Bucket::set`
 * - `handle`: counter, set, flag and register handles
 * - `command`: the query builder, middleware and error paths
 * - `transport`: session configuration and the in-memory store
 *
 * Run with `RUST_LOG=riakmap=debug` to see the encoder and command logs.
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("riakmap=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod command;
mod filter;
mod handle;
mod helpers;
mod transport;
