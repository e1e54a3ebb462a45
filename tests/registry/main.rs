//! Store registry integration tests.

mod support;
mod bootstrap;
mod events;
mod sync;

#[cfg(feature = "http")]
mod http;
