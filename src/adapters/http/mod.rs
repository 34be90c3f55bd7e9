//! HTTP adapters - REST API implementations.

pub mod billing;
