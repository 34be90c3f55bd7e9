//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API
//! - `memory` - In-memory repositories (tests, local development)
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe billing provider

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
