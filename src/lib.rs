//! CoveTalks - Billing backend for the speaker marketplace
//!
//! This crate implements subscription reconciliation between the billing
//! provider and locally persisted account, subscription, and payment
//! records, exposed over a small HTTP API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
