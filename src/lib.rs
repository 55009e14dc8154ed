//! Stagno: a self-hosted operations backend for shrimp-pond farms.
//!
//! The core of the system is an auditable, append-only inventory ledger
//! (current quantities are always derived by summation, never stored as
//! mutable counters) and a TTL response cache wrapped around the read API.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
