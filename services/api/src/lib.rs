//! services/api/src/lib.rs
//!
//! Library surface for the `api` service, shared by the binaries and the
//! integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod sweep;
pub mod web;
