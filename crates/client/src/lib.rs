//! Client code for shoutout-search.
//!
//! This crate provides the HTTP client for the creator search backend and a
//! connectivity provider that probes it, shared by the server.

pub mod backend;
pub mod probe;

pub use backend::{BackendConfig, BackendError, BackendFuture, HttpBackend, SearchRequest};
pub use probe::ProbeConnectivity;
