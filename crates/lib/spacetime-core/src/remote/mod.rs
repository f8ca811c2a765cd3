//! Remote database access.

pub mod http;

pub use http::{HttpRemote, RemoteConfig, RemoteError, RemoteResponse, RemoteResult};
