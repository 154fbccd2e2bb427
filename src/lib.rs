//! # Token Relay Library
//!
//! Client-side HTTP request layer that transparently manages a
//! short-lived access credential: decorates outgoing requests, detects
//! credential expiry, performs a single de-duplicated renewal exchange,
//! and replays every request that was blocked waiting for it.
//!
//! Modules:
//! - `config` — client configuration and YAML loader
//! - `credentials` — credential pair, JWT claims, credential store
//! - `persistence` — key-value storage capability with per-entry expiry
//! - `transport` — request descriptors, decoration, HTTP transport
//! - `refresh` — renewal executor and the refresh coordinator
//! - `session` — session events and invalidation

pub mod config;
pub mod credentials;
pub mod persistence;
pub mod transport;
pub mod refresh;
pub mod session;
pub mod client;
pub mod error;
pub mod tests;
pub mod observability;
pub mod helpers;
pub mod utils;


pub use crate::client::ApiClient;
pub use crate::config::settings::ClientConfig;
pub use crate::credentials::claims::Claims;
pub use crate::credentials::store::CredentialStore;
pub use crate::credentials::token::CredentialPair;
pub use crate::error::{ClientError, RenewalError, TransportError};
pub use crate::persistence::memory::MemoryStore;
pub use crate::session::events::{EndReason, SessionEvent};
pub use crate::transport::descriptor::RequestDescriptor;
