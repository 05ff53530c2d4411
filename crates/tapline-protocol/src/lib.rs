//! # tapline-protocol
//!
//! Communication layer between Tapline and a remote debuggee that exposes its
//! execution state over plain HTTP `GET` requests and JSON responses.
//!
//! This crate provides:
//! - The [`Transport`] abstraction: one request in, one `(content type, body)`
//!   pair or one error out
//! - [`HttpTransport`], the `reqwest`-backed implementation used in production
//! - [`Endpoint`], which builds every route the remote debuggee serves
//! - The [`wire`] module, which decodes response bodies entry by entry so that
//!   malformed entries can be dropped without failing the whole response
//!
//! The crate knows nothing about sessions, poll loops or variable references;
//! those live in `tapline-core`.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod transport;
pub mod wire;

pub use endpoint::{Endpoint, ExecutionAction};
pub use error::{ProtocolError, ProtocolResult};
pub use http::HttpTransport;
pub use transport::{Fetched, Transport};
pub use wire::ExecutionState;
