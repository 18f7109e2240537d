//! Same-origin forwarder for the dashboard's `/api` calls.
//!
//! Requests under `/api` are replayed against the configured backend with
//! the prefix removed. Retired endpoints answer 404 locally and headers are
//! filtered per [`headers`].

pub mod config;
pub mod error;
pub mod forward;
pub mod headers;
pub mod route;
pub mod server;

pub use config::ProxyArgs;
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use forward::Forwarder;
pub use forward::ProxyRequest;
pub use forward::ProxyResponse;
pub use server::ProxyServer;
pub use server::ShutdownHandle;
