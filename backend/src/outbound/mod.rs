//! Outbound adapters implementing the domain ports.

pub mod auth_http;
pub mod docstore;
pub mod memory;

pub use auth_http::HttpAuthGateway;
pub use docstore::HttpConfessionStore;
pub use memory::MemoryConfessionStore;
