// Library crate for the tournament catalog server
// This file exposes the public API for integration tests

pub mod config;
pub mod credentials;
pub mod fixture;
pub mod participant;
pub mod routes;
pub mod shared;
pub mod standings;
pub mod store;
pub mod tournament;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use credentials::{AdminClaims, KeyService, TokenConfig};
pub use routes::api_router;
pub use shared::{AppError, AppState};
pub use store::{FsRecordStore, InMemoryRecordStore, RecordStore};
