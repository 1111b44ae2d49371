// Public API - what other modules can use
pub use service::TournamentService;
pub use types::{MensajeResponse, TorneoResponse};

pub mod handlers;
pub mod service;
pub mod types;
