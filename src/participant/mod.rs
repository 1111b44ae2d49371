// Public API - what other modules can use
pub use service::ParticipantService;
pub use types::ParticipanteResponse;

pub mod handlers;
pub mod service;
pub mod types;
