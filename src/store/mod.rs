// Public API - what other modules can use
pub use locks::TournamentLocks;
pub use models::{
    Disciplina, EstadoTorneo, Participante, ParticipantesDoc, Partido, PartidosDoc, Torneo,
};
pub use repository::{FsRecordStore, InMemoryRecordStore, RecordStore};

pub mod locks;
pub mod models;
pub mod repository;
