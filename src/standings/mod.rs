pub mod engine;

pub use engine::{recompute, PUNTOS_EMPATE, PUNTOS_VICTORIA};

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::shared::AppError;
use crate::store::repository::RecordStore;

/// Recomputes and persists a tournament's standings. Runs after every match
/// create, update and delete, and after a participant is removed; it is the
/// only writer of the derived statistics fields.
pub struct StandingsService {
    store: Arc<dyn RecordStore + Send + Sync>,
}

impl StandingsService {
    pub fn new(store: Arc<dyn RecordStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Full replay: loads the participants and matches documents, rebuilds
    /// the statistics and writes the participants document back. Callers
    /// must already hold the tournament's lock.
    #[instrument(skip(self))]
    pub async fn recompute_tournament(&self, torneo_id: &str) -> Result<(), AppError> {
        let mut doc = match self.store.read_participants(torneo_id).await {
            Ok(doc) => doc,
            // No participants document yet: nothing to recompute.
            Err(AppError::NotFound(_)) => return Ok(()),
            Err(err) => return Err(err),
        };

        let partidos = match self.store.read_matches(torneo_id).await {
            Ok(doc) => doc.partidos,
            Err(AppError::NotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };

        engine::recompute(&mut doc.participantes, &partidos);
        debug!(
            torneo_id = %torneo_id,
            participantes = doc.participantes.len(),
            partidos = partidos.len(),
            "standings recomputed"
        );

        self.store.write_participants(torneo_id, &doc).await
    }
}
