use std::sync::Arc;
use tracing::{info, instrument};

use super::types::{ActualizarPartidoRequest, CrearPartidoRequest};
use crate::shared::{AppError, AppState};
use crate::standings::StandingsService;
use crate::store::locks::TournamentLocks;
use crate::store::models::{Partido, PartidosDoc};
use crate::store::repository::RecordStore;

/// Service for fixture (partido) business logic. Every mutation that leaves
/// a played result behind triggers a full standings recomputation; deletes
/// always do, to unwind the deleted match's contribution.
pub struct FixtureService {
    store: Arc<dyn RecordStore + Send + Sync>,
    locks: TournamentLocks,
    standings: StandingsService,
}

impl FixtureService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            locks: state.locks.clone(),
            standings: StandingsService::new(Arc::clone(&state.store)),
        }
    }

    /// GET view of a tournament's fixtures.
    #[instrument(skip(self))]
    pub async fn list(&self, torneo_id: &str) -> Result<PartidosDoc, AppError> {
        self.store.read_matches(torneo_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        torneo_id: &str,
        request: CrearPartidoRequest,
    ) -> Result<Partido, AppError> {
        let _guard = self.locks.acquire(torneo_id).await;

        self.ensure_tournament(torneo_id).await?;

        let participantes = match self.store.read_participants(torneo_id).await {
            Ok(doc) => doc,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::validation(
                    "El torneo no tiene participantes inscriptos",
                ))
            }
            Err(err) => return Err(err),
        };

        for id in [&request.participante1_id, &request.participante2_id] {
            if !participantes.participantes.iter().any(|p| &p.id == id) {
                return Err(AppError::validation(format!(
                    "El participante '{id}' no está inscripto en el torneo"
                )));
            }
        }

        let mut doc = match self.store.read_matches(torneo_id).await {
            Ok(doc) => doc,
            Err(AppError::NotFound(_)) => PartidosDoc::new(torneo_id),
            Err(err) => return Err(err),
        };

        let partido = Partido {
            partido_id: doc.siguiente_id(),
            participante1_id: request.participante1_id,
            participante2_id: request.participante2_id,
            fecha: request.fecha,
            jugado_en: request.jugado_en,
            resultado1: request.resultado.map(|(r1, _)| r1),
            resultado2: request.resultado.map(|(_, r2)| r2),
        };

        doc.partidos.push(partido.clone());
        self.store.write_matches(torneo_id, &doc).await?;

        if partido.jugado() {
            self.standings.recompute_tournament(torneo_id).await?;
        }

        info!(
            torneo_id = %torneo_id,
            partido_id = %partido.partido_id,
            jugado = partido.jugado(),
            "match created"
        );
        Ok(partido)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        torneo_id: &str,
        partido_id: &str,
        request: ActualizarPartidoRequest,
    ) -> Result<Partido, AppError> {
        let _guard = self.locks.acquire(torneo_id).await;

        let mut doc = self.read_matches_of(torneo_id).await?;
        let partido = doc
            .partidos
            .iter_mut()
            .find(|p| p.partido_id == partido_id)
            .ok_or_else(|| AppError::NotFound("Partido no encontrado".to_string()))?;

        if let Some((resultado1, resultado2)) = request.resultado {
            partido.resultado1 = Some(resultado1);
            partido.resultado2 = Some(resultado2);
        }
        if let Some(jugado_en) = request.jugado_en {
            partido.jugado_en = jugado_en;
        }

        let actualizado = partido.clone();
        self.store.write_matches(torneo_id, &doc).await?;

        if actualizado.jugado() {
            self.standings.recompute_tournament(torneo_id).await?;
        }

        info!(
            torneo_id = %torneo_id,
            partido_id = %partido_id,
            "match updated"
        );
        Ok(actualizado)
    }

    /// Deletes a fixture. The recomputation is unconditional: even an
    /// unplayed match may have been played before an edit, and replaying
    /// the remaining history is what unwinds its contribution.
    #[instrument(skip(self))]
    pub async fn delete(&self, torneo_id: &str, partido_id: &str) -> Result<(), AppError> {
        let _guard = self.locks.acquire(torneo_id).await;

        let mut doc = self.read_matches_of(torneo_id).await?;
        let posicion = doc
            .partidos
            .iter()
            .position(|p| p.partido_id == partido_id)
            .ok_or_else(|| AppError::NotFound("Partido no encontrado".to_string()))?;

        doc.partidos.remove(posicion);
        self.store.write_matches(torneo_id, &doc).await?;
        self.standings.recompute_tournament(torneo_id).await?;

        info!(
            torneo_id = %torneo_id,
            partido_id = %partido_id,
            "match deleted"
        );
        Ok(())
    }

    async fn read_matches_of(&self, torneo_id: &str) -> Result<PartidosDoc, AppError> {
        match self.store.read_matches(torneo_id).await {
            Ok(doc) => Ok(doc),
            Err(AppError::NotFound(_)) => {
                Err(AppError::NotFound("Partido no encontrado".to_string()))
            }
            Err(err) => Err(err),
        }
    }

    async fn ensure_tournament(&self, torneo_id: &str) -> Result<(), AppError> {
        let existe = self
            .store
            .read_tournaments()
            .await?
            .iter()
            .any(|t| t.torneo_id == torneo_id);
        if existe {
            Ok(())
        } else {
            Err(AppError::NotFound("Torneo no encontrado".to_string()))
        }
    }
}
