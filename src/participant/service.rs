use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::types::{AuthParticipanteResponse, InscripcionResponse, ParticipantesResponse};
use crate::credentials::keys::KeyService;
use crate::shared::{AppError, AppState};
use crate::standings::StandingsService;
use crate::store::locks::TournamentLocks;
use crate::store::models::{EstadoTorneo, Participante, ParticipantesDoc, Torneo};
use crate::store::repository::RecordStore;

/// Service for participant enrollment and self-service withdrawal
pub struct ParticipantService {
    store: Arc<dyn RecordStore + Send + Sync>,
    keys: KeyService,
    locks: TournamentLocks,
    standings: StandingsService,
}

impl ParticipantService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            keys: state.keys.clone(),
            locks: state.locks.clone(),
            standings: StandingsService::new(Arc::clone(&state.store)),
        }
    }

    /// GET view of a tournament's participants, key hashes stripped.
    #[instrument(skip(self))]
    pub async fn list(&self, torneo_id: &str) -> Result<ParticipantesResponse, AppError> {
        let doc = self.store.read_participants(torneo_id).await?;
        Ok(ParticipantesResponse::from(&doc))
    }

    /// Enrolls a competitor. Open only while the tournament has not started;
    /// names are unique ignoring case; capacity is a hard limit. Returns the
    /// one-time participant key.
    #[instrument(skip(self))]
    pub async fn enroll(
        &self,
        torneo_id: &str,
        nombre: &str,
    ) -> Result<InscripcionResponse, AppError> {
        let _guard = self.locks.acquire(torneo_id).await;

        let torneo = self.find_tournament(torneo_id).await?;
        if torneo.estado != EstadoTorneo::SinComenzar {
            return Err(AppError::validation(
                "Las inscripciones solo están abiertas antes del comienzo del torneo",
            ));
        }

        let mut doc = match self.store.read_participants(torneo_id).await {
            Ok(doc) => doc,
            Err(AppError::NotFound(_)) => ParticipantesDoc::new(torneo_id),
            Err(err) => return Err(err),
        };

        if doc.participantes.len() as u32 >= torneo.nro_participantes {
            return Err(AppError::validation(
                "No hay plazas disponibles en este torneo",
            ));
        }

        let nombre_normalizado = nombre.to_lowercase();
        if doc
            .participantes
            .iter()
            .any(|p| p.nombre.to_lowercase() == nombre_normalizado)
        {
            warn!(torneo_id = %torneo_id, nombre = %nombre, "duplicate participant name");
            return Err(AppError::Conflict(
                "Ya existe un participante con ese nombre".to_string(),
            ));
        }

        let participante_id = doc.siguiente_id();
        let participante_key = self.keys.generate_key();
        let participante_key_hashed = self.keys.hash_key(&participante_key)?;

        doc.participantes.push(Participante {
            id: participante_id.clone(),
            nombre: nombre.to_string(),
            participante_key_hashed,
            creado_en: Utc::now(),
            partidos_jugados: 0,
            ganados: 0,
            empatados: 0,
            perdidos: 0,
            puntos: 0,
        });

        self.store.write_participants(torneo_id, &doc).await?;

        info!(
            torneo_id = %torneo_id,
            participante_id = %participante_id,
            "participant enrolled"
        );
        Ok(InscripcionResponse {
            participante_id,
            nombre: nombre.to_string(),
            participante_key,
        })
    }

    /// One-shot verification of a participant key. No token is issued: the
    /// withdrawal flow presents the key and acts immediately.
    #[instrument(skip(self, participante_key))]
    pub async fn verify_key(
        &self,
        torneo_id: &str,
        participante_key: &str,
    ) -> Result<AuthParticipanteResponse, AppError> {
        let doc = self.store.read_participants(torneo_id).await?;

        for participante in &doc.participantes {
            if self
                .keys
                .verify_key(participante_key, &participante.participante_key_hashed)
            {
                info!(
                    torneo_id = %torneo_id,
                    participante_id = %participante.id,
                    "participant key verified"
                );
                return Ok(AuthParticipanteResponse {
                    valid: true,
                    participante_id: participante.id.clone(),
                });
            }
        }

        warn!(torneo_id = %torneo_id, "participant key rejected");
        Err(AppError::Unauthorized(
            "Clave de participante inválida".to_string(),
        ))
    }

    /// Removes a participant and recomputes the standings. Their played
    /// matches stay on record and are skipped as orphans by the engine.
    #[instrument(skip(self))]
    pub async fn remove(&self, torneo_id: &str, participante_id: &str) -> Result<String, AppError> {
        let _guard = self.locks.acquire(torneo_id).await;

        let mut doc = self.store.read_participants(torneo_id).await?;
        let posicion = doc
            .participantes
            .iter()
            .position(|p| p.id == participante_id)
            .ok_or_else(|| AppError::NotFound("Participante no encontrado".to_string()))?;

        let nombre = doc.participantes.remove(posicion).nombre;
        self.store.write_participants(torneo_id, &doc).await?;
        self.standings.recompute_tournament(torneo_id).await?;

        info!(
            torneo_id = %torneo_id,
            participante_id = %participante_id,
            "participant removed"
        );
        Ok(nombre)
    }

    async fn find_tournament(&self, torneo_id: &str) -> Result<Torneo, AppError> {
        self.store
            .read_tournaments()
            .await?
            .into_iter()
            .find(|t| t.torneo_id == torneo_id)
            .ok_or_else(|| AppError::NotFound("Torneo no encontrado".to_string()))
    }
}
