use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::{
    service::ParticipantService,
    types::{AuthParticipanteResponse, InscripcionResponse, ParticipantesResponse},
};
use crate::shared::{AppError, AppState};
use crate::tournament::types::MensajeResponse;

/// GET /api/torneos/:id/participantes
#[instrument(name = "obtener_participantes", skip(state))]
pub async fn obtener(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
) -> Result<Json<ParticipantesResponse>, AppError> {
    let doc = ParticipantService::new(&state).list(&torneo_id).await?;
    Ok(Json(doc))
}

/// POST /api/torneos/:id/participantes
#[instrument(name = "inscribir_participante", skip(state, body))]
pub async fn inscribir(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<InscripcionResponse>), AppError> {
    let nombre = body
        .get("nombre")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|nombre| !nombre.is_empty())
        .ok_or_else(|| AppError::validation("El campo 'nombre' es obligatorio"))?;

    info!(torneo_id = %torneo_id, nombre = %nombre, "enrolling participant");
    let inscripcion = ParticipantService::new(&state)
        .enroll(&torneo_id, nombre)
        .await?;
    Ok((StatusCode::CREATED, Json(inscripcion)))
}

/// POST /api/torneos/:id/auth/participante
#[instrument(name = "auth_participante", skip(state, body))]
pub async fn verificar_clave(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<AuthParticipanteResponse>, AppError> {
    let participante_key = body
        .get("participante_key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::validation("Falta la clave de participante"))?;

    let auth = ParticipantService::new(&state)
        .verify_key(&torneo_id, participante_key)
        .await?;
    Ok(Json(auth))
}

/// DELETE /api/torneos/:id/participantes/:pid
///
/// The withdrawal flow verifies the participant key through the auth
/// endpoint first; an admin removes directly from the roster view.
#[instrument(name = "eliminar_participante", skip(state))]
pub async fn eliminar(
    State(state): State<AppState>,
    Path((torneo_id, participante_id)): Path<(String, String)>,
) -> Result<Json<MensajeResponse>, AppError> {
    let nombre = ParticipantService::new(&state)
        .remove(&torneo_id, &participante_id)
        .await?;
    Ok(Json(MensajeResponse {
        message: format!("Participante \"{nombre}\" eliminado con éxito"),
    }))
}
