use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, instrument};

use super::{
    service::TournamentService,
    types::{
        ActualizarTorneoRequest, AuthAdminResponse, CrearTorneoRequest, CrearTorneoResponse,
        MensajeResponse, PortadaResponse, TorneoResponse, TorneosPaginados,
    },
};
use crate::credentials::middleware::AdminAuth;
use crate::shared::{AppError, AppState};

/// GET /api/torneos
#[instrument(name = "listar_torneos", skip(state))]
pub async fn listar(State(state): State<AppState>) -> Result<Json<Vec<TorneoResponse>>, AppError> {
    let torneos = TournamentService::new(&state).list().await?;
    info!(count = torneos.len(), "tournaments listed");
    Ok(Json(torneos))
}

/// GET /api/torneos/paginado?index=1&limite=10
#[instrument(name = "listar_paginado", skip(state))]
pub async fn paginado(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TorneosPaginados>, AppError> {
    let index = parametro_entero(&params, "index")?;
    let limite = parametro_entero(&params, "limite")?;

    let page = TournamentService::new(&state).paginated(index, limite).await?;
    Ok(Json(page))
}

/// GET /api/torneos/:id
#[instrument(name = "obtener_torneo", skip(state))]
pub async fn obtener(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
) -> Result<Json<TorneoResponse>, AppError> {
    let torneo = TournamentService::new(&state).get(&torneo_id).await?;
    Ok(Json(torneo))
}

/// GET /api/torneos/:id/:recurso
///
/// The known resources (`participantes`, `partidos`) are routed to their own
/// handlers; anything that lands here is an unknown resource name.
#[instrument(name = "obtener_recurso")]
pub async fn recurso_desconocido(
    Path((_torneo_id, recurso)): Path<(String, String)>,
) -> AppError {
    AppError::validation(format!("Recurso inválido: '{recurso}'"))
}

/// POST /api/torneos
#[instrument(name = "crear_torneo", skip(state, body))]
pub async fn crear(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CrearTorneoResponse>), AppError> {
    let request = CrearTorneoRequest::parse(&body)?;
    info!(nombre = %request.nombre, "creating tournament");

    let created = TournamentService::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/torneos/:id (admin)
#[instrument(name = "actualizar_torneo", skip(state, body, _claims))]
pub async fn actualizar(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    AdminAuth(_claims): AdminAuth,
    Json(body): Json<Value>,
) -> Result<Json<TorneoResponse>, AppError> {
    let request = ActualizarTorneoRequest::parse(&body)?;
    let updated = TournamentService::new(&state)
        .update(&torneo_id, request)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/torneos/:id (admin)
#[instrument(name = "eliminar_torneo", skip(state, _claims))]
pub async fn eliminar(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    AdminAuth(_claims): AdminAuth,
) -> Result<Json<MensajeResponse>, AppError> {
    let nombre = TournamentService::new(&state).delete(&torneo_id).await?;
    Ok(Json(MensajeResponse {
        message: format!("Torneo \"{nombre}\" eliminado con éxito"),
    }))
}

/// POST /api/torneos/:id/auth/admin
#[instrument(name = "auth_admin", skip(state, body))]
pub async fn auth_admin(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<AuthAdminResponse>, AppError> {
    let admin_key = body
        .get("admin_key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::validation("Falta la clave de administrador"))?;

    let auth = TournamentService::new(&state)
        .verify_admin_key(&torneo_id, admin_key)
        .await?;
    Ok(Json(auth))
}

/// POST /api/torneos/:id/portada
///
/// Multipart upload with an `imagen` field. The create flow calls this
/// before any token exists; see `TournamentService::upload_cover` for the
/// exemption rule.
#[instrument(name = "subir_portada", skip(state, headers, multipart))]
pub async fn subir_portada(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PortadaResponse>), AppError> {
    let token = bearer_opcional(&headers);

    let mut imagen: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::validation("Formulario multipart inválido"))?
    {
        if field.name() == Some("imagen") {
            let file_name = field.file_name().unwrap_or("portada").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::validation("No se pudo leer la imagen"))?;
            imagen = Some((file_name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) =
        imagen.ok_or_else(|| AppError::validation("Falta el campo 'imagen'"))?;

    let subida = TournamentService::new(&state)
        .upload_cover(&torneo_id, &file_name, &bytes, token.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(subida)))
}

/// GET /api/imagenes/:id/:archivo
#[instrument(name = "servir_portada", skip(state))]
pub async fn servir_portada(
    State(state): State<AppState>,
    Path((torneo_id, archivo)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let (bytes, content_type) = TournamentService::new(&state)
        .cover_image(&torneo_id, &archivo)
        .await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn parametro_entero(params: &HashMap<String, String>, nombre: &str) -> Result<u32, AppError> {
    params
        .get(nombre)
        .and_then(|valor| valor.parse::<u32>().ok())
        .filter(|valor| *valor >= 1)
        .ok_or_else(|| {
            AppError::validation(format!(
                "El parámetro '{nombre}' debe ser un entero mayor que cero"
            ))
        })
}

fn bearer_opcional(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|valor| valor.to_str().ok())
        .and_then(|valor| valor.strip_prefix("Bearer "))
        .map(str::to_string)
}
