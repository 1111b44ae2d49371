use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::types::{
    ActualizarTorneoRequest, AuthAdminResponse, CrearTorneoRequest, CrearTorneoResponse,
    Paginacion, PortadaResponse, TorneoResponse, TorneosPaginados,
};
use crate::credentials::{keys::KeyService, token::TokenConfig};
use crate::shared::{AppError, AppState};
use crate::store::locks::TournamentLocks;
use crate::store::models::Torneo;
use crate::store::repository::RecordStore;

const MAX_PORTADA_BYTES: usize = 5 * 1024 * 1024;
const EXTENSIONES_PORTADA: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Service for tournament catalog business logic
pub struct TournamentService {
    store: Arc<dyn RecordStore + Send + Sync>,
    keys: KeyService,
    tokens: TokenConfig,
    locks: TournamentLocks,
}

impl TournamentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            keys: state.keys.clone(),
            tokens: state.tokens.clone(),
            locks: state.locks.clone(),
        }
    }

    /// Full catalog. An empty or missing store answers 404, matching the
    /// behavior the frontend catalog expects.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TorneoResponse>, AppError> {
        let torneos = self.store.read_tournaments().await?;
        if torneos.is_empty() {
            return Err(AppError::NotFound("No hay torneos registrados".to_string()));
        }
        Ok(torneos.iter().map(TorneoResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, torneo_id: &str) -> Result<TorneoResponse, AppError> {
        Ok(TorneoResponse::from(&self.find(torneo_id).await?))
    }

    /// Offset/limit slice over the catalog, 1-based page index.
    #[instrument(skip(self))]
    pub async fn paginated(&self, index: u32, limite: u32) -> Result<TorneosPaginados, AppError> {
        let torneos = match self.store.read_tournaments().await {
            Ok(torneos) => torneos,
            Err(AppError::NotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };

        let total_torneos = torneos.len() as u32;
        let total_paginas = total_torneos.div_ceil(limite);

        if index > total_paginas {
            return Err(AppError::validation(format!(
                "El parámetro 'index' está fuera de rango: hay {total_paginas} páginas"
            )));
        }

        let desde = ((index - 1) * limite) as usize;
        let data = torneos
            .iter()
            .skip(desde)
            .take(limite as usize)
            .map(TorneoResponse::from)
            .collect();

        Ok(TorneosPaginados {
            data,
            paginacion: Paginacion {
                index,
                limite,
                total_torneos,
                total_paginas,
            },
        })
    }

    /// Creates a tournament, assigning a fresh 4-digit id and a one-time
    /// admin key. Only the key's hash is stored.
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CrearTorneoRequest) -> Result<CrearTorneoResponse, AppError> {
        let _guard = self.locks.acquire_list().await;

        let mut torneos = match self.store.read_tournaments().await {
            Ok(torneos) => torneos,
            Err(AppError::NotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };

        let torneo_id = generar_torneo_id(&torneos)?;
        debug!(torneo_id = %torneo_id, "generated tournament id");

        let admin_key = self.keys.generate_key();
        let admin_key_hashed = self.keys.hash_key(&admin_key)?;

        torneos.push(Torneo {
            torneo_id: torneo_id.clone(),
            nombre: request.nombre,
            disciplina: request.disciplina,
            formato: request.formato,
            estado: request.estado,
            nro_participantes: request.nro_participantes,
            organizador: request.organizador,
            premio: request.premio,
            fecha_inicio: request.fecha_inicio,
            fecha_fin: request.fecha_fin,
            descripcion: request.descripcion,
            tags: request.tags,
            portada_url: None,
            admin_key_hashed,
            creado_en: Utc::now(),
        });

        self.store.write_tournaments(&torneos).await?;

        info!(torneo_id = %torneo_id, "tournament created");
        Ok(CrearTorneoResponse {
            torneo_id,
            admin_key,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        torneo_id: &str,
        request: ActualizarTorneoRequest,
    ) -> Result<TorneoResponse, AppError> {
        let _guard = self.locks.acquire_list().await;

        let mut torneos = self.store.read_tournaments().await?;
        let torneo = torneos
            .iter_mut()
            .find(|t| t.torneo_id == torneo_id)
            .ok_or_else(|| AppError::NotFound("Torneo no encontrado".to_string()))?;

        request.apply(torneo);
        let response = TorneoResponse::from(&*torneo);

        self.store.write_tournaments(&torneos).await?;
        info!(torneo_id = %torneo_id, "tournament updated");
        Ok(response)
    }

    /// Deletes a tournament and cascades to its participants, matches and
    /// cover image.
    #[instrument(skip(self))]
    pub async fn delete(&self, torneo_id: &str) -> Result<String, AppError> {
        let _list_guard = self.locks.acquire_list().await;
        let _torneo_guard = self.locks.acquire(torneo_id).await;

        let mut torneos = self.store.read_tournaments().await?;
        let posicion = torneos
            .iter()
            .position(|t| t.torneo_id == torneo_id)
            .ok_or_else(|| AppError::NotFound("Torneo no encontrado".to_string()))?;

        let nombre = torneos.remove(posicion).nombre;
        self.store.write_tournaments(&torneos).await?;
        self.store.delete_tournament_data(torneo_id).await?;
        self.locks.forget(torneo_id).await;

        info!(torneo_id = %torneo_id, nombre = %nombre, "tournament deleted");
        Ok(nombre)
    }

    /// Exchanges a valid admin key for a signed token scoped to this
    /// tournament.
    #[instrument(skip(self, admin_key))]
    pub async fn verify_admin_key(
        &self,
        torneo_id: &str,
        admin_key: &str,
    ) -> Result<AuthAdminResponse, AppError> {
        let torneo = self.find(torneo_id).await?;

        if torneo.admin_key_hashed.is_empty() {
            return Err(AppError::Structure(format!(
                "el torneo {torneo_id} no tiene clave de administrador almacenada"
            )));
        }

        if !self.keys.verify_key(admin_key, &torneo.admin_key_hashed) {
            warn!(torneo_id = %torneo_id, "admin key rejected");
            return Err(AppError::Unauthorized(
                "Clave de administrador inválida".to_string(),
            ));
        }

        let token = self.tokens.issue_admin_token(torneo_id)?;
        info!(torneo_id = %torneo_id, "admin key verified, token issued");
        Ok(AuthAdminResponse { valid: true, token })
    }

    /// Stores a cover image and records its URL on the tournament.
    ///
    /// The create flow uploads right after creation, before any token
    /// exists, so the first upload is exempt; replacing an existing cover
    /// requires an admin token. A presented token is always verified.
    #[instrument(skip(self, bytes, token))]
    pub async fn upload_cover(
        &self,
        torneo_id: &str,
        file_name: &str,
        bytes: &[u8],
        token: Option<&str>,
    ) -> Result<PortadaResponse, AppError> {
        let extension = extension_permitida(file_name)?;

        if bytes.is_empty() {
            return Err(AppError::validation("La imagen está vacía"));
        }
        if bytes.len() > MAX_PORTADA_BYTES {
            return Err(AppError::validation(
                "La imagen supera el tamaño máximo de 5MB",
            ));
        }

        let _guard = self.locks.acquire_list().await;

        let mut torneos = self.store.read_tournaments().await?;
        let torneo = torneos
            .iter_mut()
            .find(|t| t.torneo_id == torneo_id)
            .ok_or_else(|| AppError::NotFound("Torneo no encontrado".to_string()))?;

        match token {
            Some(token) => {
                self.tokens.verify_admin_token(token, torneo_id)?;
            }
            None if torneo.portada_url.is_some() => {
                return Err(AppError::Unauthorized(
                    "Reemplazar la portada requiere autorización".to_string(),
                ));
            }
            None => {}
        }

        let stored_name = format!("portada.{extension}");
        self.store
            .save_cover_image(torneo_id, &stored_name, bytes)
            .await?;

        let url = format!("/api/imagenes/{torneo_id}/{stored_name}");
        torneo.portada_url = Some(url.clone());
        self.store.write_tournaments(&torneos).await?;

        info!(torneo_id = %torneo_id, url = %url, "cover image stored");
        Ok(PortadaResponse { url })
    }

    /// Reads a stored cover image, rejecting path-traversal attempts.
    #[instrument(skip(self))]
    pub async fn cover_image(
        &self,
        torneo_id: &str,
        archivo: &str,
    ) -> Result<(Vec<u8>, &'static str), AppError> {
        for segmento in [torneo_id, archivo] {
            if segmento.contains("..") || segmento.contains('/') || segmento.contains('\\') {
                return Err(AppError::validation("Ruta inválida"));
            }
        }

        let bytes = self.store.read_cover_image(torneo_id, archivo).await?;
        let content_type = match archivo.rsplit('.').next() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        };
        Ok((bytes, content_type))
    }

    async fn find(&self, torneo_id: &str) -> Result<Torneo, AppError> {
        self.store
            .read_tournaments()
            .await?
            .into_iter()
            .find(|t| t.torneo_id == torneo_id)
            .ok_or_else(|| AppError::NotFound("Torneo no encontrado".to_string()))
    }
}

/// Random 4-digit id, re-drawn on collision with the current list.
fn generar_torneo_id(torneos: &[Torneo]) -> Result<String, AppError> {
    if torneos.len() >= 10_000 {
        return Err(AppError::Conflict(
            "No quedan identificadores de torneo disponibles".to_string(),
        ));
    }
    loop {
        let candidato = format!("{:04}", rand::rng().random_range(0..10_000));
        if !torneos.iter().any(|t| t.torneo_id == candidato) {
            return Ok(candidato);
        }
    }
}

fn extension_permitida(file_name: &str) -> Result<String, AppError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .filter(|ext| ext != file_name && EXTENSIONES_PORTADA.contains(&ext.as_str()));

    extension.ok_or_else(|| {
        AppError::validation(format!(
            "Formato de imagen no soportado; se aceptan: {}",
            EXTENSIONES_PORTADA.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::store::models::{Disciplina, EstadoTorneo};
    use serde_json::json;

    fn service(state: &AppState) -> TournamentService {
        TournamentService::new(state)
    }

    fn crear_request(nombre: &str) -> CrearTorneoRequest {
        CrearTorneoRequest::parse(&json!({
            "nombre": nombre,
            "disciplina": "futbol",
            "formato": "Liga",
            "estado": 0,
            "nro_participantes": 8,
            "organizador": "Club Y",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips_without_key_hash() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);

        let created = service.create(crear_request("Copa X")).await.unwrap();
        assert_eq!(created.torneo_id.len(), 4);
        assert!(!created.admin_key.is_empty());

        let fetched = service.get(&created.torneo_id).await.unwrap();
        assert_eq!(fetched.nombre, "Copa X");
        assert_eq!(fetched.disciplina, Disciplina::Futbol);
        assert_eq!(fetched.estado, EstadoTorneo::SinComenzar);
    }

    #[tokio::test]
    async fn list_of_empty_store_is_not_found() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);

        assert!(matches!(service.list().await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn generated_ids_are_unique() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);

        let a = service.create(crear_request("Copa A")).await.unwrap();
        let b = service.create(crear_request("Copa B")).await.unwrap();
        assert_ne!(a.torneo_id, b.torneo_id);
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let request = ActualizarTorneoRequest::parse(&json!({ "premio": "Trofeo de oro" })).unwrap();
        let updated = service.update(&created.torneo_id, request).await.unwrap();

        assert_eq!(updated.premio, "Trofeo de oro");
        assert_eq!(updated.nombre, "Copa X");
    }

    #[tokio::test]
    async fn update_unknown_tournament_is_not_found() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        service.create(crear_request("Copa X")).await.unwrap();

        let request = ActualizarTorneoRequest::parse(&json!({ "premio": "x" })).unwrap();
        assert!(matches!(
            service.update("9999", request).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_tournament_and_echoes_name() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let nombre = service.delete(&created.torneo_id).await.unwrap();
        assert_eq!(nombre, "Copa X");

        assert!(matches!(
            service.get(&created.torneo_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn admin_key_exchanges_for_scoped_token() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let auth = service
            .verify_admin_key(&created.torneo_id, &created.admin_key)
            .await
            .unwrap();
        assert!(auth.valid);

        let claims = state
            .tokens
            .verify_admin_token(&auth.token, &created.torneo_id)
            .unwrap();
        assert_eq!(claims.torneo_id, created.torneo_id);
    }

    #[tokio::test]
    async fn wrong_admin_key_is_unauthorized() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let result = service
            .verify_admin_key(&created.torneo_id, "clave-incorrecta-0000")
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn pagination_slices_and_reports_totals() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        for i in 0..5 {
            service
                .create(crear_request(&format!("Copa {i}")))
                .await
                .unwrap();
        }

        let page = service.paginated(2, 2).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.paginacion.total_torneos, 5);
        assert_eq!(page.paginacion.total_paginas, 3);

        let last = service.paginated(3, 2).await.unwrap();
        assert_eq!(last.data.len(), 1);
    }

    #[tokio::test]
    async fn pagination_index_out_of_range_is_rejected() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        service.create(crear_request("Copa X")).await.unwrap();

        assert!(matches!(
            service.paginated(4, 10).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn first_cover_upload_is_exempt_then_replacement_needs_token() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let subida = service
            .upload_cover(&created.torneo_id, "foto.png", b"png-bytes", None)
            .await
            .unwrap();
        assert_eq!(
            subida.url,
            format!("/api/imagenes/{}/portada.png", created.torneo_id)
        );

        let sin_token = service
            .upload_cover(&created.torneo_id, "otra.png", b"png-bytes", None)
            .await;
        assert!(matches!(sin_token, Err(AppError::Unauthorized(_))));

        let token = state.tokens.issue_admin_token(&created.torneo_id).unwrap();
        service
            .upload_cover(&created.torneo_id, "otra.jpg", b"jpg-bytes", Some(&token))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn oversized_or_misnamed_cover_is_rejected() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);
        let created = service.create(crear_request("Copa X")).await.unwrap();

        let result = service
            .upload_cover(&created.torneo_id, "virus.exe", b"bytes", None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let grande = vec![0u8; MAX_PORTADA_BYTES + 1];
        let result = service
            .upload_cover(&created.torneo_id, "foto.png", &grande, None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn cover_path_traversal_is_rejected() {
        let state = AppStateBuilder::new().build();
        let service = service(&state);

        let result = service.cover_image("..", "portada.png").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service.cover_image("0001", "../torneos.json").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
