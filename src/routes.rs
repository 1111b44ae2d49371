use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::fixture;
use crate::participant;
use crate::shared::AppState;
use crate::tournament;

// The 5MB image plus multipart framing overhead.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Builds the full API router. Admin-gated handlers enforce authorization
/// through the `AdminAuth` extractor; everything else is public.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/torneos",
            get(tournament::handlers::listar).post(tournament::handlers::crear),
        )
        .route("/api/torneos/paginado", get(tournament::handlers::paginado))
        .route(
            "/api/torneos/:id",
            get(tournament::handlers::obtener)
                .put(tournament::handlers::actualizar)
                .delete(tournament::handlers::eliminar),
        )
        .route(
            "/api/torneos/:id/auth/admin",
            post(tournament::handlers::auth_admin),
        )
        .route(
            "/api/torneos/:id/auth/participante",
            post(participant::handlers::verificar_clave),
        )
        .route(
            "/api/torneos/:id/participantes",
            get(participant::handlers::obtener).post(participant::handlers::inscribir),
        )
        .route(
            "/api/torneos/:id/participantes/:pid",
            delete(participant::handlers::eliminar),
        )
        .route(
            "/api/torneos/:id/partidos",
            get(fixture::handlers::obtener).post(fixture::handlers::crear),
        )
        .route(
            "/api/torneos/:id/partidos/:pid",
            axum::routing::put(fixture::handlers::actualizar).delete(fixture::handlers::eliminar),
        )
        .route(
            "/api/torneos/:id/portada",
            post(tournament::handlers::subir_portada)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Any other resource name under a tournament is invalid.
        .route(
            "/api/torneos/:id/:recurso",
            get(tournament::handlers::recurso_desconocido),
        )
        .route(
            "/api/imagenes/:id/:archivo",
            get(tournament::handlers::servir_portada),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
