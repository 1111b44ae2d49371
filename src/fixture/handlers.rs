use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::{
    service::FixtureService,
    types::{ActualizarPartidoRequest, CrearPartidoRequest},
};
use crate::credentials::middleware::AdminAuth;
use crate::shared::{AppError, AppState};
use crate::store::models::{Partido, PartidosDoc};
use crate::tournament::types::MensajeResponse;

/// GET /api/torneos/:id/partidos
#[instrument(name = "obtener_partidos", skip(state))]
pub async fn obtener(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
) -> Result<Json<PartidosDoc>, AppError> {
    let doc = FixtureService::new(&state).list(&torneo_id).await?;
    Ok(Json(doc))
}

/// POST /api/torneos/:id/partidos (admin)
#[instrument(name = "crear_partido", skip(state, body, _claims))]
pub async fn crear(
    State(state): State<AppState>,
    Path(torneo_id): Path<String>,
    AdminAuth(_claims): AdminAuth,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Partido>), AppError> {
    let request = CrearPartidoRequest::parse(&body)?;
    info!(torneo_id = %torneo_id, "creating match");

    let partido = FixtureService::new(&state).create(&torneo_id, request).await?;
    Ok((StatusCode::CREATED, Json(partido)))
}

/// PUT /api/torneos/:id/partidos/:pid (admin)
#[instrument(name = "actualizar_partido", skip(state, body, _claims))]
pub async fn actualizar(
    State(state): State<AppState>,
    Path((torneo_id, partido_id)): Path<(String, String)>,
    AdminAuth(_claims): AdminAuth,
    Json(body): Json<Value>,
) -> Result<Json<Partido>, AppError> {
    let request = ActualizarPartidoRequest::parse(&body)?;
    let partido = FixtureService::new(&state)
        .update(&torneo_id, &partido_id, request)
        .await?;
    Ok(Json(partido))
}

/// DELETE /api/torneos/:id/partidos/:pid (admin)
#[instrument(name = "eliminar_partido", skip(state, _claims))]
pub async fn eliminar(
    State(state): State<AppState>,
    Path((torneo_id, partido_id)): Path<(String, String)>,
    AdminAuth(_claims): AdminAuth,
) -> Result<Json<MensajeResponse>, AppError> {
    FixtureService::new(&state)
        .delete(&torneo_id, &partido_id)
        .await?;
    Ok(Json(MensajeResponse {
        message: "Partido eliminado con éxito".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::api_router;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Creates a tournament with two enrolled participants, returning
    /// (torneo_id, admin token).
    async fn setup(app: &Router, state: &AppState) -> (String, String) {
        let created = json_body(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/torneos",
                    json!({
                        "nombre": "Copa X",
                        "disciplina": "futbol",
                        "formato": "Liga",
                        "estado": 0,
                        "nro_participantes": 2,
                        "organizador": "Club Y",
                    }),
                    None,
                ))
                .await
                .unwrap(),
        )
        .await;
        let torneo_id = created["torneo_id"].as_str().unwrap().to_string();

        for nombre in ["Alice", "Bob"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/torneos/{torneo_id}/participantes"),
                    json!({ "nombre": nombre }),
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let token = state.tokens.issue_admin_token(&torneo_id).unwrap();
        (torneo_id, token)
    }

    #[tokio::test]
    async fn create_without_token_is_401() {
        let state = AppStateBuilder::new().build();
        let app = api_router(state.clone());
        let (torneo_id, _token) = setup(&app, &state).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/torneos/{torneo_id}/partidos"),
                json!({
                    "participante1_id": "0001",
                    "participante2_id": "0002",
                    "fecha": "2024-01-01",
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_with_foreign_token_is_403() {
        let state = AppStateBuilder::new().build();
        let app = api_router(state.clone());
        let (torneo_id, _token) = setup(&app, &state).await;
        let ajeno = state.tokens.issue_admin_token("9999").unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/torneos/{torneo_id}/partidos"),
                json!({
                    "participante1_id": "0001",
                    "participante2_id": "0002",
                    "fecha": "2024-01-01",
                }),
                Some(&ajeno),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn full_match_lifecycle_drives_standings() {
        let state = AppStateBuilder::new().build();
        let app = api_router(state.clone());
        let (torneo_id, token) = setup(&app, &state).await;

        // Create a played match 3-1.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/torneos/{torneo_id}/partidos"),
                json!({
                    "participante1_id": "0001",
                    "participante2_id": "0002",
                    "fecha": "2024-01-01",
                    "resultado1": 3,
                    "resultado2": 1,
                }),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let partido = json_body(response).await;
        let partido_id = partido["partido_id"].as_str().unwrap().to_string();

        // Standings reflect Alice's win.
        let roster = json_body(
            app.clone()
                .oneshot(
                    Request::builder()
                        .uri(format!("/api/torneos/{torneo_id}/participantes"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap(),
        )
        .await;
        let alice = &roster["participantes"][0];
        assert_eq!(alice["partidos_jugados"], 1);
        assert_eq!(alice["ganados"], 1);
        assert_eq!(alice["puntos"], 3);
        let bob = &roster["participantes"][1];
        assert_eq!(bob["perdidos"], 1);
        assert_eq!(bob["puntos"], 0);

        // Delete the match: both participants return to zero.
        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                &format!("/api/torneos/{torneo_id}/partidos/{partido_id}"),
                json!({}),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let roster = json_body(
            app.oneshot(
                Request::builder()
                    .uri(format!("/api/torneos/{torneo_id}/participantes"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
        )
        .await;
        for participante in roster["participantes"].as_array().unwrap() {
            assert_eq!(participante["partidos_jugados"], 0);
            assert_eq!(participante["puntos"], 0);
        }
    }

    #[tokio::test]
    async fn fixtures_view_is_public() {
        let state = AppStateBuilder::new().build();
        let app = api_router(state.clone());
        let (torneo_id, token) = setup(&app, &state).await;

        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/torneos/{torneo_id}/partidos"),
                json!({
                    "participante1_id": "0001",
                    "participante2_id": "0002",
                    "fecha": "2024-01-01",
                }),
                Some(&token),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/torneos/{torneo_id}/partidos"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["torneo_id"], torneo_id);
        assert_eq!(body["partidos"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_match_body_is_400_with_details() {
        let state = AppStateBuilder::new().build();
        let app = api_router(state.clone());
        let (torneo_id, token) = setup(&app, &state).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/torneos/{torneo_id}/partidos"),
                json!({ "participante1_id": "0001", "participante2_id": "0001" }),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
