use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts},
};
use std::collections::HashMap;
use tracing::warn;

use super::token::AdminClaims;
use crate::shared::{AppError, AppState};

/// Extractor gating admin-only routes. Pulls the `Authorization: Bearer`
/// header, validates the token, and checks that its embedded tournament id
/// matches the `:id` path segment of the request.
///
/// Usage: add `AdminAuth(claims): AdminAuth` as a handler argument; the
/// handler only runs for a token scoped to the requested tournament.
pub struct AdminAuth(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params): Path<HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Internal)?;
        let torneo_id = params.get("id").cloned().ok_or(AppError::Internal)?;

        let token = bearer_token(parts)?;
        let claims = match state.tokens.verify_admin_token(token, &torneo_id) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(torneo_id = %torneo_id, error = %err, "admin authentication failed");
                return Err(err);
            }
        };

        Ok(AdminAuth(claims))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("missing Authorization header on protected route");
            AppError::Unauthorized("Falta el encabezado de autorización".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header is not a Bearer token");
        AppError::Unauthorized("Formato de autorización inválido".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::put,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    async fn protected(AdminAuth(claims): AdminAuth) -> String {
        claims.torneo_id
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/torneos/:id", put(protected))
            .with_state(state)
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let builder = Request::builder().method("PUT").uri("/api/torneos/0001");
        let builder = match token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let state = AppStateBuilder::new().build();
        let response = app(state).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_header_is_401() {
        let state = AppStateBuilder::new().build();
        let req = Request::builder()
            .method("PUT")
            .uri("/api/torneos/0001")
            .header("Authorization", "Basic abc123")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_scoped_token_reaches_handler() {
        let state = AppStateBuilder::new().build();
        let token = state.tokens.issue_admin_token("0001").unwrap();

        let response = app(state).oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn token_for_other_tournament_is_403() {
        let state = AppStateBuilder::new().build();
        let token = state.tokens.issue_admin_token("0002").unwrap();

        let response = app(state).oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
