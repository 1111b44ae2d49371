use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::shared::AppError;

const ADMIN_ROLE: &str = "admin";
const ADMIN_TOKEN_HOURS: i64 = 2;

/// Claims embedded in an admin token. A token grants write access to one
/// tournament only; the embedded `torneo_id` is checked on every use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminClaims {
    pub torneo_id: String,
    pub role: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issues a signed admin token scoped to one tournament, valid for two
    /// hours.
    #[instrument(skip(self))]
    pub fn issue_admin_token(&self, torneo_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AdminClaims {
            torneo_id: torneo_id.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (now + Duration::hours(ADMIN_TOKEN_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|err| {
            debug!(error = %err, "failed to encode admin token");
            AppError::Internal
        })
    }

    /// Validates a token and checks its tournament scope. Expired, malformed
    /// or tampered tokens are `Unauthorized`; a valid token presented against
    /// a different tournament is `Forbidden`. The scope check is mandatory.
    #[instrument(skip(self, token))]
    pub fn verify_admin_token(
        &self,
        token: &str,
        torneo_id: &str,
    ) -> Result<AdminClaims, AppError> {
        let data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|err| {
            debug!(error = %err, "admin token rejected");
            match err.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("El token expiró".to_string())
                }
                _ => AppError::Unauthorized("Token inválido".to_string()),
            }
        })?;

        let claims = data.claims;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::Forbidden(
                "El token no tiene rol de administrador".to_string(),
            ));
        }

        if claims.torneo_id != torneo_id {
            debug!(
                token_torneo = %claims.torneo_id,
                requested_torneo = %torneo_id,
                "token presented against a different tournament"
            );
            return Err(AppError::Forbidden(
                "El token no corresponde a este torneo".to_string(),
            ));
        }

        Ok(claims)
    }
}
