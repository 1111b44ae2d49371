use std::path::PathBuf;

/// Development fallback for the token signing secret. Anything signed with
/// this value is forgeable, so startup logs a warning when it is in use.
pub const INSECURE_DEV_SECRET: &str = "clave-insegura-cambiar-en-produccion";

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DATA_DIR: &str = "data";

/// Server configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Reads `PORT`, `DATA_DIR` and `JWT_SECRET` from the environment,
    /// falling back to development defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| INSECURE_DEV_SECRET.to_string());

        Self {
            port,
            data_dir,
            jwt_secret,
        }
    }

    /// True when the signing secret is still the insecure development default.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEV_SECRET
    }
}
