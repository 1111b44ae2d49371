// Public API - what other modules can use
pub use keys::KeyService;
pub use middleware::AdminAuth;
pub use token::{AdminClaims, TokenConfig};

pub mod keys;
pub mod middleware;
pub mod token;
