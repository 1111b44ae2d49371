use rand::Rng;
use tracing::instrument;

use crate::shared::AppError;

/// Generation and verification of the shared secrets handed out exactly once
/// at tournament creation and participant enrollment.
///
/// Keys are human-typeable (`"lycurgus-cifera-4821"`): two dictionary words
/// plus a four-digit number. They are low-collision identifiers, not
/// cryptographic material; the stored form is always a bcrypt hash.
#[derive(Clone, Default)]
pub struct KeyService;

impl KeyService {
    pub fn new() -> Self {
        Self
    }

    /// Produces a fresh `word-word-NNNN` key.
    pub fn generate_key(&self) -> String {
        let words = petname::Petnames::default().generate_one(2, "-");
        let numero: u32 = rand::rng().random_range(1000..10000);
        format!("{words}-{numero}")
    }

    /// Adaptive salted hash of a key for at-rest storage.
    #[instrument(skip(self, plain))]
    pub fn hash_key(&self, plain: &str) -> Result<String, AppError> {
        bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|_| AppError::Internal)
    }

    /// Verifies a presented key against a stored hash. Comparison is
    /// constant-time inside bcrypt; a malformed stored hash counts as a
    /// failed verification rather than an error.
    pub fn verify_key(&self, plain: &str, hashed: &str) -> bool {
        bcrypt::verify(plain, hashed).unwrap_or(false)
    }
}
