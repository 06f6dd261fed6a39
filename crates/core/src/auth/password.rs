use crate::{DentalError, DentalResult};

/// Hashes and checks passwords with bcrypt.
///
/// bcrypt is CPU-bound by design, so both operations run on tokio's blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Verified against when an account has no usable hash, so the miss costs the same.
    dummy_hash: String,
}

impl PasswordHasher {
    /// # Errors
    ///
    /// Returns [`DentalError::PasswordHash`] if `cost` is outside bcrypt's range.
    pub fn new(cost: u32) -> DentalResult<Self> {
        let dummy_hash = bcrypt::hash("dental-dummy-password", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> DentalResult<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|err| DentalError::Internal(format!("hashing task failed: {err}")))?
            .map_err(DentalError::from)
    }

    /// Checks `password` against `stored`. A missing or unreadable hash is a mismatch.
    pub async fn verify(&self, password: &str, stored: Option<&str>) -> DentalResult<bool> {
        let password = password.to_owned();
        let (hash, known) = match stored {
            Some(hash) => (hash.to_owned(), true),
            None => (self.dummy_hash.clone(), false),
        };

        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|err| DentalError::Internal(format!("hashing task failed: {err}")))?;

        match verified {
            Ok(matches) => Ok(known && matches),
            Err(err) => {
                tracing::warn!("stored password hash could not be read: {err}");
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).expect("cost 4 is valid")
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").await.expect("should hash");
        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1", Some(&hash)).await.expect("should verify"));
        assert!(!hasher.verify("secret2", Some(&hash)).await.expect("should verify"));
    }

    #[tokio::test]
    async fn test_missing_hash_never_matches() {
        let hasher = hasher();
        assert!(!hasher
            .verify("dental-dummy-password", None)
            .await
            .expect("should verify"));
    }

    #[tokio::test]
    async fn test_garbage_hash_is_a_mismatch() {
        let hasher = hasher();
        assert!(!hasher
            .verify("secret1", Some("not-a-bcrypt-hash"))
            .await
            .expect("should verify"));
    }

    #[test]
    fn test_out_of_range_cost_is_rejected() {
        assert!(matches!(
            PasswordHasher::new(2),
            Err(DentalError::PasswordHash(_))
        ));
    }
}
