// Password hashing runs on the blocking pool so bcrypt's work factor does
// not stall the async workers.
use crate::error::Failure;

pub async fn hash_password(password: String, cost: u32) -> Result<String, Failure> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await?;
    hashed.map_err(|e| Failure::unclassified(anyhow::anyhow!("password hashing failed: {}", e)))
}

/// A malformed stored hash counts as a mismatch
pub async fn verify_password(password: String, hash: String) -> Result<bool, Failure> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let hash = hash_password("hunter22".into(), 4).await.unwrap();
        assert_ne!(hash, "hunter22");

        assert!(verify_password("hunter22".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter23".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_never_matches() {
        assert!(!verify_password("hunter22".into(), "plaintext".into()).await.unwrap());
    }
}
