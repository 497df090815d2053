//! Password Hashing
//!
//! bcrypt hashing and verification, run on tokio's blocking pool so the
//! work factor never stalls an async worker thread. Account passwords and
//! refresh-token digests both go through here.

use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(#[from] task::JoinError),
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hashed = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// `Err` when `hash` is not a bcrypt hash
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    let matched = task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("hunter22", 4).await.unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).await.unwrap());
        assert!(!verify_password("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "-").await,
            Err(PasswordError::Bcrypt(_))
        ));
    }

    #[tokio::test]
    async fn test_cost_out_of_range_is_an_error() {
        assert!(hash_password("pw", 2).await.is_err());
    }
}
