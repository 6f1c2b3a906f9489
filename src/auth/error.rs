use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login already registered")]
    LoginTaken,

    /// Folds "unknown login" and "wrong password" into one kind. The HTTP
    /// contract must not let a caller distinguish the two.
    #[error("bad credentials")]
    BadCredentials,

    #[error("token invalid or expired")]
    TokenInvalid,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
