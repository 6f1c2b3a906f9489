//! Auth service (C8): Argon2 password hashing and JWT issuance/validation.

pub mod error;
pub mod middleware;

pub use error::AuthError;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::{Store, UserId};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    secret_key: String,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, secret_key: String, token_ttl: chrono::Duration) -> Self {
        Self {
            store,
            secret_key,
            token_ttl,
        }
    }

    pub async fn register(&self, login: &str, password: &str) -> Result<UserId, AuthError> {
        if self.store.get_user_by_login(login).await?.is_some() {
            return Err(AuthError::LoginTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        let user = self.store.insert_user(login, &password_hash).await?;
        Ok(user.id)
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<(UserId, String), AuthError> {
        let user = self
            .store
            .get_user_by_login(login)
            .await?
            .ok_or(AuthError::BadCredentials)?;

        let parsed_hash =
            PasswordHash::new(&user.password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::BadCredentials)?;

        let token = self.issue_token(user.id)?;
        Ok((user.id, token))
    }

    pub fn issue_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret_key.as_bytes()),
        )
        .map_err(|_| AuthError::TokenInvalid)
    }

    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_key.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::TokenInvalid)?;

        data.claims
            .sub
            .parse()
            .map_err(|_| AuthError::TokenInvalid)
    }
}
