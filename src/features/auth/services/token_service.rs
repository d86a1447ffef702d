use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AdminUser, AuthenticatedUser, Claims};

/// Issued access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates HS256 access tokens for admin sessions
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    leeway_secs: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl.as_secs() as i64,
            leeway_secs: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue_token(&self, user: &AdminUser) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now,
            exp: now + self.ttl_secs,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_secs,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Auth("Invalid subject in token".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }
}
