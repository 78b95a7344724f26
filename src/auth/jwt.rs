use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    config::JwtConfig,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,    // user id
    pub iat: i64,    // issued at (unix seconds)
    pub exp: i64,    // expires at (unix seconds)
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    /// `None` when no (or an empty) secret is configured.
    pub fn from_config(cfg: &JwtConfig) -> Option<Self> {
        let secret = cfg.secret.as_deref().filter(|s| !s.is_empty())?;
        Some(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        })
    }

    pub fn sign(&self, user_id: i64) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Other(anyhow::anyhow!("sign jwt: {e}")))?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthorized("invalid or expired token")
        })?;
        Ok(data.claims)
    }
}

/// Bearer-token authenticated user id.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = state.jwt()?;
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::unauthorized("invalid auth scheme"))?;

        let claims = keys.verify(token)?;
        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(audience: &str, ttl_minutes: i64) -> JwtConfig {
        JwtConfig {
            secret: Some("dev-secret".into()),
            issuer: "test-issuer".into(),
            audience: audience.into(),
            ttl_minutes,
        }
    }

    fn keys(cfg: &JwtConfig) -> JwtKeys {
        JwtKeys::from_config(cfg).unwrap()
    }

    #[test]
    fn missing_or_empty_secret_disables_keys() {
        let mut cfg = config("test-aud", 5);
        cfg.secret = None;
        assert!(JwtKeys::from_config(&cfg).is_none());
        cfg.secret = Some(String::new());
        assert!(JwtKeys::from_config(&cfg).is_none());
    }

    #[test]
    fn sign_and_verify() {
        let keys = keys(&config("test-aud", 5));
        let token = keys.sign(42).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_audience_is_unauthorized() {
        let token = keys(&config("test-aud", 5)).sign(42).unwrap();
        let err = keys(&config("other-aud", 5)).verify(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let keys = keys(&config("test-aud", -10));
        let token = keys.sign(42).unwrap();
        assert_eq!(keys.verify(&token).unwrap_err().kind(), ErrorKind::Unauthorized);
    }
}
