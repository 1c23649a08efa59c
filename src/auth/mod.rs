//! Bearer-token verification for the external identity provider.
//!
//! Tokens are minted and refreshed elsewhere; this service only verifies the
//! HS256 signature with the shared secret and resolves the caller's profile
//! row per request. There is no ambient profile cache: role checks always
//! read through [`current_profile`], so a sign-out/sign-in at the provider
//! is picked up on the next request.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{ProfileRepository, UserProfile};
use crate::error::{AppError, AppResult};

/// Claims this service reads from the provider's access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the provider's user id.
    pub sub: String,
    /// Expiration time (Unix timestamp); enforced by the decoder.
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated caller, inserted as a request extension by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    #[allow(unused)]
    pub email: Option<String>,
}

pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Audience strings vary between identity-provider deployments.
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Authentication(format!("Invalid bearer token: {}", e)))?;
        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Authentication("Token subject is not a user id".to_string()))?;
        Ok(AuthUser {
            id,
            email: data.claims.email,
        })
    }
}

/// Rejects requests without a valid bearer token and makes the caller
/// available to handlers as an [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Authentication("Missing bearer token".to_string()))?;

    let user = state.jwt.verify(token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Resolve the caller's profile. Request-scoped: looked up fresh on every
/// call rather than held in a process-wide cache.
pub async fn current_profile(state: &AppState, user: &AuthUser) -> AppResult<UserProfile> {
    ProfileRepository::get(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Authorization("No profile exists for this user".to_string()))
}

pub fn require_manager(profile: &UserProfile) -> AppResult<()> {
    if profile.is_manager() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only managers may modify training modules".to_string(),
        ))
    }
}

pub fn require_recorder(profile: &UserProfile) -> AppResult<()> {
    if profile.can_record_training() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only staff and managers may record training".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp,
            email: Some("jo@example.com".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("test token encodes")
    }

    fn far_future() -> i64 {
        4102444800 // 2100-01-01
    }

    #[test]
    fn accepts_valid_token() {
        let verifier = JwtVerifier::new(&SecretString::from("super-secret".to_string()));
        let id = Uuid::new_v4();
        let user = verifier
            .verify(&token("super-secret", &id.to_string(), far_future()))
            .expect("valid token verifies");
        assert_eq!(user.id, id);
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = JwtVerifier::new(&SecretString::from("super-secret".to_string()));
        let id = Uuid::new_v4();
        assert!(verifier
            .verify(&token("other-secret", &id.to_string(), far_future()))
            .is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = JwtVerifier::new(&SecretString::from("super-secret".to_string()));
        let id = Uuid::new_v4();
        assert!(verifier
            .verify(&token("super-secret", &id.to_string(), 1000))
            .is_err());
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let verifier = JwtVerifier::new(&SecretString::from("super-secret".to_string()));
        assert!(verifier
            .verify(&token("super-secret", "not-a-uuid", far_future()))
            .is_err());
    }
}
