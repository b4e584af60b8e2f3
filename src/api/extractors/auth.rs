use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::auth::{Claims, Identity};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{Span, warn};

/// Audience the identity provider stamps on tokens meant for this service.
pub const TOKEN_AUDIENCE: &str = "studio-booking";

pub struct AuthUser(pub Identity);

pub struct AdminUser(pub Identity);

enum TokenSource {
    Bearer(String),
    Cookie(String),
}

fn token_source(parts: &Parts) -> Result<TokenSource, AppError> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AppError::Unauthorized)?;
        let token = value.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        return Ok(TokenSource::Bearer(token.trim().to_string()));
    }

    let cookies = parts.extensions.get::<Cookies>()
        .ok_or_else(|| AppError::InternalWithMsg("Cookie layer missing".into()))?;
    let access_token = cookies.get("access_token").ok_or(AppError::Unauthorized)?;
    Ok(TokenSource::Cookie(access_token.value().to_string()))
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let source = token_source(parts)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT public key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let token = match &source {
            TokenSource::Bearer(t) | TokenSource::Cookie(t) => t,
        };
        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| {
                warn!("Rejected access token: {}", e);
                AppError::Unauthorized
            })?
            .claims;

        // Cookies ride along automatically, so mutating cookie requests must echo the CSRF claim.
        if matches!(source, TokenSource::Cookie(_)) && !is_safe_method(&parts.method) {
            let header_val = parts.headers.get("X-CSRF-Token")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?;
            if claims.csrf.as_deref() != Some(header_val) {
                return Err(AppError::Forbidden("CSRF token mismatch".into()));
            }
        }

        let identity = Identity {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
            name: claims.name,
        };

        Span::current().record("user_id", identity.user_id.as_str());

        Ok(AuthUser(identity))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(AdminUser(identity))
    }
}
