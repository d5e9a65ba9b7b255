use crate::middleware::correlation::CorrelationId;
use crate::routes::error::error_response;
use crate::{build_helpdesk, AppState};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Response;
use hd_core::error::{AuthError, HelpdeskError};
use hd_core::types::{AccountId, Actor};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HS256 token body; `sub` is a user or specialist id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue_token(
    keys: &JwtKeys,
    account: &AccountId,
    ttl: chrono::Duration,
) -> Result<String, AuthError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: account.to_string(),
        iat: now.timestamp().max(0) as usize,
        exp: (now + ttl).timestamp().max(0) as usize,
    };
    encode(&Header::default(), &claims, &keys.encoding).map_err(|err| {
        AuthError::InvalidCredential {
            message: err.to_string(),
        }
    })
}

pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<AccountId, AuthError> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default()).map_err(|err| {
        AuthError::InvalidCredential {
            message: err.to_string(),
        }
    })?;
    AccountId::parse(&data.claims.sub).map_err(|err| AuthError::InvalidCredential {
        message: err.to_string(),
    })
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The resolved caller. Rejects with 401 before any other extractor runs.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<CorrelationId>()
            .map(|value| value.0.clone());
        resolve_actor(state, &parts.headers)
            .map(CurrentActor)
            .map_err(|err| error_response(&err, correlation_id, state.expose_errors))
    }
}

fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Result<Actor, HelpdeskError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredential)?;
    let account = decode_token(&state.keys, token)?;
    let helpdesk = build_helpdesk(state)?;
    helpdesk.directory().resolve(&account)
}
