//! Bearer-token authentication for admin routes.
//!
//! Verifies an HS256-signed JWT from the `Authorization` header and attaches
//! the decoded claims to the request. Token issuance happens elsewhere (the
//! admin frontend obtains tokens out of band); this middleware only checks
//! signatures and expiry.

use crate::errors::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an admin token.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AdminClaims {
    /// Admin account identifier.
    pub sub: String,
    /// Expiry as a Unix timestamp.
    pub exp: usize,
}

/// Holds the decoding key so handlers never see the raw secret.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
        decode::<AdminClaims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

/// Reject the request with 401 unless it carries a valid bearer token.
///
/// On success the [`AdminClaims`] are inserted into request extensions for
/// handlers that care who acted.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = bearer else {
        return Err(AppError::unauthorized("no token provided"));
    };

    let claims = state
        .jwt
        .verify(token)
        .map_err(|_| AppError::unauthorized("invalid token"))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(secret: &str, exp: usize) -> String {
        let claims = AdminClaims {
            sub: "admin".into(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    // 2100-01-01, far enough out for any test run.
    const FUTURE_EXP: usize = 4_102_444_800;

    #[test]
    fn valid_token_round_trips_claims() {
        let verifier = JwtVerifier::new("portfolio-secret");
        let token = token_for("portfolio-secret", FUTURE_EXP);
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = JwtVerifier::new("portfolio-secret");
        let token = token_for("another-secret", FUTURE_EXP);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let verifier = JwtVerifier::new("portfolio-secret");
        assert!(verifier.verify("not.a.jwt").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = JwtVerifier::new("portfolio-secret");
        let token = token_for("portfolio-secret", 1_000);
        assert!(verifier.verify(&token).is_err());
    }
}
