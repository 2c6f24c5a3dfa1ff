// ============================================================================
// MERIDIAN - GATEWAY AUTHENTICATION
// ============================================================================
// Module: src/auth.rs
// Description: Bearer-token validation (HMAC-SHA256) and role-based
//              authorisation for the REST surface
// ============================================================================

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use meridian_shared::{Error, Result};

use crate::routes::GatewayError;
use crate::state::AppState;

/// Claims the user service signs into access tokens. Downstream handlers
/// read these from request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Staff,
    Admin,
}

impl Claims {
    pub fn role(&self) -> Role {
        match self.role.as_str() {
            "admin" => Role::Admin,
            "staff" => Role::Staff,
            _ => Role::User,
        }
    }

    /// Role whitelisting: admin passes everything, staff passes staff-level
    /// routes, a plain user only user-level ones.
    pub fn require(&self, minimum: Role) -> Result<()> {
        if self.role() >= minimum {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Users may address their own data; staff and admin anyone's.
    pub fn require_self_or_staff(&self, user_id: &str) -> Result<()> {
        if self.sub == user_id {
            return Ok(());
        }
        self.require(Role::Staff)
    }
}

/// Shared-secret token verifier.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 30;
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Middleware guarding every route nested behind it. Login, register and
/// health live outside this layer.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, GatewayError> {
    let token = bearer_token(request.headers()).ok_or(GatewayError(Error::Unauthorized))?;
    let claims = state.jwt.verify(token).map_err(GatewayError)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "gateway-test-secret-key-at-least-32-chars";

    fn token_for(role: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: "3f6f9f5a-0000-4000-8000-000000000001".to_string(),
            email: "user@example.com".to_string(),
            role: role.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_round_trip() {
        let verifier = JwtVerifier::new(SECRET);
        let claims = verifier.verify(&token_for("staff", 3600)).unwrap();
        assert_eq!(claims.role(), Role::Staff);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let result = verifier.verify(&token_for("user", -3600));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = JwtVerifier::new("a-completely-different-secret-value-here");
        assert!(verifier.verify(&token_for("user", 3600)).is_err());
    }

    #[test]
    fn test_role_ordering() {
        let admin = Claims {
            sub: "a".to_string(),
            email: String::new(),
            role: "admin".to_string(),
            exp: 0,
        };
        assert!(admin.require(Role::Admin).is_ok());
        assert!(admin.require(Role::Staff).is_ok());

        let user = Claims {
            sub: "u".to_string(),
            email: String::new(),
            role: "user".to_string(),
            exp: 0,
        };
        assert!(user.require(Role::User).is_ok());
        assert!(matches!(user.require(Role::Staff), Err(Error::Forbidden)));

        // Unknown roles degrade to the lowest privilege.
        let odd = Claims {
            sub: "o".to_string(),
            email: String::new(),
            role: "superuser".to_string(),
            exp: 0,
        };
        assert!(matches!(odd.require(Role::Admin), Err(Error::Forbidden)));
    }

    #[test]
    fn test_self_or_staff() {
        let user = Claims {
            sub: "user-1".to_string(),
            email: String::new(),
            role: "user".to_string(),
            exp: 0,
        };
        assert!(user.require_self_or_staff("user-1").is_ok());
        assert!(user.require_self_or_staff("user-2").is_err());
    }
}
