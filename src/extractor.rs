//! Bearer-token extraction and the authorization model.

use axum::{extract::FromRequestParts, http::StatusCode, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::APP_CONFIG;
use crate::entities::teaching_class;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub role: UserRole,
    pub exp: i64,
}

impl TokenClaims {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Single authorization gate for class-scoped mutations: admins and the
    /// owning teacher may manage the class's sessions and scores.
    pub fn can_manage_class(&self, class: &teaching_class::Model) -> bool {
        self.is_admin() || (self.role == UserRole::Teacher && self.user_id == class.teacher_id)
    }
}

/// Extracts verified token claims from the `Authorization: Bearer` header.
pub struct AuthClaims(pub TokenClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing or malformed Authorization header".to_string(),
                    )
                })?;

        let token_data = decode::<TokenClaims>(
            bearer.token(),
            &DecodingKey::from_secret(APP_CONFIG.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("Invalid token: {}", e)))?;

        Ok(AuthClaims(token_data.claims))
    }
}
