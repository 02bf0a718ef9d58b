use serde::{Deserialize, Serialize};

/// Role carried in the identity token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserClaims {
    pub sub: String, // Opaque user id
    #[serde(default)]
    pub role: UserRole,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Verified caller identity placed into request extensions
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
}

impl From<UserClaims> for AuthenticatedUser {
    fn from(claims: UserClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}
