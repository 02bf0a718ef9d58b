// Public API - what other modules can use
pub use middleware::{require_admin, require_user};
pub use token::TokenConfig;
pub use types::{AuthenticatedUser, UserClaims, UserRole};

// Internal modules
mod middleware;
mod token;
mod types;
