//! Caller authentication: bearer extraction and access-token validation.

pub mod bearer;
pub mod jwt;

pub use bearer::bearer_token;
pub use jwt::{make_jwt, AccessClaims, CredentialValidator, JwtValidator};
