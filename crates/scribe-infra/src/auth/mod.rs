//! Authentication implementations.

mod jwt;

pub use jwt::{DEFAULT_JWT_SECRET, JwtConfig, JwtTokenService};
