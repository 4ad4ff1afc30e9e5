//! Authentication and authorization
//!
//! JWT bearer sessions with argon2 password hashing, plus the role and
//! ownership checks in [`access`].

pub mod access;
mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{authenticate, AuthUser};
pub use password::PasswordService;
