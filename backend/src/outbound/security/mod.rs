//! Credential adapters: bearer token signing and password hashing.

mod argon2_hasher;
mod jwt;
pub mod token_key;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt::{JwtTokenService, TOKEN_TTL_DAYS};
pub use token_key::{BuildMode, TokenKey, TokenKeyError, token_key_from_env};
