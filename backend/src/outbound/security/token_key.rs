//! Token signing key loading and validation.
//!
//! The key is read from a file so it can be mounted as a secret. Debug builds
//! fall back to an ephemeral random key; release builds refuse to start
//! without a file of sufficient length.

use std::fmt;
use std::path::PathBuf;

use mockable::Env;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

const TOKEN_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
pub const TOKEN_KEY_MIN_LEN: usize = 32;
pub const KEY_FILE_ENV: &str = "LIFELINK_TOKEN_KEY_FILE";
pub const ALLOW_EPHEMERAL_ENV: &str = "LIFELINK_TOKEN_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const FINGERPRINT_BYTES: usize = 8;
const EPHEMERAL_KEY_LEN: usize = 64;

/// Build mode for key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key file and warn.
    Debug,
    /// Release builds require a key file.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Secret used to sign bearer tokens. Zeroized on drop.
#[derive(Clone)]
pub struct TokenKey(Zeroizing<Vec<u8>>);

impl TokenKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Random key for development use.
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; EPHEMERAL_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Truncated SHA-256 of the key, safe to log.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lifelink::outbound::security::TokenKey;
    ///
    /// let fp = TokenKey::from_bytes(vec![b'a'; 32]).fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.as_bytes());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenKey").field(&self.fingerprint()).finish()
    }
}

/// Errors raised while loading the token key.
#[derive(thiserror::Error, Debug)]
pub enum TokenKeyError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("LIFELINK_TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the token signing key according to environment toggles.
///
/// # Examples
///
/// ```rust
/// use lifelink::outbound::security::{BuildMode, token_key_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("token_key_example");
/// std::fs::write(&key_path, vec![b'a'; 32])?;
///
/// let key_path = key_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "LIFELINK_TOKEN_KEY_FILE" => Some(key_path.clone()),
///     _ => None,
/// });
///
/// let key = token_key_from_env(&env, BuildMode::Release)?;
/// assert_eq!(key.as_bytes().len(), 32);
/// # Ok(())
/// # }
/// ```
pub fn token_key_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<TokenKey, TokenKeyError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| TOKEN_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < TOKEN_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(TokenKeyError::KeyTooShort {
                    path,
                    length,
                    min_len: TOKEN_KEY_MIN_LEN,
                });
            }
            Ok(TokenKey::from_bytes(bytes))
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token key (dev only)"
                );
                Ok(TokenKey::generate())
            } else {
                Err(TokenKeyError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenKeyError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenKeyError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid LIFELINK_TOKEN_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenKeyError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
