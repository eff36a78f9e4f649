//! Secret generation.
//!
//! Produces URL-safe base64 of random bytes, suitable for
//! `FOLIO_SESSION_SECRET` (use the default of 64 bytes or more) and
//! `FOLIO_ADMIN_SECRET`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use thiserror::Error;

/// Default byte count; encodes to 86 characters, above the 64 the session
/// key requires.
pub const DEFAULT_SECRET_BYTES: usize = 64;

/// Fewest bytes accepted.
const MIN_SECRET_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    TooShort(usize),
}

/// Generate `bytes` random bytes, base64url-encoded without padding.
///
/// # Errors
///
/// Returns `SecretError::TooShort` below 16 bytes.
pub fn generate(bytes: usize) -> Result<String, SecretError> {
    if bytes < MIN_SECRET_BYTES {
        return Err(SecretError::TooShort(bytes));
    }

    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    Ok(URL_SAFE_NO_PAD.encode(buf))
}
