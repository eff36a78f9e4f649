//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOLIO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `FOLIO_BASE_URL` - Public URL of the site (HTTPS enables secure cookies)
//! - `FOLIO_SESSION_SECRET` - Session cookie signing key (min 64 chars, high entropy)
//! - `FOLIO_ADMIN_SECRET` - Shared admin password (min 12 chars)
//! - `FOLIO_STORAGE_URL` - Object storage API endpoint (e.g. `https://x.supabase.co/storage/v1`)
//! - `FOLIO_STORAGE_KEY` - Object storage service key
//!
//! ## Optional
//! - `FOLIO_HOST` - Bind address (default: 127.0.0.1)
//! - `FOLIO_PORT` - Listen port (default: 3000)
//! - `FOLIO_STORAGE_BUCKET` - Bucket for project images (default: portfolio-images)
//! - `FOLIO_STORAGE_PUBLIC_URL` - Public URL prefix for stored objects
//!   (default: `<FOLIO_STORAGE_URL>/object/public/<bucket>`)
//! - `FOLIO_UPLOAD_LIMIT_BYTES` - Aggregate upload size limit (default: 10 MiB)
//! - `FOLIO_ALLOWED_ORIGIN` - Origin allowed to call the API cross-site
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Cookie signing keys must be at least 512 bits.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ADMIN_SECRET_LENGTH: usize = 12;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default aggregate upload size (10 MiB).
pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_STORAGE_BUCKET: &str = "portfolio-images";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session cookie signing key
    pub session_secret: SecretString,
    /// Shared admin password checked by login
    pub admin_secret: SecretString,
    /// Object storage for project images
    pub storage: StorageConfig,
    /// Aggregate byte limit for one project upload request
    pub upload_limit_bytes: usize,
    /// Origin allowed for cross-site API calls
    pub allowed_origin: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Object storage configuration.
///
/// There is exactly one bucket and one credential tier; both come from the
/// deployment, never from code.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct StorageConfig {
    /// Storage API endpoint, without trailing slash
    pub endpoint: String,
    /// Bucket holding project images
    pub bucket: String,
    /// Service key used as bearer token for uploads
    pub service_key: SecretString,
    /// Public URL prefix for stored objects, without trailing slash
    pub public_base: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .field("public_base", &self.public_base)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FOLIO_DATABASE_URL")?;
        let host = get_env_or_default("FOLIO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FOLIO_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("FOLIO_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FOLIO_PORT".to_string(), e.to_string()))?;
        let base_url = get_url("FOLIO_BASE_URL")?;

        let session_secret = get_validated_secret("FOLIO_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "FOLIO_SESSION_SECRET")?;

        let admin_secret = SecretString::from(get_required_env("FOLIO_ADMIN_SECRET")?);
        validate_admin_secret(&admin_secret, "FOLIO_ADMIN_SECRET")?;

        let storage = StorageConfig::from_env()?;
        let upload_limit_bytes = parse_upload_limit(get_optional_env("FOLIO_UPLOAD_LIMIT_BYTES"))?;
        let allowed_origin = get_optional_env("FOLIO_ALLOWED_ORIGIN");

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            admin_secret,
            storage,
            upload_limit_bytes,
            allowed_origin,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_url("FOLIO_STORAGE_URL")?;
        let bucket = get_env_or_default("FOLIO_STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET);
        if bucket.is_empty() || bucket.contains('/') {
            return Err(ConfigError::InvalidEnvVar(
                "FOLIO_STORAGE_BUCKET".to_string(),
                "must be a single non-empty path segment".to_string(),
            ));
        }

        let public_base = match get_optional_env("FOLIO_STORAGE_PUBLIC_URL") {
            Some(_) => get_url("FOLIO_STORAGE_PUBLIC_URL")?,
            None => default_public_base(&endpoint, &bucket),
        };

        Ok(Self {
            endpoint,
            bucket,
            service_key: get_validated_secret("FOLIO_STORAGE_KEY")?,
            public_base,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a required absolute URL, normalized without trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Public object prefix for the conventional storage API layout.
fn default_public_base(endpoint: &str, bucket: &str) -> String {
    format!("{endpoint}/object/public/{bucket}")
}

fn parse_upload_limit(raw: Option<String>) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_UPLOAD_LIMIT_BYTES);
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            "FOLIO_UPLOAD_LIMIT_BYTES".to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(limit) => Ok(limit),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "FOLIO_UPLOAD_LIMIT_BYTES".to_string(),
            e.to_string(),
        )),
    }
}

/// Validate that a session secret is long enough to key signed cookies.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Validate the admin password: minimum length and no placeholder text.
///
/// Entropy is not checked; passphrases are allowed.
fn validate_admin_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.chars().count() < MIN_ADMIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_ADMIN_SECRET_LENGTH} characters"),
        ));
    }
    check_placeholder(value, var_name)
}

fn check_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    check_placeholder(secret, var_name)?;

    // Real keys are randomly generated and have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use `folio secret generate`."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            database_url: SecretString::from("postgres://localhost/folio"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("k".repeat(64)),
            admin_secret: SecretString::from("hunter2-but-longer"),
            storage: StorageConfig {
                endpoint: "https://storage.test/storage/v1".to_string(),
                bucket: "portfolio-images".to_string(),
                service_key: SecretString::from("super_secret_service_key"),
                public_base: "https://storage.test/storage/v1/object/public/portfolio-images"
                    .to_string(),
            },
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
            allowed_origin: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"a".repeat(64), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_needs_64_chars() {
        let short = SecretString::from("x".repeat(63));
        assert!(validate_session_secret(&short, "TEST_SESSION").is_err());

        let long = SecretString::from("x".repeat(64));
        assert!(validate_session_secret(&long, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_validate_admin_secret() {
        assert!(validate_admin_secret(&SecretString::from("short"), "TEST_ADMIN").is_err());
        assert!(
            validate_admin_secret(&SecretString::from("changeme-please"), "TEST_ADMIN").is_err()
        );
        assert!(
            validate_admin_secret(&SecretString::from("tangerine orbit lamp"), "TEST_ADMIN")
                .is_ok()
        );
    }

    #[test]
    fn test_parse_upload_limit() {
        assert_eq!(parse_upload_limit(None).unwrap(), DEFAULT_UPLOAD_LIMIT_BYTES);
        assert_eq!(parse_upload_limit(Some("2048".into())).unwrap(), 2048);
        assert!(parse_upload_limit(Some("0".into())).is_err());
        assert!(parse_upload_limit(Some("ten".into())).is_err());
    }

    #[test]
    fn test_default_public_base() {
        assert_eq!(
            default_public_base("https://x.supabase.co/storage/v1", "portfolio-images"),
            "https://x.supabase.co/storage/v1/object/public/portfolio-images"
        );
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let mut config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());

        config.base_url = "https://folio.dev".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());

        assert!(debug_output.contains("portfolio-images"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
        assert!(!debug_output.contains("hunter2-but-longer"));
    }
}
