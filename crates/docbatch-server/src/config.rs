//! Configuration management

use docbatch_common::DocbatchError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL; the file is created on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://docbatch.db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Ingestion Configuration Constants
// ============================================================================

/// Archive entries whose name ends with this suffix hold the tabular data.
pub const DEFAULT_TARGET_SUFFIX: &str = ".csv";

/// Field delimiter. Not a comma, so decimal commas survive unquoted.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Maximum accepted upload body (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default age after which a childless batch counts as an orphan (1 hour).
pub const DEFAULT_ORPHAN_GRACE_SECS: u64 = 3600;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub ingest: IngestConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// How parent and child writes are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Batch and records (or records and batch on delete) share one transaction.
    #[default]
    Transactional,
    /// Batch and records commit separately. A failure in between leaves an
    /// orphan batch, or on delete a batch whose records are already gone.
    TwoPhase,
}

impl std::str::FromStr for WriteMode {
    type Err = DocbatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transactional" | "atomic" => Ok(WriteMode::Transactional),
            "two-phase" | "two_phase" | "twophase" => Ok(WriteMode::TwoPhase),
            other => Err(DocbatchError::config(format!(
                "Invalid write mode '{}': expected 'transactional' or 'two-phase'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Transactional => write!(f, "transactional"),
            WriteMode::TwoPhase => write!(f, "two-phase"),
        }
    }
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Case-sensitive suffix of the archive entry to decode
    pub target_suffix: String,
    /// Single-byte field delimiter of the tabular entry
    pub delimiter: u8,
    /// Upper bound on the multipart body accepted by the upload route
    pub max_upload_bytes: usize,
    pub write_mode: WriteMode,
    /// Background reaping of childless batches; `None` disables it
    pub orphan_sweep: Option<OrphanSweepConfig>,
}

/// Orphan batch sweep schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrphanSweepConfig {
    pub interval_secs: u64,
    pub grace_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            target_suffix: DEFAULT_TARGET_SUFFIX.to_string(),
            delimiter: DEFAULT_DELIMITER,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            write_mode: WriteMode::default(),
            orphan_sweep: None,
        }
    }
}

impl IngestConfig {
    /// Load ingestion settings from environment variables
    pub fn from_env() -> Result<Self, DocbatchError> {
        let target_suffix = std::env::var("INGEST_TARGET_SUFFIX")
            .unwrap_or_else(|_| DEFAULT_TARGET_SUFFIX.to_string());

        let delimiter = match std::env::var("INGEST_DELIMITER") {
            Ok(raw) => parse_delimiter(&raw)?,
            Err(_) => DEFAULT_DELIMITER,
        };

        let max_upload_bytes = std::env::var("INGEST_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let write_mode = match std::env::var("INGEST_WRITE_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => WriteMode::default(),
        };

        let orphan_sweep = std::env::var("ORPHAN_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(|interval_secs| OrphanSweepConfig {
                interval_secs,
                grace_secs: std::env::var("ORPHAN_SWEEP_GRACE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_ORPHAN_GRACE_SECS),
            });

        Ok(Self {
            target_suffix,
            delimiter,
            max_upload_bytes,
            write_mode,
            orphan_sweep,
        })
    }

    /// Validate ingestion settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target_suffix.is_empty() {
            anyhow::bail!("Ingest target suffix cannot be empty");
        }
        check_delimiter(self.delimiter)?;
        if self.max_upload_bytes == 0 {
            anyhow::bail!("Ingest max_upload_bytes must be greater than 0");
        }
        Ok(())
    }
}

/// Parse a delimiter setting: exactly one ASCII character other than a comma.
pub fn parse_delimiter(raw: &str) -> Result<u8, DocbatchError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => {
            check_delimiter(c as u8)?;
            Ok(c as u8)
        },
        _ => Err(DocbatchError::config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            raw
        ))),
    }
}

fn check_delimiter(delimiter: u8) -> Result<(), DocbatchError> {
    match delimiter {
        b',' => Err(DocbatchError::config("Delimiter cannot be a comma")),
        b'"' | b'\n' | b'\r' => Err(DocbatchError::config(format!(
            "Delimiter {:?} collides with quoting or line breaks",
            delimiter as char
        ))),
        _ => Ok(()),
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("DOCBATCH_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("DOCBATCH_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("DOCBATCH_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
            ingest: IngestConfig::from_env()?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        self.ingest.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
            ingest: IngestConfig::default(),
        }
    }
}
