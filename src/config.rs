use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: Option<StorageConfig>,
    pub archive: Option<ArchiveConfig>,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

/// Verification settings for bearer tokens minted by the external identity
/// provider. Tokens are HS256-signed with a shared secret; this service never
/// issues tokens itself.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
}

/// Bucket-style object store holding module source PDFs, auxiliary module
/// files and assessment proof scans. Optional: without it, file endpoints
/// report the store unavailable and record-creation flows skip attachments.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub service_key: SecretString,
    pub materials_bucket: String,
    pub scans_bucket: String,
}

/// HTTP gateway that files generated PDFs into per-employee Drive folders.
/// Optional: without it, archival is skipped and the local record stands as
/// authoritative on its own.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub endpoint: String,
    pub bearer_token: SecretString,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
    pub static_dir: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Server configuration
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        // Database configuration
        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MAX_CONNECTIONS")?,
            ),
            Err(_) => Some(10), // Default value
        };
        let db_min_connections = match env::var("DATABASE_MIN_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MIN_CONNECTIONS")?,
            ),
            Err(_) => Some(1), // Default value
        };

        // Identity provider token verification
        let jwt_secret = env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET must be set")?;

        // Object storage configuration (optional)
        let storage_config = if let Ok(endpoint) = env::var("STORAGE_ENDPOINT") {
            let service_key = env::var("STORAGE_SERVICE_KEY")
                .context("STORAGE_SERVICE_KEY must be set when STORAGE_ENDPOINT is provided")?;
            let materials_bucket = env::var("STORAGE_MATERIALS_BUCKET")
                .unwrap_or_else(|_| "training-materials".to_string());
            let scans_bucket =
                env::var("STORAGE_SCANS_BUCKET").unwrap_or_else(|_| "training-scans".to_string());

            Some(StorageConfig {
                endpoint,
                service_key: SecretString::from(service_key),
                materials_bucket,
                scans_bucket,
            })
        } else {
            None
        };

        // PDF archival gateway configuration (optional)
        let archive_config = if let Ok(endpoint) = env::var("ARCHIVE_ENDPOINT") {
            let bearer_token = env::var("ARCHIVE_BEARER_TOKEN")
                .context("ARCHIVE_BEARER_TOKEN must be set when ARCHIVE_ENDPOINT is provided")?;

            Some(ArchiveConfig {
                endpoint,
                bearer_token: SecretString::from(bearer_token),
            })
        } else {
            None
        };

        // App configuration
        let environment_str =
            env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let environment = match environment_str.to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Training Backend".to_string());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            auth: AuthConfig {
                jwt_secret: SecretString::from(jwt_secret),
            },
            storage: storage_config,
            archive: archive_config,
            app: AppConfig {
                name: app_name,
                environment,
                static_dir,
                public_base_url,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    #[allow(unused)]
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }

    #[allow(unused)]
    pub fn is_development(&self) -> bool {
        self.app.environment == Environment::Development
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

// Use once_cell for a global config instance that's initialized once
use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("Config is not initialized")
}
