use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "LENDAHAND_DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub media: MediaConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "LENDAHAND_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "LENDAHAND_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins ("*" allows any)
    #[arg(long, env = "LENDAHAND_CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    #[arg(long, env = "LENDAHAND_JWT_SECRET")]
    pub jwt_secret: String,

    /// Access token time-to-live in days
    #[arg(long, env = "LENDAHAND_TOKEN_TTL_DAYS", default_value_t = 7)]
    pub token_ttl_days: i64,

    /// Email suffix required for signup (institutional addresses only)
    #[arg(long, env = "LENDAHAND_EMAIL_DOMAIN", default_value = "@cmrcet.ac.in")]
    pub email_domain: String,
}

#[derive(Clone, Debug, Args)]
pub struct MediaConfig {
    /// S3 bucket holding item images
    #[arg(long, env = "LENDAHAND_S3_BUCKET")]
    pub bucket: String,

    /// S3 region
    #[arg(long, env = "LENDAHAND_S3_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom S3 endpoint (useful for MinIO)
    #[arg(long, env = "LENDAHAND_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// S3 access key
    #[arg(long, env = "LENDAHAND_S3_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "LENDAHAND_S3_SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Force path style (required for many MinIO setups: http://host/bucket/key)
    #[arg(long, env = "LENDAHAND_S3_FORCE_PATH_STYLE", default_value_t = false)]
    pub force_path_style: bool,

    /// Public base URL for stored images; defaults to the virtual-hosted S3 form
    #[arg(long, env = "LENDAHAND_MEDIA_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Max image size in bytes (Default: 10MB)
    #[arg(long, env = "LENDAHAND_MEDIA_MAX_SIZE_BYTES", default_value_t = 10_485_760)]
    pub max_image_size_bytes: usize,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the readiness database probe
    #[arg(long, env = "LENDAHAND_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,

    /// Timeout for the readiness media-store probe
    #[arg(long, env = "LENDAHAND_HEALTH_STORAGE_TIMEOUT_MS", default_value_t = 2000)]
    pub storage_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP endpoint for traces and metrics; exports are disabled when unset
    #[arg(long, env = "LENDAHAND_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "LENDAHAND_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
