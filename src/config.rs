use crate::services::media_host::MediaHostSettings;
use anyhow::{Context, Result};
use clap::Parser;
use std::env;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; secrets are
/// environment-only so they never show up in process listings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub media_host: MediaHostSettings,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photography portfolio backend API")]
pub struct Args {
    /// Host to bind to (overrides PORTFOLIO_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORTFOLIO_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PORTFOLIO_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PORTFOLIO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PORTFOLIO_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PORTFOLIO_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 5000,
            Err(err) => return Err(err).context("reading PORTFOLIO_PORT"),
        };
        let env_db = env::var("PORTFOLIO_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/portfolio.db".into());

        // --- Secrets (environment only) ---
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let media_host = MediaHostSettings {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .context("CLOUDINARY_CLOUD_NAME must be set")?,
            api_key: env::var("CLOUDINARY_API_KEY").context("CLOUDINARY_API_KEY must be set")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .context("CLOUDINARY_API_SECRET must be set")?,
            api_base: env::var("CLOUDINARY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            delivery_base: env::var("CLOUDINARY_DELIVERY_BASE")
                .unwrap_or_else(|_| DEFAULT_DELIVERY_BASE.into()),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            jwt_secret,
            media_host,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
