use anyhow::{Context, Result};
use clap::Parser;
use std::{env, time::Duration};
use url::Url;

const DEFAULT_ARCHIVER_URL: &str = "http://localhost:9090/shuttl/rest/archiver/";
const DEFAULT_ARCHIVER_TIMEOUT_SECS: u64 = 30;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the archiver REST API, always ending in `/`.
    pub archiver_url: Url,
    /// Upper bound for a single archiver call.
    pub archiver_timeout: Duration,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Gateway for browsing and thawing archived buckets")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Archiver REST base URL (overrides BUCKET_GATEWAY_ARCHIVER_URL)
    #[arg(long)]
    pub archiver_url: Option<String>,

    /// Archiver request timeout in seconds (overrides BUCKET_GATEWAY_ARCHIVER_TIMEOUT_SECS)
    #[arg(long)]
    pub archiver_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Merge already-parsed CLI args with the environment.
    pub fn from_args(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("BUCKET_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKET_GATEWAY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKET_GATEWAY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKET_GATEWAY_PORT"),
        };
        let env_archiver = env::var("BUCKET_GATEWAY_ARCHIVER_URL")
            .unwrap_or_else(|_| DEFAULT_ARCHIVER_URL.into());
        let env_timeout = match env::var("BUCKET_GATEWAY_ARCHIVER_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("parsing BUCKET_GATEWAY_ARCHIVER_TIMEOUT_SECS value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => DEFAULT_ARCHIVER_TIMEOUT_SECS,
            Err(err) => return Err(err).context("reading BUCKET_GATEWAY_ARCHIVER_TIMEOUT_SECS"),
        };

        // --- Merge ---
        let archiver_url = parse_base_url(&args.archiver_url.unwrap_or(env_archiver))?;
        let timeout_secs = args.archiver_timeout_secs.unwrap_or(env_timeout);
        if timeout_secs == 0 {
            anyhow::bail!("archiver timeout must be at least one second");
        }

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            archiver_url,
            archiver_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses the archiver base URL and makes sure endpoint suffixes join under it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("parsing archiver URL `{}`", raw))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
