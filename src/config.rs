use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::bioc::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::harvest::{DEFAULT_MAX_PASSAGES, HarvestOptions};
use crate::pubmed::DEFAULT_RETMAX;

const MAX_CONCURRENCY: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} URL '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },

    #[error("{name} URL must use http or https, got '{value}'")]
    InvalidScheme { name: &'static str, value: String },

    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

/// Command line and environment configuration.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "HERBALIST_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// PubMed E-utilities base URL (default: NCBI production)
    #[arg(long, env = "HERBALIST_EUTILS_BASE")]
    pub eutils_base: Option<String>,

    /// BioC PMC Open Access base URL (default: NCBI production)
    #[arg(long, env = "HERBALIST_BIOC_BASE")]
    pub bioc_base: Option<String>,

    /// Articles requested per search
    #[arg(long, env = "HERBALIST_MAX_ARTICLES", default_value_t = DEFAULT_RETMAX)]
    pub max_articles: u32,

    /// Passages kept per article
    #[arg(long, env = "HERBALIST_MAX_PASSAGES", default_value_t = DEFAULT_MAX_PASSAGES)]
    pub max_passages: usize,

    /// Articles fetched at once per request (1-16)
    #[arg(long, env = "HERBALIST_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Global outbound HTTP timeout in seconds
    #[arg(long, env = "HERBALIST_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Outbound TCP connect timeout in seconds
    #[arg(long, env = "HERBALIST_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Largest BioC document accepted, in bytes; bigger ones are skipped
    #[arg(long, env = "HERBALIST_MAX_DOCUMENT_BYTES", default_value_t = DEFAULT_MAX_DOCUMENT_BYTES)]
    pub max_document_bytes: usize,
}

impl Cli {
    pub fn harvest_options(&self) -> HarvestOptions {
        HarvestOptions {
            max_articles: self.max_articles,
            max_passages: self.max_passages,
            concurrency: self.concurrency.clamp(1, MAX_CONCURRENCY),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check limits and base URL overrides before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_passages == 0 {
            return Err(ConfigError::Zero {
                name: "max-passages",
            });
        }
        if self.max_document_bytes == 0 {
            return Err(ConfigError::Zero {
                name: "max-document-bytes",
            });
        }
        if let Some(base) = &self.eutils_base {
            validate_base_url("eutils", base)?;
        }
        if let Some(base) = &self.bioc_base {
            validate_base_url("bioc", base)?;
        }
        Ok(())
    }
}

fn validate_base_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidScheme {
            name,
            value: value.to_string(),
        }),
    }
}
