//! Defines the environment variables to use.
//!
//! Each variable is read once, on first access. Missing or unparsable values fall back to a default.

#![cfg(feature = "env")]

use crate::static_lazy_lock;

use std::env;

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

/// The default GitHub REST API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[cfg(feature = "env_github_token")]
static_lazy_lock! {
    /// The GitHub token, if `GITHUB_TOKEN` is set and not empty.
    pub GITHUB_TOKEN: Option<String> = env::var("GITHUB_TOKEN").ok().filter(|token| !token.is_empty());
}

#[cfg(feature = "env_github_token")]
static_lazy_lock! {
    /// The GitHub REST API root, `GITHUB_API_URL` or [`DEFAULT_GITHUB_API_URL`].
    pub GITHUB_API_URL: String = env::var("GITHUB_API_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_GITHUB_API_URL));
}

#[cfg(feature = "env_max_retries")]
static_lazy_lock! {
    /// The maximum retry limit for transactions.
    pub MAX_RETRIES: u8 = parse_env!("MAX_RETRIES" => |s| s.parse::<u8>(); anyhow).unwrap_or(5);
}

#[cfg(feature = "env_max_retries")]
static_lazy_lock! {
    /// The base delay between retries in milliseconds, multiplied by the attempt number.
    pub RETRY_DELAY_MS: u64 = parse_env!("RETRY_DELAY_MS" => |s| s.parse::<u64>(); anyhow).unwrap_or(1000);
}
