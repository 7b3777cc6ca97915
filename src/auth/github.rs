//! GitHub token lookup

use super::AuthSource;
use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Environment variable overriding the API origin
const API_URL_ENV_VAR: &str = "GITHUB_API_URL";

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Bearer token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// API origin (None for api.github.com)
    pub api_url: Option<String>,
}

/// Find a GitHub token
///
/// Checks `GITHUB_ACCESS_TOKEN`, then `GITHUB_TOKEN`, then `gh auth token`.
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    let api_url = std::env::var(API_URL_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty());

    for var in TOKEN_ENV_VARS {
        if let Ok(token) = std::env::var(var) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!(var, "using GitHub token from environment");
                return Ok(GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar,
                    api_url,
                });
            }
        }
    }

    if let Some(token) = get_gh_cli_token().await {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            api_url,
        });
    }

    Err(Error::Auth(
        "no GitHub token found. Set GITHUB_ACCESS_TOKEN or run 'gh auth login'".to_string(),
    ))
}

async fn get_gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}
