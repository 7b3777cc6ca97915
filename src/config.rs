//! Per-repository configuration files
//!
//! Each TOML file names one repository and optionally overrides the merge
//! policy and PR filters:
//!
//! ```toml
//! owner = "mozilla"
//! repo = "kitsune"
//! merge_method = "squash"
//! inclusion_users = ["renovate", "dependabot"]
//! ```

use crate::error::{Error, Result};
use crate::types::{MergeMethod, RepositoryRef};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory scanned by `--all`
pub const CONFIG_DIR: &str = "conf.d";

/// Labels that keep a PR from being merged unless configured otherwise
pub const DEFAULT_EXCLUSION_LABELS: &[&str] = &["dontmerge", "bors-dont-merge"];

/// Authors whose PRs are merged unless configured otherwise
pub const DEFAULT_INCLUSION_USERS: &[&str] = &["renovate", "pyup-bot"];

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }),
    )
}

/// Optional overrides of the policy resolver and eligibility defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MergeOptions {
    /// Branch whose protection rules apply (default: the repo's default branch)
    #[serde(default)]
    pub main_branch: Option<String>,
    /// Merge method (default: `bors` if bors-gated, else `merge`)
    #[serde(default)]
    pub merge_method: Option<MergeMethod>,
    /// Stop after one merge per run (default: branch protection "strict")
    #[serde(default)]
    pub only_one: Option<bool>,
    /// Require a formal approval (default: derived from protection and bors.toml)
    #[serde(default)]
    pub requires_approval: Option<bool>,
    /// Labels that block merging; an empty list disables the filter
    #[serde(default, deserialize_with = "one_or_many")]
    pub exclusion_labels: Option<Vec<String>>,
    /// Only merge PRs by these authors; an empty list allows everyone
    #[serde(default, deserialize_with = "one_or_many")]
    pub inclusion_users: Option<Vec<String>>,
}

impl MergeOptions {
    /// Exclusion labels with defaults applied
    pub fn exclusion_labels(&self) -> Vec<String> {
        self.exclusion_labels.clone().unwrap_or_else(|| {
            DEFAULT_EXCLUSION_LABELS
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    /// Inclusion users with defaults applied
    pub fn inclusion_users(&self) -> Vec<String> {
        self.inclusion_users.clone().unwrap_or_else(|| {
            DEFAULT_INCLUSION_USERS
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }
}

/// One repository to process
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    /// Repository owner
    #[serde(default)]
    pub owner: String,
    /// Repository name
    #[serde(default)]
    pub repo: String,
    /// Verbose output for this repository even without `--verbose`
    #[serde(default)]
    pub verbose: bool,
    /// Policy and filter overrides
    #[serde(flatten)]
    pub options: MergeOptions,
}

impl RepoConfig {
    /// Repository this config targets
    pub fn repository(&self) -> RepositoryRef {
        RepositoryRef::new(&self.owner, &self.repo)
    }
}

/// Parse a config from TOML text
///
/// `source` names the file in error messages.
pub fn parse_config(content: &str, source: &str) -> Result<RepoConfig> {
    let config: RepoConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("failed to parse {source}: {e}")))?;

    for (key, value) in [("owner", &config.owner), ("repo", &config.repo)] {
        if value.trim().is_empty() {
            return Err(Error::Config(format!("{source}: missing config key '{key}'")));
        }
    }

    Ok(config)
}

/// Load a config file from disk
pub fn load_config(path: &Path) -> Result<RepoConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_config(&content, &path.display().to_string())
}

/// List every `*.toml` file in `dir`, sorted by name
///
/// Creates the directory if it does not exist. An empty directory is an error.
pub fn discover_configs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::Config(format!("{} is empty.", dir.display())));
    }
    Ok(paths)
}
