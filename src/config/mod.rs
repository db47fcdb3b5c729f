use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::ProviderKind;
use crate::error::SearchError;

pub const HERE_KEY_ENV: &str = "HERE_API_KEY";
pub const YELP_KEY_ENV: &str = "YELP_API_KEY";

fn default_radius_miles() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_here_limit() -> u32 {
    20
}
fn default_yelp_limit() -> u32 {
    50
}
fn default_here_base_url() -> String {
    "https://discover.search.hereapi.com/v1".to_string()
}
fn default_here_geocode_url() -> String {
    "https://geocode.search.hereapi.com/v1/geocode".to_string()
}
fn default_yelp_base_url() -> String {
    "https://api.yelp.com/v3".to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// Primary category first, then additional categories
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "default_radius_miles")]
    pub radius_miles: u32,
    #[serde(default)]
    pub providers: Option<Vec<ProviderKind>>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub map: Option<PathBuf>,
    #[serde(default)]
    pub dedup: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub here: Option<HereConfig>,
    #[serde(default)]
    pub yelp: Option<YelpConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HereConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_here_base_url")]
    pub base_url: String,
    #[serde(default = "default_here_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_here_limit")]
    pub limit: u32,
}

impl Default for HereConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_here_base_url(),
            geocode_url: default_here_geocode_url(),
            timeout_secs: default_timeout_secs(),
            limit: default_here_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct YelpConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_yelp_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_yelp_limit")]
    pub limit: u32,
}

impl Default for YelpConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_yelp_base_url(),
            timeout_secs: default_timeout_secs(),
            limit: default_yelp_limit(),
        }
    }
}

impl FileConfig {
    /// Load the first parseable config file from the search paths
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config file");
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("bizmap.toml"));
    paths.push(PathBuf::from(".bizmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("bizmap").join("config.toml"));
        paths.push(config_dir.join("bizmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".bizmap.toml"));
        paths.push(home.join(".config").join("bizmap").join("config.toml"));
    }

    paths
}

/// Pick the API key for a provider.
///
/// Precedence: command line, config file, environment. Blank values count
/// as missing. A missing key is a configuration error because the provider
/// was explicitly enabled.
pub fn resolve_api_key(
    provider: ProviderKind,
    flag: Option<&str>,
    file: Option<&str>,
    env: Option<String>,
) -> Result<String, SearchError> {
    [flag.map(str::to_string), file.map(str::to_string), env]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
        .ok_or_else(|| {
            SearchError::config(format!(
                "{} API key not found; pass --{}-key or set {}",
                provider,
                provider.as_str().to_ascii_lowercase(),
                env_var_for(provider)
            ))
        })
}

pub fn env_var_for(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Here => HERE_KEY_ENV,
        ProviderKind::Yelp => YELP_KEY_ENV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            queries = ["Law Firm", "Paralegal"]
            location = "Oakland County, Michigan"
            radius_miles = 10
            providers = ["here"]
            dedup = true

            [here]
            api_key = "here-secret"
            timeout_secs = 5

            [yelp]
            base_url = "http://localhost:9000/v3"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.queries, ["Law Firm", "Paralegal"]);
        assert_eq!(config.radius_miles, 10);
        assert_eq!(config.providers, Some(vec![ProviderKind::Here]));
        assert!(config.dedup);

        let here = config.here.unwrap();
        assert_eq!(here.api_key.as_deref(), Some("here-secret"));
        assert_eq!(here.timeout_secs, 5);
        assert_eq!(here.limit, 20);
        assert_eq!(here.base_url, default_here_base_url());

        let yelp = config.yelp.unwrap();
        assert_eq!(yelp.base_url, "http://localhost:9000/v3");
        assert_eq!(yelp.limit, 50);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.radius_miles, 5);
        assert!(config.queries.is_empty());
        assert!(config.here.is_none());
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_resolve_api_key_precedence() {
        let key = resolve_api_key(
            ProviderKind::Here,
            Some("from-flag"),
            Some("from-file"),
            Some("from-env".to_string()),
        )
        .unwrap();
        assert_eq!(key, "from-flag");

        let key =
            resolve_api_key(ProviderKind::Here, Some("  "), None, Some("from-env".to_string()))
                .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = resolve_api_key(ProviderKind::Yelp, None, Some(""), None).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("YELP_API_KEY"));
        assert!(err.to_string().contains("--yelp-key"));
    }
}
