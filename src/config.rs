use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Overrides `client_config.api_base_url` when set.
pub const API_URL_ENV: &str = "LINGUABRIDGE_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub client_config: ClientConfig,
    #[serde(default)]
    pub translator_config: TranslatorConfig,
}

/// Backend server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_dir() -> String {
    "frontend".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

/// Settings for the page controller and its terminal collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Program used to speak output text, e.g. `espeak`.
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_speech_command() -> String {
    "espeak".to_string()
}

fn default_speech_rate() -> f32 {
    0.9
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            speech_command: default_speech_command(),
            speech_rate: default_speech_rate(),
        }
    }
}

/// Upstream translation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_engine() -> String {
    "google".to_string()
}

fn default_upstream_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            upstream_url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = read_config_text(Path::new(path))?;
        let content = substitute_env_vars(&content);

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Load the first config that exists, starting with `explicit`, then
    /// `CONFIG_PATH`, then the default file names. An explicit path must
    /// load; when nothing is found the defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<String>)> {
        let mut config = None;

        if let Some(path) = explicit {
            let path = path.to_string_lossy().to_string();
            let loaded = Self::load(&path)
                .with_context(|| format!("Failed to load config from {}", path))?;
            config = Some((loaded, Some(path)));
        } else {
            let candidates: Vec<String> = vec![
                std::env::var("CONFIG_PATH").ok(),
                Some("linguabridge.yaml".to_string()),
                Some("linguabridge.yml".to_string()),
                Some("linguabridge.json".to_string()),
                Some("conf.yaml".to_string()),
            ]
            .into_iter()
            .flatten()
            .collect();

            for path in candidates {
                if !Path::new(&path).exists() {
                    continue;
                }
                match Self::load(&path) {
                    Ok(loaded) => {
                        config = Some((loaded, Some(path)));
                        break;
                    }
                    Err(e) => {
                        debug!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        let (mut config, path) = config.unwrap_or_else(|| (Self::default(), None));
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.client_config.api_base_url = url;
            }
        }
        Ok((config, path))
    }

    pub fn frontend_path(&self) -> PathBuf {
        PathBuf::from(&self.system_config.frontend_dir)
    }
}

/// Read a config file, honouring a UTF-8 or UTF-16 byte order mark.
pub fn read_config_text(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }
    let bytes = fs::read(path)?;
    let encoding = encoding_rs::Encoding::for_bom(&bytes)
        .map(|(encoding, _)| encoding)
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        debug!("Config {} contained invalid sequences", path.display());
    }
    Ok(text.into_owned())
}

/// Replace `${VAR_NAME}` with the environment value, leaving unknown
/// variables untouched.
pub fn substitute_env_vars(content: &str) -> String {
    let Ok(pattern) = Regex::new(r"\$\{(\w+)\}") else {
        return content.to_string();
    };
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = serde_yaml::from_str("system_config:\n  port: 8080\n").unwrap();
        assert_eq!(config.system_config.port, 8080);
        assert_eq!(config.system_config.host, "0.0.0.0");
        assert_eq!(config.client_config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.translator_config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("LINGUABRIDGE_TEST_HOST", "example.org");
        let out = substitute_env_vars("url: http://${LINGUABRIDGE_TEST_HOST}/api ${NOT_SET_ANYWHERE_42}");
        assert_eq!(out, "url: http://example.org/api ${NOT_SET_ANYWHERE_42}");
    }

    #[test]
    fn loads_yaml_with_bom() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"\xEF\xBB\xBFclient_config:\n  api_base_url: http://h/api\n")
            .unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.client_config.api_base_url, "http://h/api");
    }

    #[test]
    fn loads_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"translator_config": {"timeout_secs": 3}}"#)
            .unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.translator_config.timeout_secs, 3);
        assert_eq!(config.translator_config.engine, "google");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(Config::discover(Some(Path::new("/definitely/not/here.yaml"))).is_err());
    }
}
