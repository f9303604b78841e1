use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{DataError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the REST API, e.g. "https://ci.example.org/api/v2"
  pub url: String,
  /// Request timeout in seconds (transport default applies if unset)
  pub timeout_secs: Option<u64>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./mirage.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/mirage/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(DataError::Config(format!(
          "config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(DataError::Config(
        "no configuration file found; create one at ~/.config/mirage/config.yaml".to_string(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("mirage.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("mirage").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| DataError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    serde_yaml::from_str(&contents)
      .map_err(|e| DataError::Config(format!("failed to parse {}: {}", path.display(), e)))
  }

  /// Get the API token from environment variables.
  ///
  /// Checks MIRAGE_API_TOKEN.
  pub fn api_token() -> Result<String> {
    std::env::var("MIRAGE_API_TOKEN").map_err(|_| {
      DataError::Config("API token not found. Set MIRAGE_API_TOKEN environment variable.".to_string())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let yaml = "api:\n  url: https://ci.example.org/api/v2\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.url, "https://ci.example.org/api/v2");
    assert_eq!(config.api.timeout_secs, None);
  }

  #[test]
  fn test_parse_config_with_timeout() {
    let yaml = "api:\n  url: https://ci.example.org\n  timeout_secs: 30\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.timeout_secs, Some(30));
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/mirage.yaml")));
    assert!(matches!(result, Err(DataError::Config(_))));
  }
}
