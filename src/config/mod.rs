mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/impact-rank/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("impact-rank"))
}

/// Get the default config file path (~/.config/impact-rank/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/impact-rank/config.yaml), and a missing default file yields
///   the built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

impl Config {
    /// Scoring section, or defaults when absent.
    pub fn effective_scoring(&self) -> crate::scoring::ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    /// Resolved state file path.
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state {
            Some(raw) => Ok(expand_path(raw)),
            None => crate::state::get_state_path(),
        }
    }

    /// Resolved entity data path, if configured.
    pub fn entities_path(&self) -> Option<PathBuf> {
        self.entities.as_deref().map(expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
scoring:
  policy: ema
  alpha: 0.2
entities: /data/billionaires.yaml
state: /var/lib/impact-rank/state.json
"#
        )
        .unwrap();

        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        let scoring = config.effective_scoring();
        assert_eq!(scoring.policy, Some("ema".to_string()));
        assert_eq!(scoring.alpha, Some(0.2));
        assert_eq!(
            config.entities_path(),
            Some(PathBuf::from("/data/billionaires.yaml"))
        );
        assert_eq!(
            config.state_path().unwrap(),
            PathBuf::from("/var/lib/impact-rank/state.json")
        );
    }

    #[test]
    fn test_scoring_section_layout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
scoring:
  policy: running-average
  default_weights:
    social: 3
    cultural: 1
"#
        )
        .unwrap();

        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        let weights = config.effective_scoring().initial_weights().unwrap();
        assert!((weights.get(crate::scoring::Category::Social) - 0.75).abs() < 1e-9);

        // Aggregation settings live under `scoring`, not a separate section
        let mut other = tempfile::NamedTempFile::new().unwrap();
        writeln!(other, "aggregation:\n  policy: ema").unwrap();
        assert!(load_config(Some(other.path().to_path_buf())).is_err());

        let mut top_level = tempfile::NamedTempFile::new().unwrap();
        writeln!(top_level, "default_weights:\n  social: 1").unwrap();
        assert!(load_config(Some(top_level.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "queries: []").unwrap();
        assert!(load_config(Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert!(config.scoring.is_none());
        assert_eq!(config.effective_scoring(), crate::scoring::ScoringConfig::default());
        assert!(config.entities_path().is_none());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/tmp/x.yaml"), PathBuf::from("/tmp/x.yaml"));
        assert_eq!(expand_path("relative.yaml"), PathBuf::from("relative.yaml"));
    }
}
