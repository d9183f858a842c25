//! Configuration loading.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Output format for read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyConfig {
    /// JSON file holding projects, members and scores.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Log level for the `transparency` targets when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default output format for read commands.
    #[serde(default = "default_format")]
    pub default_format: OutputFormat,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./transparency-data.json")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_format() -> OutputFormat {
    OutputFormat::Text
}

impl Default for TransparencyConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: default_log_level(),
            default_format: default_format(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    // Substituted values are copied as-is, never rescanned.
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `transparency.toml` in the current directory
/// 2. `~/.config/transparency/config.toml`
///
/// Environment variable override: `TRANSPARENCY_DATA_FILE`.
pub fn load_config() -> Result<TransparencyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TransparencyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("transparency.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TransparencyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TransparencyConfig::default(),
    };

    config.data_file = PathBuf::from(resolve_env_vars(&config.data_file.to_string_lossy()));
    config.log_level = resolve_env_vars(&config.log_level);

    // A relative data file in a config file is relative to that file.
    if let Some(dir) = config_path.as_deref().and_then(Path::parent) {
        if config.data_file.is_relative() && !dir.as_os_str().is_empty() {
            config.data_file = dir.join(&config.data_file);
        }
    }

    if let Ok(data_file) = std::env::var("TRANSPARENCY_DATA_FILE") {
        config.data_file = PathBuf::from(data_file);
    }

    tracing::debug!(
        config = ?config_path,
        data_file = %config.data_file.display(),
        "loaded config"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("transparency"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TRANSPARENCY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TRANSPARENCY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_TRANSPARENCY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        std::env::remove_var("_TRANSPARENCY_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_TRANSPARENCY_SELF_VAR", "${_TRANSPARENCY_SELF_VAR}");
        assert_eq!(
            resolve_env_vars("a/${_TRANSPARENCY_SELF_VAR}/b"),
            "a/${_TRANSPARENCY_SELF_VAR}/b"
        );
        assert_eq!(resolve_env_vars("${_TRANSPARENCY_UNSET_VAR}x${"), "x${");
        std::env::remove_var("_TRANSPARENCY_SELF_VAR");
    }

    #[test]
    fn default_config() {
        let config = TransparencyConfig::default();
        assert_eq!(config.data_file, PathBuf::from("./transparency-data.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_config() {
        let toml_str = r#"
data_file = "/var/lib/transparency/data.json"
log_level = "debug"
default_format = "markdown"
"#;
        let config: TransparencyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.data_file,
            PathBuf::from("/var/lib/transparency/data.json")
        );
        assert_eq!(config.default_format, OutputFormat::Markdown);
    }

    #[test]
    fn relative_data_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transparency.toml");
        std::fs::write(&path, "data_file = \"store.json\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        if std::env::var("TRANSPARENCY_DATA_FILE").is_err() {
            assert_eq!(config.data_file, dir.path().join("store.json"));
        }
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/transparency.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
