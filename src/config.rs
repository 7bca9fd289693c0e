use std::path::PathBuf;

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

const CONFIG: &str = include_str!("../.config/config.json5");

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
}

/// Settings for the remote inference service
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InferenceConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub classification_model: String,
    pub summarization_model: String,
    pub classification_char_limit: usize,
    pub summarization_char_limit: usize,
    pub summary_max_length: u32,
    pub summary_min_length: u32,
    /// Request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/models/".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            classification_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            summarization_model: "facebook/bart-large-cnn".to_string(),
            classification_char_limit: 512,
            summarization_char_limit: 1000,
            summary_max_length: 200,
            summary_min_length: 50,
            timeout_secs: None,
            user_agent: "commentlens/0.1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl Config {
    /// Build the configuration from embedded defaults, then the user file, then
    /// `COMMENTLENS_*` environment variables (`__` separates nested keys).
    ///
    /// An explicit `config_path` must exist; the default home file is optional.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let (selected_path, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => (default_home_config_path(), false),
        };

        let builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .add_source(
                config::File::from(selected_path)
                    .format(config::FileFormat::Json5)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(PROJECT_NAME.as_str())
                    .prefix_separator("_")
                    .separator("__"),
            );

        builder.build()?.try_deserialize()
    }

    /// Only the defaults compiled into the binary
    pub fn embedded() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .build()?
            .try_deserialize()
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with("~") {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen("~", base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".commentlens-config.json5");
    }
    PathBuf::from(".commentlens-config.json5")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_embedded_matches_defaults() {
        assert_eq!(Config::embedded().unwrap(), Config::default());
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg.json5");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "{{ inference: {{ summarization_model: 'sshleifer/distilbart-cnn-12-6', timeout_secs: 30 }} }}"
        )
        .unwrap();

        let cfg = Config::from_path(Some(&path)).unwrap();
        assert_eq!(cfg.inference.summarization_model, "sshleifer/distilbart-cnn-12-6");
        assert_eq!(cfg.inference.timeout_secs, Some(30));
        assert_eq!(cfg.inference.classification_char_limit, 512);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.json5");
        assert!(Config::from_path(Some(&path)).is_err());
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        let p = PathBuf::from("/tmp/x.json5");
        assert_eq!(expand_tilde(&p), p);
    }
}
