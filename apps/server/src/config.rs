use crate::error::{Result, WrapErr};
use config::{AppStrategy, create_strategy, resolve_dir};
use geo_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    pub runtime_dir: PathBuf,
    /// JSON snapshot of the listing table
    pub dataset_path: PathBuf,
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_config() -> Config {
    match create_strategy() {
        Ok(strategy) => Config {
            runtime_dir: resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir()),
            dataset_path: resolve_dir("DATA_DIRECTORY", &strategy, |s| Some(s.data_dir()))
                .join(config::constants::DATASET_FILE_NAME),
            search: SearchConfig::default(),
        },
        // No home directory, keep everything under the temp dir.
        Err(_) => {
            let base = std::env::temp_dir().join(config::constants::APP_NAME);
            Config {
                runtime_dir: base.clone(),
                dataset_path: base.join(config::constants::DATASET_FILE_NAME),
                search: SearchConfig::default(),
            }
        }
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        user_config.search.validate()?;
        Ok(user_config)
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;
        let config_path =
            config::config_file(&strategy, config::constants::SERVER_CONFIG_FILE_NAME);
        Self::load_or_create(&config_path)
    }

    fn load_or_create(config_path: &Path) -> Result<Config> {
        match std::fs::read_to_string(config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str)
                .wrap_err_with(|| format!("Invalid config file {config_path:?}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::create_example_config(config_path)?;
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = r#"# Nearby search server configuration
#
# Created on first run. Restart the server after editing.

# JSON array of listings to serve
# dataset-path = "/var/lib/nearby/listings.json"

# Optional: custom runtime directory (holds the unix socket)
# runtime-dir = "/custom/runtime/path"

[search]
# default-radius-m = 10000
# min-radius-m = 100
# max-radius-m = 50000
# default-limit = 50
# max-limit = 100
"#;

        std::fs::write(config_path, example_config)?;
        tracing::info!("Created example config at {:?}", config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::load_str("").unwrap();
        assert_eq!(cfg.search, SearchConfig::default());
        assert!(cfg.dataset_path.ends_with(config::constants::DATASET_FILE_NAME));
    }

    #[test]
    fn test_search_section_overrides() {
        let cfg = Config::load_str(
            r#"
dataset-path = "/tmp/listings.json"

[search]
max-radius-m = 20000
"#,
        )
        .unwrap();
        assert_eq!(cfg.dataset_path, PathBuf::from("/tmp/listings.json"));
        assert_eq!(cfg.search.max_radius_m, 20_000);
        assert_eq!(cfg.search.min_radius_m, 100);
    }

    #[test]
    fn test_invalid_search_bounds_rejected() {
        assert!(Config::load_str("[search]\ndefault-limit = 0\n").is_err());
        assert!(Config::load_str("watch-paths = []\n").is_err());
    }

    #[test]
    fn test_example_config_written_and_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(config::constants::SERVER_CONFIG_FILE_NAME);

        let cfg = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.search, SearchConfig::default());

        // Second load parses the example file itself.
        let again = Config::load_or_create(&path).unwrap();
        assert_eq!(again.search, cfg.search);
    }
}
