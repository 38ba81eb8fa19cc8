use crate::constants::*;
use crate::coordinator::CoordinatorConfig;
use crate::error::{ClientError, Result};
use config::{AppStrategy, constants as config_constants, create_strategy, resolve_dir};
use geo_search::Origin;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    /// Where to start when the command line gives no position
    pub home: Option<Origin>,

    // === System state ===
    pub runtime_dir: PathBuf,
    pub config_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
struct RawConfig {
    runtime_dir: Option<PathBuf>,
    debounce_ms: u64,
    page_size: usize,
    default_radius_m: u32,
    request_timeout_ms: u64,
    min_movement_m: f64,
    home: Option<Origin>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            runtime_dir: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
            default_radius_m: DEFAULT_RADIUS_M,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            min_movement_m: DEFAULT_MIN_MOVEMENT_M,
            home: None,
        }
    }
}

impl Config {
    fn from_raw(raw: RawConfig, runtime_dir: PathBuf, config_path: PathBuf) -> Result<Self> {
        // The upper bound comes from the server, see `CoordinatorConfig::fit_to`.
        if raw.page_size == 0 {
            return Err(ClientError::Invalid {
                key: "page-size",
                reason: "must be positive".to_string(),
            });
        }
        if raw.request_timeout_ms == 0 {
            return Err(ClientError::Invalid {
                key: "request-timeout-ms",
                reason: "must be positive".to_string(),
            });
        }
        if !raw.min_movement_m.is_finite() || raw.min_movement_m < 0.0 {
            return Err(ClientError::Invalid {
                key: "min-movement-m",
                reason: format!("{} is not a distance", raw.min_movement_m),
            });
        }

        Ok(Self {
            coordinator: CoordinatorConfig {
                debounce: Duration::from_millis(raw.debounce_ms),
                page_size: raw.page_size,
                radius_m: raw.default_radius_m,
                request_timeout: Duration::from_millis(raw.request_timeout_ms),
                min_movement_m: raw.min_movement_m,
                ..Default::default()
            },
            home: raw.home,
            runtime_dir: raw.runtime_dir.unwrap_or(runtime_dir),
            config_path,
        })
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy().map_err(|_| ClientError::HomeDirNotFound)?;

        let config_path = config::config_file(&strategy, config_constants::CLIENT_CONFIG_FILE_NAME);
        let runtime_dir = resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir());

        Self::load_path(&config_path, runtime_dir)
    }

    fn load_path(config_path: &Path, runtime_dir: PathBuf) -> Result<Config> {
        let raw_config: RawConfig = match std::fs::read_to_string(config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
            Err(source) => {
                return Err(ClientError::Io {
                    path: config_path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_raw(raw_config, runtime_dir, config_path.to_path_buf())
    }

    pub fn load_str(config_str: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(config_str)?;

        let strategy = create_strategy().map_err(|_| ClientError::HomeDirNotFound)?;
        let config_path = config::config_file(&strategy, config_constants::CLIENT_CONFIG_FILE_NAME);
        let runtime_dir = resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir());

        Self::from_raw(raw, runtime_dir, config_path)
    }

    pub fn socket_path(&self) -> PathBuf {
        config::socket_path(&self.runtime_dir)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_str("").expect("Failed to load config");

        assert_eq!(cfg.coordinator.debounce, Duration::from_millis(400));
        assert_eq!(cfg.coordinator.request_timeout, Duration::from_secs(15));
        assert_eq!(cfg.coordinator.radius_m, 10_000);
        assert_eq!(cfg.coordinator.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.home, None);
    }

    #[test]
    fn test_load_config_values() {
        const USER_CONFIG: &str = r#"
        debounce-ms = 250
        page-size = 6
        runtime-dir = "/tmp/nearby-test"
        home = { lat = 51.1, lng = 71.399 }
        "#;

        let cfg = Config::load_str(USER_CONFIG).expect("Failed to load config");

        assert_eq!(cfg.coordinator.debounce, Duration::from_millis(250));
        assert_eq!(cfg.coordinator.page_size, 6);
        assert_eq!(cfg.coordinator.min_movement_m, DEFAULT_MIN_MOVEMENT_M);
        assert_eq!(cfg.home, Some(Origin::try_new(51.1, 71.399).unwrap()));
        assert!(cfg.socket_path().starts_with("/tmp/nearby-test"));
    }

    #[test]
    fn test_load_config_unknown_field() {
        let err = Config::load_str("page_size = 5").unwrap_err();
        assert!(err.to_string().contains("unknown field `page_size`"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::load_str("page-size = 0"),
            Err(ClientError::Invalid { key: "page-size", .. })
        ));
        // Larger pages are cut down to the server's maximum at startup.
        let cfg = Config::load_str("page-size = 500").unwrap();
        assert_eq!(cfg.coordinator.page_size, 500);
        assert!(matches!(
            Config::load_str("request-timeout-ms = 0"),
            Err(ClientError::Invalid { key: "request-timeout-ms", .. })
        ));
        assert!(Config::load_str("home = { lat = 91.0, lng = 0.0 }").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_path(&dir.path().join("client.toml"), dir.path().to_path_buf())
            .unwrap();
        assert_eq!(cfg.runtime_dir, dir.path());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"min-movement-m = 10.0\n").unwrap();
        let cfg = Config::load_path(file.path(), dir.path().to_path_buf()).unwrap();
        assert_eq!(cfg.coordinator.min_movement_m, 10.0);
    }
}
