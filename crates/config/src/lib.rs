pub mod constants;

pub use etcetera::AppStrategy;
use etcetera::{AppStrategyArgs, choose_app_strategy};

use std::path::PathBuf;
use std::env;


pub fn create_strategy() -> std::result::Result<impl AppStrategy, etcetera::HomeDirError> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: constants::TOP_LEVEL_DOMAIN.to_string(),
        author: constants::AUTHOR.to_string(),
        app_name: constants::APP_NAME.to_string(),
    })
}

/// Environment variable first, then the platform strategy, then a temp dir fallback.
pub fn resolve_dir<S, F>(env_key: &str, strategy: &S, strategy_fn: F) -> PathBuf
where
    S: AppStrategy,
    F: FnOnce(&S) -> Option<PathBuf>,
{
    env::var_os(env_key)
        .map(PathBuf::from)
        .or_else(|| strategy_fn(strategy))
        .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME))
}

/// Location of a config file named `file_name` inside the config directory.
pub fn config_file<S: AppStrategy>(strategy: &S, file_name: &str) -> PathBuf {
    resolve_dir("CONFIG_DIRECTORY", strategy, |s| Some(s.config_dir())).join(file_name)
}

/// Location of the server's Unix socket inside `runtime_dir`.
pub fn socket_path(runtime_dir: &std::path::Path) -> PathBuf {
    runtime_dir.join(constants::UNIX_SOCKET_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dir_falls_back_to_strategy() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir("NEARBY_TEST_UNSET_DIRECTORY", &strategy, |s| Some(s.cache_dir()));
        assert_eq!(dir, strategy.cache_dir());
    }

    #[test]
    fn test_resolve_dir_falls_back_to_temp_dir() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir("NEARBY_TEST_UNSET_DIRECTORY", &strategy, |_| None);
        assert_eq!(dir, env::temp_dir().join(constants::APP_NAME));
    }

    #[test]
    fn test_socket_path() {
        let path = socket_path(std::path::Path::new("/run/user/1000/nearby"));
        assert!(path.ends_with(constants::UNIX_SOCKET_FILE_NAME));
    }
}
