use crate::error::AppError;
use crate::feed::DEFAULT_POSTS_URL;
use crate::storage::medium::store_dir;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKBOARD_CONFIG_PATH";
const POSTS_URL_ENV_VAR: &str = "TASKBOARD_POSTS_URL";
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(6).unwrap();

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
    #[serde(default)]
    pub posts_url: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_dir: Option<PathBuf>,
    pub posts_url: Option<String>,
    pub page_size: Option<usize>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_dir: PathBuf,
    pub posts_url: String,
    pub page_size: NonZeroUsize,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskboard")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskboard")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(store_dir) = overrides.store_dir.as_ref() {
        merged.store_dir = Some(store_dir.clone());
    }
    if let Some(posts_url) = overrides.posts_url.as_ref() {
        merged.posts_url = Some(posts_url.clone());
    }
    if let Some(page_size) = overrides.page_size {
        merged.page_size = Some(page_size);
    }

    merged
}

/// Applies defaults and environment variables on top of `config`.
pub fn resolve_settings(config: &Config) -> Result<Settings, AppError> {
    let store_dir = store_dir(config.store_dir.as_deref())?;

    let posts_url = match std::env::var(POSTS_URL_ENV_VAR) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => config
            .posts_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_POSTS_URL.to_string()),
    };

    let page_size = match config.page_size {
        Some(size) => NonZeroUsize::new(size)
            .ok_or_else(|| AppError::invalid_data("page_size must be greater than zero"))?,
        None => DEFAULT_PAGE_SIZE,
    };

    Ok(Settings {
        store_dir,
        posts_url,
        page_size,
    })
}
