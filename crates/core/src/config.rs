use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

use crate::storage::STATE_KEY;

static ENV_DATA_DIR: &str = "TALLY_DATA_DIR";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "tally-cli", "tally"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    state_path: PathBuf,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the data directory using the provided override,
    /// environment variables, and platform defaults.
    pub fn discover(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        Ok(Self::from_data_dir(data_dir))
    }

    /// Construct [`AppConfig`] directly from a resolved data directory.
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        let state_path = data_dir.join(format!("{STATE_KEY}.json"));
        Self {
            data_dir,
            state_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the persisted snapshot lives on disk.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("tmp").join("dev-tally");
        return Ok(dev_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".tally"));
    }

    Ok(env::current_dir()?.join(".tally"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn explicit_override_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("custom");
        let config = AppConfig::discover(Some(dir.clone())).unwrap();

        assert_eq!(config.data_dir(), dir.as_path());
        assert!(dir.exists());
    }

    #[test]
    fn state_path_is_inside_data_dir() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::from_data_dir(temp.path().to_path_buf());

        assert!(config.state_path().starts_with(config.data_dir()));
        assert_eq!(
            config.state_path().file_name().unwrap(),
            "tally-app-state.json"
        );
    }
}
