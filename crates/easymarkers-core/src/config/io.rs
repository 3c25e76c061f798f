//! YAML configuration file I/O
//!
//! [`read_config`] is strict and reports what went wrong. [`load_config`]
//! wraps it for startup, where a broken file must never stop the engine:
//! it logs and falls back to defaults. [`save_config`] writes through a
//! temporary sibling file so an interrupted save leaves the previous file
//! intact.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and parse a YAML config; `Ok(None)` when the file does not exist
pub fn read_config<T>(path: &Path) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot read config {:?}", path));
        }
    };

    let parsed = serde_yaml::from_str(&text)
        .with_context(|| format!("Cannot parse config {:?}", path))?;
    Ok(Some(parsed))
}

/// Load a config of type `T`, substituting `T::default()` on any failure
///
/// ```ignore
/// let config: EngineConfig = load_config(&default_config_path());
/// ```
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match read_config(path) {
        Ok(Some(config)) => {
            log::info!("load_config: Read {:?}", path);
            config
        }
        Ok(None) => {
            log::info!("load_config: {:?} not found, using defaults", path);
            T::default()
        }
        Err(e) => {
            log::warn!("load_config: {:#}, using defaults", e);
            T::default()
        }
    }
}

/// Serialize `config` as YAML and replace the file at `path`
///
/// Missing parent directories are created.
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    let yaml = serde_yaml::to_string(config).context("Cannot serialize config")?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create config directory {:?}", dir))?;
    }

    let staging = staging_path(path);
    std::fs::write(&staging, yaml)
        .with_context(|| format!("Cannot write config {:?}", staging))?;
    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e).with_context(|| format!("Cannot replace config {:?}", path));
    }

    log::info!("save_config: Wrote {:?}", path);
    Ok(())
}

/// `config.yaml` -> `config.yaml.tmp` in the same directory
fn staging_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".tmp");
    PathBuf::from(raw)
}
