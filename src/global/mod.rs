use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "huddle";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".local").join("share").join(APP_DIR));
    }
    Err(anyhow!("Unable to determine data directory"))
}

pub fn context_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("context"))
}

pub fn db_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("huddle.db"))
}

/// Advisory lock file that serializes writers to `db_path` across processes.
pub fn lock_file_for(db_path: &std::path::Path) -> PathBuf {
    let mut name = db_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "huddle.db".into());
    name.push(".lock");
    db_path.with_file_name(name)
}
