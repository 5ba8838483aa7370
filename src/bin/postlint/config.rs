use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use spdlog::info;

use postlint::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CFG_FILE_NAME).exists() {
            return Some(cur_dir.join(CFG_FILE_NAME));
        }
    }

    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(|d| d.to_path_buf())) {
        if exe_dir.join(CFG_FILE_NAME).exists() {
            return Some(exe_dir.join(CFG_FILE_NAME));
        }
    }

    let cfg_file = dirs::config_dir()?.join("postlint").join(CFG_FILE_NAME);
    if cfg_file.exists() {
        return Some(cfg_file);
    }

    None
}

/// Reads the given config, or the first `postlint.toml` found. Built-in defaults when there is none.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    let config_path = match cfg_path {
        Some(path) => Some(path),
        None => get_config_path(),
    };

    let Some(config_path) = config_path else {
        return Ok((Config::default(), None));
    };

    let config = read_config(&config_path)
        .with_context(|| format!("Could not load configuration {}", config_path.display()))?;
    Ok((config, Some(config_path)))
}

pub(crate) fn log_config_source(config_path: &Option<PathBuf>) {
    match config_path {
        Some(path) => info!("Reading config from {}", path.display()),
        None => info!("No {} found, using defaults", CFG_FILE_NAME),
    }
}
