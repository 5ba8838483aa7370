use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::content::content_file::DEFAULT_EXTENSIONS;
use crate::lint::LintLevel;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Paths {
    /// Root of the posts, searched recursively
    pub posts_dir: PathBuf,
    /// Where absolute image references (`/images/a.png`) resolve from
    pub assets_dir: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts_dir: PathBuf::from("."),
            assets_dir: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Defaults {
    pub post_file: String,
    pub extensions: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            post_file: "index.md".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub log: Option<Log>,
    /// Rule code to level, e.g. `unknown-field = "warning"`
    #[serde(default)]
    pub rules: BTreeMap<String, LintLevel>,
}

fn parse_path(path: PathBuf, cfg_dir: &Path) -> io::Result<PathBuf> {
    let Some(str_path) = path.to_str() else {
        return Ok(path);
    };

    if str_path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
        Ok(PathBuf::from(str_path.replacen("${exe_dir}", &exe_dir.to_string_lossy(), 1)))
    } else if str_path.starts_with("${config_dir}") {
        Ok(PathBuf::from(str_path.replacen("${config_dir}", &cfg_dir.to_string_lossy(), 1)))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str, cfg_dir: &Path) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        posts_dir: parse_path(cfg.paths.posts_dir, cfg_dir)?,
        assets_dir: cfg.paths.assets_dir.map(|p| parse_path(p, cfg_dir)).transpose()?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let cfg_dir = cfg_path.parent().unwrap_or(Path::new("."));
    parse_config(&cfg_content, cfg_dir)
}
