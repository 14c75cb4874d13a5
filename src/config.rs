use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use apex_pmd_report::Thresholds;
use serde::Deserialize;

use crate::command::{DEFAULT_JAVA, DEFAULT_MAIN_CLASS};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// PMD installation directory (the one containing `lib/`)
    pub pmd_path: Option<PathBuf>,
    /// Ruleset XML passed to PMD with `-R`
    pub ruleset: Option<PathBuf>,
    /// Priorities at or below this are errors
    pub error_threshold: i64,
    /// Priorities at or below this (and above the error threshold) are warnings
    pub warning_threshold: i64,
    /// Java launcher used to start PMD
    pub java: String,
    /// PMD entry point class
    pub main_class: String,
    /// Seconds to wait for PMD before giving up
    pub timeout: u64,
    /// Language server: analyse a file when it is opened
    pub run_on_open: bool,
    /// Language server: analyse a file when it is saved
    pub run_on_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            pmd_path: None,
            ruleset: None,
            error_threshold: thresholds.error,
            warning_threshold: thresholds.warning,
            java: DEFAULT_JAVA.to_string(),
            main_class: DEFAULT_MAIN_CLASS.to_string(),
            timeout: 120,
            run_on_open: true,
            run_on_save: true,
        }
    }
}

impl Config {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.error_threshold, self.warning_threshold)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Make relative `pmd_path`/`ruleset` relative to `base` instead of the
    /// working directory.
    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.pmd_path, &mut self.ruleset].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[derive(Default, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn pmd_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pmd_path = Some(path.into());
        self
    }

    pub fn ruleset(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ruleset = Some(path.into());
        self
    }

    pub fn thresholds(mut self, error: i64, warning: i64) -> Self {
        self.config.error_threshold = error;
        self.config.warning_threshold = warning;
        self
    }

    pub fn java(mut self, java: impl Into<String>) -> Self {
        self.config.java = java.into();
        self
    }

    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.config.main_class = main_class.into();
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout = seconds;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Settings that override a loaded [`Config`], e.g. from command-line flags
/// or language server initialization options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub pmd_path: Option<PathBuf>,
    #[serde(alias = "ruleset")]
    pub ruleset_path: Option<PathBuf>,
    pub error_threshold: Option<i64>,
    pub warning_threshold: Option<i64>,
    pub java: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(path) = self.pmd_path {
            config.pmd_path = Some(path);
        }
        if let Some(path) = self.ruleset_path {
            config.ruleset = Some(path);
        }
        if let Some(error) = self.error_threshold {
            config.error_threshold = error;
        }
        if let Some(warning) = self.warning_threshold {
            config.warning_threshold = warning;
        }
        if let Some(java) = self.java {
            config.java = java;
        }
    }
}

const CANDIDATE_NAMES: &[&str] = &[".apex-pmd.toml", "apex-pmd.toml"];

fn parse_config_str(s: &str, path: &Path) -> io::Result<Config> {
    toml::from_str::<Config>(s).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid config {}: {e}", path.display()),
        )
    })
}

fn read_config(path: &Path) -> io::Result<Config> {
    log::debug!("Reading config from: {}", path.display());
    let s = fs::read_to_string(path)?;
    let mut config = parse_config_str(&s, path)?;
    if let Some(base) = path.parent() {
        config.resolve_relative_to(base);
    }
    if !config.thresholds().is_ordered() {
        log::warn!(
            "error_threshold ({}) is not below warning_threshold ({}) in {}",
            config.error_threshold,
            config.warning_threshold,
            path.display()
        );
    }
    log::info!("Loaded config from: {}", path.display());
    Ok(config)
}

fn find_in_tree(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        for name in CANDIDATE_NAMES {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

fn xdg_config_path() -> Option<PathBuf> {
    let p = dirs::config_dir()?.join("apex-pmd").join("config.toml");
    p.is_file().then_some(p)
}

/// Load configuration with precedence:
/// 1) explicit path (error if unreadable/invalid)
/// 2) walk up from start_dir: .apex-pmd.toml, apex-pmd.toml
/// 3) user config dir: apex-pmd/config.toml
/// 4) default config
pub fn load(explicit: Option<&Path>, start_dir: &Path) -> io::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = read_config(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    if let Some(p) = find_in_tree(start_dir) {
        match read_config(&p) {
            Ok(cfg) => return Ok((cfg, Some(p))),
            Err(e) => log::warn!("Ignoring {}: {}", p.display(), e),
        }
    }

    if let Some(p) = xdg_config_path()
        && let Ok(cfg) = read_config(&p)
    {
        return Ok((cfg, Some(p)));
    }

    log::debug!("No config file found, using defaults");
    Ok((Config::default(), None))
}
