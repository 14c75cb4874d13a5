//! Construction of the PMD command line.

use std::path::{Path, PathBuf};

use crate::config::Config;

pub const DEFAULT_JAVA: &str = "java";
pub const DEFAULT_MAIN_CLASS: &str = "net.sourceforge.pmd.PMD";

/// Builds the shell command that runs PMD with the CSV renderer.
///
/// Paths are wrapped in double quotes so that spaces survive the shell.
/// Double quotes inside the paths are not escaped.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    install_dir: PathBuf,
    ruleset: PathBuf,
    java: String,
    main_class: String,
}

impl CommandBuilder {
    pub fn new(install_dir: impl Into<PathBuf>, ruleset: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            ruleset: ruleset.into(),
            java: DEFAULT_JAVA.to_string(),
            main_class: DEFAULT_MAIN_CLASS.to_string(),
        }
    }

    /// Builder preset with the launcher settings of `config`.
    pub fn from_config(config: &Config, install_dir: &Path, ruleset: &Path) -> Self {
        Self::new(install_dir, ruleset)
            .java(config.java.clone())
            .main_class(config.main_class.clone())
    }

    pub fn java(mut self, java: impl Into<String>) -> Self {
        self.java = java.into();
        self
    }

    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = main_class.into();
        self
    }

    /// Classpath covering every jar in the installation's `lib` directory.
    pub fn classpath(&self) -> PathBuf {
        self.install_dir.join("lib").join("*")
    }

    pub fn build(&self, target: &Path) -> String {
        format!(
            "{} -cp \"{}\" {} -d \"{}\" -f csv -R \"{}\"",
            self.java,
            self.classpath().display(),
            self.main_class,
            target.display(),
            self.ruleset.display()
        )
    }
}

/// Build the PMD command with the default launcher and main class.
pub fn build_command(install_dir: &Path, ruleset: &Path, target: &Path) -> String {
    CommandBuilder::new(install_dir, ruleset).build(target)
}
