//! airuler configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration (`airuler.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template roots, lowest precedence first
    #[serde(rename = "template-dirs")]
    pub template_dirs: Vec<PathBuf>,

    /// Directory holding vendored template repositories
    #[serde(rename = "vendor-dir")]
    pub vendor_dir: PathBuf,

    /// Vendors whose `templates/` directories are compiled, in order
    #[serde(rename = "include-vendors")]
    pub include_vendors: Vec<String>,

    /// Root of the compiled output tree
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Targets compiled when none are requested (empty means all)
    #[serde(rename = "default-targets")]
    pub default_targets: Vec<String>,

    /// Log level used when none is given on the command line
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dirs: vec![PathBuf::from("templates")],
            vendor_dir: PathBuf::from("vendors"),
            include_vendors: Vec::new(),
            output_dir: PathBuf::from("compiled"),
            default_targets: Vec::new(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// 1. Explicit path (errors are fatal)
    /// 2. `./airuler.yaml`
    /// 3. `~/.config/airuler/airuler.yaml`
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Swallows every error; the full `load` reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };
        candidates
            .iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path).ok())
            .and_then(|config| config.log_level)
    }

    /// Template roots in override order: vendors first, then project roots
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        self.include_vendors
            .iter()
            .map(|vendor| self.vendor_dir.join(vendor).join("templates"))
            .chain(self.template_dirs.iter().cloned())
            .collect()
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("airuler.yaml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("airuler").join("airuler.yaml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.template_dirs, vec![PathBuf::from("templates")]);
        assert_eq!(config.output_dir, PathBuf::from("compiled"));
        assert!(config.default_targets.is_empty());
        assert_eq!(config.source_dirs(), vec![PathBuf::from("templates")]);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("airuler.yaml");
        fs::write(
            &path,
            "template-dirs: [rules, local]\noutput-dir: out\ndefault-targets: [cursor]\nlog-level: debug\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.template_dirs, vec![PathBuf::from("rules"), PathBuf::from("local")]);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.default_targets, vec!["cursor".to_string()]);
        assert_eq!(config.vendor_dir, PathBuf::from("vendors"));
        assert_eq!(Config::load_log_level(Some(&path)), Some("debug".to_string()));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/path/that/does/not/exist/airuler.yaml");
        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }

    #[test]
    fn test_source_dirs_put_vendors_first() {
        let config = Config {
            include_vendors: vec!["acme".to_string(), "base".to_string()],
            ..Default::default()
        };

        assert_eq!(
            config.source_dirs(),
            vec![
                PathBuf::from("vendors/acme/templates"),
                PathBuf::from("vendors/base/templates"),
                PathBuf::from("templates"),
            ]
        );
    }
}
