//! Layered settings: defaults, `architectum.toml`, environment

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ArchitectumError, Result};

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "architectum.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ARCHITECTUM_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root of the structure directory scanned by aggregation.
    pub structure_dir: PathBuf,
    /// Aggregation plan.
    pub plan: PathBuf,
    /// Where `extract` writes its documents.
    pub output_dir: PathBuf,
    /// Extraction worker pool size. `None` uses the number of cores.
    pub workers: Option<usize>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            structure_dir: PathBuf::from("architectum/structure"),
            plan: PathBuf::from("architectum/instructions/plan.yaml"),
            output_dir: PathBuf::from("."),
            workers: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings for this process.
    ///
    /// An explicit `config` path must exist. Without one, `architectum.toml`
    /// in the working directory is used when present.
    pub fn load(config: Option<&Path>) -> Result<Settings> {
        let settings = match config {
            Some(path) => Settings::from_file(path)?,
            None if Path::new(SETTINGS_FILE).exists() => {
                Settings::from_file(Path::new(SETTINGS_FILE))?
            }
            None => Settings::default(),
        };
        settings.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path)
            .map_err(|e| ArchitectumError::config(path, format!("cannot read settings: {e}")))?;
        toml::from_str(&text).map_err(|e| ArchitectumError::config(path, e.to_string()))
    }

    /// Apply `ARCHITECTUM_*` overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        if let Some(dir) = var("STRUCTURE_DIR") {
            self.structure_dir = PathBuf::from(dir);
        }
        if let Some(plan) = var("PLAN") {
            self.plan = PathBuf::from(plan);
        }
        if let Some(dir) = var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(workers) = var("WORKERS") {
            let parsed = workers.parse::<usize>().map_err(|_| {
                ArchitectumError::config(
                    format!("${ENV_PREFIX}WORKERS"),
                    format!("'{workers}' is not a worker count"),
                )
            })?;
            self.workers = Some(parsed);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILE);
        fs::write(&path, "structure_dir = \"out/structure\"\nworkers = 3\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.structure_dir, PathBuf::from("out/structure"));
        assert_eq!(settings.workers, Some(3));
        assert_eq!(settings.plan, Settings::default().plan);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILE);
        fs::write(&path, "structure = \"typo\"\n").unwrap();

        assert!(matches!(
            Settings::from_file(&path),
            Err(ArchitectumError::Config { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ARCHITECTUM_PLAN", "plans/main.yaml"),
            ("ARCHITECTUM_WORKERS", "8"),
            ("ARCHITECTUM_OUTPUT_DIR", ""),
        ]);
        let settings = Settings::default()
            .with_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.plan, PathBuf::from("plans/main.yaml"));
        assert_eq!(settings.workers, Some(8));
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_bad_worker_count() {
        let result = Settings::default().with_env(|k| {
            (k == "ARCHITECTUM_WORKERS").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(ArchitectumError::Config { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(Settings::load(Some(Path::new("/nope/architectum.toml"))).is_err());
    }
}
