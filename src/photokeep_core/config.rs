use crate::photokeep_core::error::{PhotokeepError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default fingerprint threshold: files larger than this are identified by
/// byte size instead of a content hash.
const DEFAULT_HASH_SIZE_THRESHOLD: u64 = 100 * 1024 * 1024;

const DEFAULT_WORKING_DIR: &str = ".photokeep";

/// Raw shape of config.json as written by the user.
#[derive(Deserialize, Debug)]
struct RawConfig {
    #[serde(rename = "IncomingDir")]
    incoming_dir: String,
    #[serde(rename = "LibraryDir", default)]
    library_dir: Option<String>,
    #[serde(rename = "IgnoreDirs", default)]
    ignore_dirs: Vec<String>,
    #[serde(rename = "WorkingDir", default)]
    working_dir: Option<String>,
    #[serde(rename = "HashSizeThresholdBytes", default)]
    hash_size_threshold_bytes: Option<u64>,
}

/// Fully resolved, validated settings. The core treats this as immutable.
#[derive(Debug, Clone)]
pub struct Config {
    pub library_root: PathBuf,
    pub incoming_root: PathBuf,
    pub ignore_dirs: Vec<PathBuf>,
    pub working_dir: PathBuf,
    pub hash_size_threshold: u64,
}

impl Config {
    /// Load and validate the configuration from a config.json file.
    ///
    /// Relative paths in the file resolve against the config file's own
    /// directory. `LibraryDir` defaults to that directory. The working dir
    /// is created if missing; library and incoming dirs must already exist.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(PhotokeepError::Config(format!(
                "Config file not found at {}",
                config_path.display()
            )));
        }

        let contents = fs::read_to_string(config_path)?;
        let raw: RawConfig = serde_json::from_str(&contents)
            .map_err(|e| PhotokeepError::Config(format!("Malformed config.json: {}", e)))?;

        let base_dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let incoming_root = resolve_existing_dir(&base_dir, &raw.incoming_dir, "IncomingDir")?;
        let library_root = match &raw.library_dir {
            Some(dir) => resolve_existing_dir(&base_dir, dir, "LibraryDir")?,
            None => base_dir
                .canonicalize()
                .map_err(|e| PhotokeepError::Config(format!("LibraryDir: {}", e)))?,
        };

        let working_dir = base_dir.join(
            raw.working_dir
                .as_deref()
                .unwrap_or(DEFAULT_WORKING_DIR),
        );
        if !working_dir.exists() {
            fs::create_dir_all(&working_dir)?;
        }

        // Resolved like the roots so they compare against scan paths even
        // when base_dir is reached through a symlink; a missing ignore dir
        // is not an error, it just falls back to the absolute form
        let ignore_dirs = raw
            .ignore_dirs
            .iter()
            .map(|d| {
                let joined = base_dir.join(d);
                joined
                    .canonicalize()
                    .or_else(|_| std::path::absolute(&joined))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        let config = Config {
            library_root,
            incoming_root,
            ignore_dirs,
            working_dir,
            hash_size_threshold: raw
                .hash_size_threshold_bytes
                .unwrap_or(DEFAULT_HASH_SIZE_THRESHOLD),
        };

        log::debug!("Config: {:?}", config);
        Ok(config)
    }
}

fn resolve_existing_dir(base_dir: &Path, dir: &str, key: &str) -> Result<PathBuf> {
    let path = base_dir.join(dir);
    if !path.is_dir() {
        return Err(PhotokeepError::Config(format!(
            "{} directory {} does not exist",
            key,
            path.display()
        )));
    }
    path.canonicalize()
        .map_err(|e| PhotokeepError::Config(format!("{}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    fn write_config(temp_dir: &TempDir, json: &str) -> PathBuf {
        temp_dir.child("config.json").write_str(json).unwrap();
        temp_dir.path().join("config.json")
    }

    #[test]
    fn test_minimal_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("incoming").create_dir_all().unwrap();
        let path = write_config(&temp_dir, r#"{"IncomingDir": "incoming"}"#);

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.incoming_root,
            temp_dir.path().join("incoming").canonicalize().unwrap()
        );
        assert_eq!(
            config.library_root,
            temp_dir.path().canonicalize().unwrap()
        );
        assert_eq!(config.working_dir, temp_dir.path().join(".photokeep"));
        assert!(config.working_dir.exists());
        assert_eq!(config.hash_size_threshold, 100 * 1024 * 1024);
        assert!(config.ignore_dirs.is_empty());
    }

    #[test]
    fn test_full_config() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("incoming").create_dir_all().unwrap();
        temp_dir.child("library").create_dir_all().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{
                "IncomingDir": "incoming",
                "LibraryDir": "library",
                "IgnoreDirs": ["library/skipme"],
                "WorkingDir": "work",
                "HashSizeThresholdBytes": 1024
            }"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.library_root,
            temp_dir.path().join("library").canonicalize().unwrap()
        );
        assert_eq!(config.working_dir, temp_dir.path().join("work"));
        assert_eq!(config.hash_size_threshold, 1024);
        assert_eq!(config.ignore_dirs, vec![temp_dir.path().join("library/skipme")]);
    }

    #[test]
    fn test_existing_ignore_dir_is_canonicalized() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("incoming").create_dir_all().unwrap();
        temp_dir.child("skipme").create_dir_all().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"IncomingDir": "incoming", "IgnoreDirs": ["skipme"]}"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.ignore_dirs,
            vec![temp_dir.path().join("skipme").canonicalize().unwrap()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_ignore_dirs_resolve_through_symlinked_base() {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("real/incoming").create_dir_all().unwrap();
        temp_dir.child("real/skipme").create_dir_all().unwrap();
        temp_dir
            .child("real/config.json")
            .write_str(r#"{"IncomingDir": "incoming", "IgnoreDirs": ["skipme"]}"#)
            .unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(temp_dir.path().join("real"), &link).unwrap();

        let config = Config::load(&link.join("config.json")).unwrap();

        // The library root canonicalizes through the symlink; the ignore dir
        // must land under the same resolved prefix or exclusion never matches
        assert!(config.ignore_dirs[0].starts_with(&config.library_root));
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("config.json"));
        assert!(matches!(result, Err(PhotokeepError::Config(_))));
    }

    #[test]
    fn test_missing_incoming_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "{}");
        let result = Config::load(&path);
        assert!(matches!(result, Err(PhotokeepError::Config(_))));
    }

    #[test]
    fn test_nonexistent_incoming_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"IncomingDir": "nope"}"#);
        let result = Config::load(&path);
        assert!(matches!(result, Err(PhotokeepError::Config(_))));
    }
}
