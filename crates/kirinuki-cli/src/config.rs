use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use kirinuki_parse::Options;

use crate::error::CliError;

/// Load options from `explicit` if given, else from the user config file
/// when it exists, else the built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Options, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => {
                tracing::debug!("No config file, using defaults");
                return Ok(Options::default());
            }
        },
    };
    tracing::debug!(path = %path.display(), "Loading config");
    let content = std::fs::read_to_string(&path)?;
    Ok(Options::from_toml(&content)?)
}

/// Path to the user config file (XDG on Linux, AppData on Windows).
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kirinuki").map(|d| d.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "allowed_delimiters = \" \"\nparse_episode_number = false\n").unwrap();
        let options = load(Some(&path)).unwrap();
        assert_eq!(options.allowed_delimiters, " ");
        assert!(!options.parse_episode_number);
        assert!(options.parse_release_group);
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "allowed_delimiters = [").unwrap();
        let err = load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
