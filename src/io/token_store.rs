//! Credential file persistence for the CLI.
//!
//! The library keeps the bearer token in a [`SessionContext`]; only the
//! command-line front end needs it to survive between invocations, so it
//! writes the token to a file it owns.
//!
//! [`SessionContext`]: crate::auth::SessionContext

use crate::error::{IoError, Result};
use std::path::{Path, PathBuf};

/// File name of the stored token inside the config directory.
const TOKEN_FILE: &str = "token";

/// Application directory name under the user config directory.
const APP_DIR: &str = "ragchat";

/// Reads and writes the bearer token file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default token location: `<config dir>/ragchat/token`.
    ///
    /// Falls back to `.ragchat/token` in the current directory when the
    /// platform has no config directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(format!(".{APP_DIR}")).join(TOKEN_FILE),
            |dir| dir.join(APP_DIR).join(TOKEN_FILE),
        )
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token.
    ///
    /// Returns `None` if no token file exists or it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IoError::TokenRead {
                path: self.path.to_string_lossy().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Stores a token, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn save(&self, token: &str) -> Result<()> {
        let path_str = self.path.to_string_lossy().to_string();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| IoError::CreateDir {
                path: parent.to_string_lossy().to_string(),
                reason: e.to_string(),
            })?;
        }

        std::fs::write(&self.path, token).map_err(|e| IoError::TokenWrite {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| IoError::TokenWrite {
                    path: path_str,
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Removes the stored token.
    ///
    /// Returns true if a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(IoError::TokenWrite {
                path: self.path.to_string_lossy().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("nested").join("token"));

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_whitespace_only_file_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(TokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_default_path_ends_with_token() {
        let path = TokenStore::default_path();
        assert!(path.ends_with("ragchat/token") || path.ends_with(".ragchat/token"));
    }
}
