//! API key loading
//!
//! The key is read once at startup. A key file takes precedence; when it does
//! not exist the named environment variable is consulted instead.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a secret
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Neither the key file nor the environment variable is present
    #[error("No API key found: {path} does not exist and {env_var} is not set")]
    Missing {
        /// Key file that was looked up
        path: PathBuf,
        /// Environment variable that was looked up
        env_var: String,
    },

    /// The secret source exists but holds only whitespace
    #[error("API key in {0} is empty")]
    Empty(String),

    /// The key file exists but could not be read
    #[error("Failed to read API key file {path}: {source}")]
    Unreadable {
        /// Key file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Read a secret from a file, trimming surrounding whitespace
pub fn read_secret_file(path: &Path) -> Result<String, CredentialError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let secret = raw.trim();
    if secret.is_empty() {
        return Err(CredentialError::Empty(path.display().to_string()));
    }
    Ok(secret.to_string())
}

/// Load the API key from `path`, falling back to the `env_var` environment variable
pub fn load_api_key(path: &Path, env_var: &str) -> Result<String, CredentialError> {
    match read_secret_file(path) {
        Ok(key) => {
            debug!(path = %path.display(), "Loaded API key from file");
            Ok(key)
        }
        Err(CredentialError::Unreadable { source, .. }) if source.kind() == ErrorKind::NotFound => {
            let key = std::env::var(env_var).map_err(|_| CredentialError::Missing {
                path: path.to_path_buf(),
                env_var: env_var.to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(CredentialError::Empty(env_var.to_string()));
            }
            debug!(env_var, "Loaded API key from environment");
            Ok(key.to_string())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_secret_trims_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  sk-test-123  ").unwrap();

        let key = read_secret_file(file.path()).unwrap();
        assert_eq!(key, "sk-test-123");
    }

    #[test]
    fn test_read_secret_rejects_blank_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        let result = read_secret_file(file.path());
        assert!(matches!(result, Err(CredentialError::Empty(_))));
    }

    #[test]
    fn test_file_takes_precedence_over_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from-file").unwrap();

        let key = load_api_key(file.path(), "FINCHAT_TEST_KEY_PRECEDENCE").unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_env_fallback_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("API_KEY");

        unsafe {
            std::env::set_var("FINCHAT_TEST_KEY_FALLBACK", "from-env");
        }
        let key = load_api_key(&missing, "FINCHAT_TEST_KEY_FALLBACK").unwrap();
        assert_eq!(key, "from-env");
        unsafe {
            std::env::remove_var("FINCHAT_TEST_KEY_FALLBACK");
        }
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("API_KEY");

        let result = load_api_key(&missing, "FINCHAT_TEST_KEY_NEVER_SET");
        assert!(matches!(result, Err(CredentialError::Missing { .. })));
    }
}
