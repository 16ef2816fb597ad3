//! Completion API credentials
//!
//! The API key never lives in `config.toml`. It is read from `ANTHROPIC_API_KEY`
//! or from `~/.config/smart-reviews/secrets.toml`, which must be private to its
//! owner (0600 on Unix).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const TEMPLATE: &str = r#"# Smart Reviews credentials
# Keep this file private (chmod 600). ANTHROPIC_API_KEY takes precedence.

[anthropic]
# Key used to generate review summaries and keywords
api_key = ""
"#;

/// Contents of the secrets file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub anthropic: AnthropicSecrets,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnthropicSecrets {
    pub api_key: Option<String>,
}

/// Where a resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    SecretsFile,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "{} environment variable", API_KEY_ENV),
            KeySource::SecretsFile => write!(f, "secrets file"),
        }
    }
}

impl Secrets {
    /// Load the secrets file at its default location, if present
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a secrets file, refusing one readable by group or others
    pub fn load_from_file(path: &Path) -> Result<Self> {
        check_private(path)?;

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        secrets.anthropic.api_key = secrets
            .anthropic
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(secrets)
    }

    /// `~/.config/smart-reviews/secrets.toml`
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("smart-reviews").join("secrets.toml"))
    }

    /// Resolve the API key, preferring the environment over the file
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key().map(|(key, _)| key)
    }

    /// Resolve the API key together with its origin
    pub fn resolve_api_key(&self) -> Option<(String, KeySource)> {
        let resolved = pick_key(
            std::env::var(API_KEY_ENV).ok(),
            self.anthropic.api_key.as_deref(),
        );
        if let Some((_, source)) = &resolved {
            debug!(source = %source, "Resolved completion API key");
        }
        resolved
    }

    /// Write an empty secrets file at the default location
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::write_template(&path)?;
        Ok(path)
    }

    /// Write an empty secrets file with owner-only permissions
    ///
    /// An existing file is never overwritten.
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, TEMPLATE)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %path.display(), "Created secrets file");
        Ok(())
    }
}

fn pick_key(env: Option<String>, file: Option<&str>) -> Option<(String, KeySource)> {
    let env = env.map(|key| key.trim().to_string()).filter(|key| !key.is_empty());
    if let Some(key) = env {
        return Some((key, KeySource::Environment));
    }

    file.map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| (key.to_string(), KeySource::SecretsFile))
}

#[cfg(unix)]
fn check_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} has insecure permissions {:o}; run chmod 600 {}",
            path.display(),
            mode,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_private(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_environment_wins_over_file() {
        let picked = pick_key(Some(" sk-env ".to_string()), Some("sk-file"));
        assert_eq!(picked, Some(("sk-env".to_string(), KeySource::Environment)));
    }

    #[test]
    fn test_blank_environment_falls_back_to_file() {
        let picked = pick_key(Some("  ".to_string()), Some("sk-file"));
        assert_eq!(picked, Some(("sk-file".to_string(), KeySource::SecretsFile)));
        assert_eq!(pick_key(None, Some("")), None);
        assert_eq!(pick_key(None, None), None);
    }

    #[test]
    fn test_template_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("secrets.toml");

        Secrets::write_template(&path).unwrap();

        // The empty placeholder does not count as a key
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert!(secrets.anthropic.api_key.is_none());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_template_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[anthropic]\napi_key = \"keep\"\n").unwrap();

        let err = Secrets::write_template(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("keep"));
    }

    #[cfg(unix)]
    #[test]
    fn test_group_readable_file_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[anthropic]\napi_key = \"sk\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let err = Secrets::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_key_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[anthropic]\napi_key = \"  sk-ant-test  \"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        let secrets = Secrets::load_from_file(&path).unwrap();
        assert_eq!(secrets.anthropic.api_key.as_deref(), Some("sk-ant-test"));
    }
}
