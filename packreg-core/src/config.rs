//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "hashAlgorithm": "SHA-256",
//!   "registrar": { "id": "registrar", "passwordHash": "..." },
//!   "files": { "students": "student_records.txt", ... }
//! }
//! ```
//! Every key is optional. Keys this crate does not manage are preserved
//! when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{HashAlgorithm, PasswordHash};
use crate::services::Registrar;

const SETTINGS_FILE: &str = "settings.json";

/// Plaintext registrar password, hashed at startup
pub const REGISTRAR_PASSWORD_ENV: &str = "PACKREG_REGISTRAR_PASSWORD";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash_algorithm: Option<String>,
    #[serde(default)]
    registrar: RegistrarSettings,
    #[serde(default)]
    files: FileSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarSettings {
    #[serde(default = "default_registrar_id")]
    pub id: String,
    #[serde(default = "default_registrar_first")]
    pub first_name: String,
    #[serde(default = "default_registrar_last")]
    pub last_name: String,
    #[serde(default = "default_registrar_email")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

fn default_registrar_id() -> String {
    "registrar".to_string()
}

fn default_registrar_first() -> String {
    "Wolf".to_string()
}

fn default_registrar_last() -> String {
    "Scheduler".to_string()
}

fn default_registrar_email() -> String {
    "registrar@ncsu.edu".to_string()
}

impl Default for RegistrarSettings {
    fn default() -> Self {
        Self {
            id: default_registrar_id(),
            first_name: default_registrar_first(),
            last_name: default_registrar_last(),
            email: default_registrar_email(),
            password_hash: None,
        }
    }
}

/// Record file names, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSettings {
    pub students: String,
    pub faculty: String,
    pub courses: String,
    pub enrollments: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            students: "student_records.txt".to_string(),
            faculty: "faculty_records.txt".to_string(),
            courses: "course_records.txt".to_string(),
            enrollments: "enrollments.txt".to_string(),
        }
    }
}

/// Registration configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub hash_algorithm: Option<String>,
    pub registrar: RegistrarSettings,
    pub files: FileSettings,
    /// Plaintext from the environment; never written back
    registrar_password: Option<String>,
}

impl Config {
    /// Load config from the data directory
    ///
    /// The registrar password can be supplied via:
    /// 1. `registrar.passwordHash` in the settings file
    /// 2. Environment variable PACKREG_REGISTRAR_PASSWORD, which wins
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let registrar_password = std::env::var(REGISTRAR_PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty());

        Ok(Self {
            hash_algorithm: raw.hash_algorithm,
            registrar: raw.registrar,
            files: raw.files,
            registrar_password,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.hash_algorithm = self.hash_algorithm.clone();
        settings.registrar = self.registrar.clone();
        settings.files = self.files.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// The configured digest algorithm, SHA-256 if unset
    pub fn algorithm(&self) -> Result<HashAlgorithm> {
        match &self.hash_algorithm {
            Some(name) => name.parse(),
            None => Ok(HashAlgorithm::default()),
        }
    }

    /// Store a new registrar password as a digest
    pub fn set_registrar_password(&mut self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(Error::invalid_argument("Invalid password"));
        }
        let hash = self.algorithm()?.hash(password);
        self.registrar.password_hash = Some(hash.as_str().to_string());
        Ok(())
    }

    /// Build the registrar identity. The environment password takes
    /// priority over the stored digest; with neither, the registrar
    /// exists but cannot log in.
    pub fn registrar(&self) -> Result<Registrar> {
        let algorithm = self.algorithm()?;
        let password = match (&self.registrar_password, &self.registrar.password_hash) {
            (Some(plain), _) => Some(algorithm.hash(plain)),
            (None, Some(stored)) => Some(PasswordHash::from_stored(stored.as_str()).map_err(|_| {
                Error::config("registrar.passwordHash must be a hex digest")
            })?),
            (None, None) => None,
        };

        Ok(Registrar {
            id: self.registrar.id.clone(),
            first_name: self.registrar.first_name.clone(),
            last_name: self.registrar.last_name.clone(),
            email: self.registrar.email.clone(),
            password,
        })
    }

    pub fn students_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.files.students)
    }

    pub fn faculty_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.files.faculty)
    }

    pub fn courses_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.files.courses)
    }

    pub fn enrollments_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.files.enrollments)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("{}: {}", settings_path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.algorithm().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(config.registrar.id, "registrar");
        assert_eq!(config.files.courses, "course_records.txt");
        assert_eq!(config.enrollments_path(dir.path()), dir.path().join("enrollments.txt"));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let config = Config {
            hash_algorithm: Some("MD5".to_string()),
            ..Config::default()
        };
        let err = config.algorithm().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(config.registrar().is_err());
    }

    #[test]
    fn test_registrar_from_stored_hash() {
        let mut config = Config::default();
        config.set_registrar_password("Regi5tr@r").unwrap();

        let registrar = config.registrar().unwrap();
        let stored = registrar.password.unwrap();
        assert!(stored.verify(HashAlgorithm::Sha256, "Regi5tr@r"));
        assert!(!stored.verify(HashAlgorithm::Sha256, "wrong"));
    }

    #[test]
    fn test_registrar_without_credential() {
        let config = Config::default();
        assert!(config.registrar().unwrap().password.is_none());
    }

    #[test]
    fn test_env_password_wins() {
        let mut config = Config::default();
        config.set_registrar_password("stored").unwrap();
        config.registrar_password = Some("from-env".to_string());

        let stored = config.registrar().unwrap().password.unwrap();
        assert!(stored.verify(HashAlgorithm::Sha256, "from-env"));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"theme": "dark", "files": {"students": "people.csv"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.files.students, "people.csv");
        assert_eq!(config.files.faculty, "faculty_records.txt");

        config.hash_algorithm = Some("SHA-512".to_string());
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["hashAlgorithm"], "SHA-512");
        assert_eq!(value["files"]["students"], "people.csv");
    }

    #[test]
    fn test_env_password_is_not_saved() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.registrar_password = Some("secret".to_string());
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(!content.contains("secret"));
        assert!(!content.contains("passwordHash"));
    }

    #[test]
    fn test_malformed_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }
}
