//! Flat-file registry of users, stored as one pretty-printed JSON object.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
}

pub type Users = BTreeMap<String, UserRecord>;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every user. A missing file is an empty registry; unreadable or
    /// malformed content is an error.
    pub fn load(&self) -> Result<Users, CredentialError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no credential file, starting empty");
                return Ok(Users::new());
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let users: Users = serde_json::from_str(&raw).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), users = users.len(), "loaded credentials");
        Ok(users)
    }

    /// Overwrite the file with the full mapping, indented by four spaces.
    pub fn save(&self, users: &Users) -> Result<(), CredentialError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        users
            .serialize(&mut ser)
            .map_err(|source| CredentialError::Parse {
                path: self.path.clone(),
                source,
            })?;

        std::fs::write(&self.path, buf).map_err(|source| CredentialError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), users = users.len(), "saved credentials");
        Ok(())
    }
}
