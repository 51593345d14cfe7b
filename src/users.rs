//! Users allowed to log in to the panel
//!
//! Users file format, one user per line:
//!
//! ```text
//! # comment
//! benjamin:5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8
//! ```
//!
//! The second field is the lower-case hex SHA-256 of the password.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::session::AuthError;

/// Hex SHA-256 digest of a password
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// A user who may log in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    password_hash: String,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into().to_lowercase(),
        }
    }

    /// Create a user from a plaintext password
    pub fn with_password(username: impl Into<String>, password: &str) -> Self {
        Self::new(username, hash_password(password))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify(&self, candidate: &str) -> bool {
        hash_password(candidate) == self.password_hash
    }

    /// Line suitable for the users file
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.username, self.password_hash)
    }
}

/// Lookup table of users by name
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: User) {
        self.users.insert(user.username.clone(), user);
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check a username/password pair
    pub fn verify(&self, username: &str, password: &str) -> Result<&User, AuthError> {
        let user = self.get(username).ok_or(AuthError::UnknownUser)?;
        if !user.verify(password) {
            return Err(AuthError::BadPassword);
        }
        Ok(user)
    }

    /// Parse users file content; later duplicates win
    pub fn parse(content: &str) -> Result<Self, UserFileError> {
        let mut directory = Self::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((username, hash)) = line.split_once(':') else {
                return Err(UserFileError::Malformed(idx + 1));
            };
            let (username, hash) = (username.trim(), hash.trim());
            if username.is_empty() || hash.len() != 64 || hex::decode(hash).is_err() {
                return Err(UserFileError::Malformed(idx + 1));
            }

            directory.insert(User::new(username, hash));
        }

        Ok(directory)
    }

    pub async fn load(path: &Path) -> Result<Self, UserFileError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| UserFileError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&content)
    }
}

impl FromIterator<User> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut directory = Self::new();
        for user in iter {
            directory.insert(user);
        }
        directory
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed users file line {0} (expected username:sha256hex)")]
    Malformed(usize),
}
