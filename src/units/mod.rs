//! Catalog entries for services reported by the OS service manager
//!
//! An entry is an immutable snapshot of one service: a status change
//! produces a new entry via [`ServiceEntry::with_status`].

mod parser;

pub use parser::{parse_line, parse_service_list, ParseError};

use serde::Serialize;

/// Canonical service status
///
/// systemctl reports two vocabularies: the SUB column of `list-units`
/// (`running`, `exited`, `dead`, ...) and the output of `is-active`
/// (`active`, `inactive`, `failed`, ...). Both fold into these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveState {
    Running,
    Exited,
    Failed,
}

impl ActiveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Exited => "exited",
            Self::Failed => "failed",
        }
    }

    /// Map a raw systemctl state token, `None` if unrecognized
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "running" | "active" | "activating" | "reloading" | "start" | "start-pre"
            | "start-post" | "auto-restart" => Some(Self::Running),
            "exited" | "dead" | "inactive" | "deactivating" | "stop" | "stop-sigterm"
            | "stop-sigkill" | "stop-post" | "final-sigterm" | "final-sigkill"
            | "condition" => Some(Self::Exited),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known state of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    name: String,
    active: ActiveState,
    description: String,
}

impl ServiceEntry {
    pub fn new(name: impl Into<String>, active: ActiveState, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active,
            description: description.into().trim_end().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> ActiveState {
        self.active
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lower-cased name used as the registry key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Copy of this entry carrying a new status
    pub fn with_status(&self, active: ActiveState) -> Self {
        Self {
            name: self.name.clone(),
            active,
            description: self.description.clone(),
        }
    }
}

/// Normalize a service name for case-insensitive lookup
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}
