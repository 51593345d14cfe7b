//! JSON bodies exchanged with panel clients
//!
//! Every request is a POST; the session token travels in the body as `key`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 25569;

/// `POST /login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub key: String,
}

/// `POST /services/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub key: Option<String>,
}

/// `POST /services/{status,stop,start,restart}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
}
