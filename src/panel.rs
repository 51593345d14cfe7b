//! Session-gated control operations
//!
//! Every operation checks the session first, then the request fields, then
//! resolves the service against the registry. Only then does anything run
//! an external command.

use std::sync::Arc;

use crate::manager::{CommandError, ControlVerb, ServiceRegistry, StatusProber, Systemctl};
use crate::session::{AuthError, Session, SessionStore};
use crate::units::{ActiveState, ServiceEntry};
use crate::users::UserDirectory;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing field: {0}")]
    BadRequest(&'static str),

    #[error("Service not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Dispatcher for panel operations
#[derive(Debug)]
pub struct Panel {
    registry: Arc<ServiceRegistry>,
    sessions: SessionStore,
    users: UserDirectory,
    systemctl: Arc<Systemctl>,
    prober: StatusProber,
}

impl Panel {
    pub fn new(registry: Arc<ServiceRegistry>, systemctl: Arc<Systemctl>, users: UserDirectory) -> Self {
        let prober = StatusProber::new(Arc::clone(&registry), Arc::clone(&systemctl));
        Self {
            registry,
            sessions: SessionStore::new(),
            users,
            systemctl,
            prober,
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn login(&self, login: Option<&str>, password: Option<&str>) -> Result<String, PanelError> {
        let login = login.ok_or(PanelError::BadRequest("login"))?;
        let password = password.ok_or(PanelError::BadRequest("password"))?;

        match self.sessions.login(&self.users, login, password).await {
            Ok(token) => {
                log::info!("User {} logged in", login);
                Ok(token)
            }
            Err(e) => {
                log::info!("Login rejected for {:?}: {}", login, e);
                Err(e.into())
            }
        }
    }

    async fn authorize(&self, key: Option<&str>) -> Result<Session, PanelError> {
        let key = key.ok_or(PanelError::Unauthorized)?;
        self.sessions.lookup(key).await.ok_or(PanelError::Unauthorized)
    }

    /// Authorize, then resolve the service name against the registry
    async fn resolve(&self, key: Option<&str>, name: Option<&str>) -> Result<(Session, ServiceEntry), PanelError> {
        let session = self.authorize(key).await?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(PanelError::BadRequest("serviceName"))?;

        let entry = self
            .registry
            .find(name)
            .await
            .ok_or_else(|| PanelError::NotFound(name.to_string()))?;

        Ok((session, entry))
    }

    pub async fn list(&self, key: Option<&str>) -> Result<Vec<ServiceEntry>, PanelError> {
        self.authorize(key).await?;
        Ok(self.registry.snapshot().await)
    }

    pub async fn status(&self, key: Option<&str>, name: Option<&str>) -> Result<ActiveState, PanelError> {
        let (_, entry) = self.resolve(key, name).await?;

        self.prober.probe(&entry).await.map_err(|e| {
            log::warn!("Status probe for {} failed: {}", entry.name(), e);
            PanelError::from(e)
        })
    }

    pub async fn control(&self, verb: ControlVerb, key: Option<&str>, name: Option<&str>) -> Result<(), PanelError> {
        let (session, entry) = self.resolve(key, name).await?;

        log::info!("{} requested {} of {}", session.username(), verb, entry.name());
        self.systemctl.control(verb, entry.name()).await.map_err(|e| {
            log::warn!("Failed to {} {}: {}", verb, entry.name(), e);
            PanelError::from(e)
        })
    }

    pub async fn stop(&self, key: Option<&str>, name: Option<&str>) -> Result<(), PanelError> {
        self.control(ControlVerb::Stop, key, name).await
    }

    pub async fn start(&self, key: Option<&str>, name: Option<&str>) -> Result<(), PanelError> {
        self.control(ControlVerb::Start, key, name).await
    }

    pub async fn restart(&self, key: Option<&str>, name: Option<&str>) -> Result<(), PanelError> {
        self.control(ControlVerb::Restart, key, name).await
    }
}
