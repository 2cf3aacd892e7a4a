//! Session resolution
//!
//! A profile directory has at most one active identity. The hosted backend
//! wins whenever a stored credential still checks out; otherwise a local
//! demo record is used if demo sign-in is enabled; otherwise the member is a
//! guest. The two backends are never merged.

use crate::config::MemberConfig;
use crate::error::{Result, SdkError};
use crate::gateway::{HttpGateway, RemoteGateway};
use crate::store::{keys, LocalStore};
use air_backend_client::{AuthSession, AuthUser, BackendError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity used for demo sign-in
pub const DEMO_USER_ID: &str = "demo-user";
/// Email used when demo sign-in is started without one
pub const DEFAULT_DEMO_EMAIL: &str = "demo@airmembers.org";

/// Which backend is authoritative for the identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Remote,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: String,
    pub email: String,
    pub mode: SessionMode,
}

/// Demo record as found on disk. Fields are optional so that an incomplete
/// record is treated as absent rather than undecodable.
#[derive(Debug, Deserialize)]
struct DemoRecord {
    id: Option<String>,
    email: Option<String>,
}

/// Resolved session, dispatched on by every data operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Remote {
        id: String,
        email: String,
        access_token: String,
    },
    Demo {
        id: String,
        email: String,
    },
    Guest,
}

impl Session {
    pub fn identity(&self) -> Option<SessionIdentity> {
        match self {
            Session::Remote { id, email, .. } => Some(SessionIdentity {
                id: id.clone(),
                email: email.clone(),
                mode: SessionMode::Remote,
            }),
            Session::Demo { id, email } => Some(SessionIdentity {
                id: id.clone(),
                email: email.clone(),
                mode: SessionMode::Demo,
            }),
            Session::Guest => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Session::Guest)
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Remote { id, .. } | Session::Demo { id, .. } => Some(id.as_str()),
            Session::Guest => None,
        }
    }
}

/// Resolves and changes the active session for one profile directory
pub struct SessionResolver {
    config: MemberConfig,
    store: LocalStore,
    /// `None` when no backend is configured
    gateway: Option<Arc<dyn RemoteGateway>>,
}

impl SessionResolver {
    pub fn new(config: MemberConfig, store: LocalStore, gateway: Option<Arc<dyn RemoteGateway>>) -> Self {
        Self {
            config,
            store,
            gateway,
        }
    }

    /// Resolver over the profile directory in `config`, talking to the
    /// hosted backend when one is configured
    pub fn from_config(config: MemberConfig) -> Result<Self> {
        let store = LocalStore::new(&config.data_dir);
        let gateway = match &config.backend {
            Some(settings) => {
                let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpGateway::shared(settings)?);
                Some(gateway)
            }
            None => None,
        };
        Ok(Self::new(config, store, gateway))
    }

    pub fn config(&self) -> &MemberConfig {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn gateway(&self) -> Option<Arc<dyn RemoteGateway>> {
        self.gateway.clone()
    }

    /// Current identity, or `None` for a guest. Read-only.
    pub async fn resolve_session(&self) -> Option<SessionIdentity> {
        self.session().await.identity()
    }

    /// Current session
    pub async fn session(&self) -> Session {
        if let Some(remote) = self.remote_session().await {
            return remote;
        }

        match self.demo_session().await {
            Some(demo) => demo,
            None => Session::Guest,
        }
    }

    async fn remote_session(&self) -> Option<Session> {
        let gateway = self.gateway.as_ref()?;
        let credential: AuthSession = self.store.read_optional(keys::REMOTE_SESSION).await?;

        match gateway.current_user(&credential.access_token).await {
            Ok(user) => remote_identity(user, credential.access_token),
            Err(BackendError::Unauthorized(reason)) => {
                debug!(%reason, "stored credential rejected");
                let refresh_token = credential.refresh_token.as_deref()?;
                self.refresh_remote(&**gateway, refresh_token).await
            }
            Err(e) => {
                warn!(error = %e, "could not confirm remote session, falling back");
                None
            }
        }
    }

    /// Trade the stored refresh token for a new credential, once. The new
    /// credential replaces the stored one.
    async fn refresh_remote(&self, gateway: &dyn RemoteGateway, refresh_token: &str) -> Option<Session> {
        let renewed = match gateway.refresh_session(refresh_token).await {
            Ok(renewed) => renewed,
            Err(e) => {
                debug!(error = %e, "credential refresh failed");
                return None;
            }
        };

        if let Err(e) = self.store.write(keys::REMOTE_SESSION, &renewed).await {
            warn!(error = %e, "could not store refreshed credential");
        }
        info!(user_id = %renewed.user.id, "remote session refreshed");
        remote_identity(renewed.user, renewed.access_token)
    }

    async fn demo_session(&self) -> Option<Session> {
        if !self.config.demo_auth_enabled {
            return None;
        }

        let record: DemoRecord = self.store.read_optional(keys::DEMO_SESSION).await?;
        match (record.id, record.email) {
            (Some(id), Some(email)) if !id.is_empty() && !email.is_empty() => {
                Some(Session::Demo { id, email })
            }
            _ => None,
        }
    }

    /// Start a local demo session. Blank or missing email uses the default.
    /// Returns `None` when demo sign-in is disabled.
    pub async fn begin_demo_session(&self, email: Option<&str>) -> Result<Option<SessionIdentity>> {
        if !self.config.demo_auth_enabled {
            return Ok(None);
        }

        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_DEMO_EMAIL);
        let identity = SessionIdentity {
            id: DEMO_USER_ID.to_string(),
            email: email.to_string(),
            mode: SessionMode::Demo,
        };

        self.store.write(keys::DEMO_SESSION, &identity).await?;
        info!(email = %identity.email, "demo session started");
        Ok(Some(identity))
    }

    pub async fn end_demo_session(&self) -> Result<()> {
        self.store.remove(keys::DEMO_SESSION).await
    }

    fn require_gateway(&self) -> Result<&Arc<dyn RemoteGateway>> {
        self.gateway.as_ref().ok_or(SdkError::BackendNotConfigured)
    }

    /// Password sign-in against the hosted backend. Replaces any demo
    /// session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        let gateway = self.require_gateway()?;
        let email = require_credentials(email, password)?;

        let credential = gateway.sign_in(email, password).await?;
        self.store.write(keys::REMOTE_SESSION, &credential).await?;
        self.end_demo_session().await?;

        info!(user_id = %credential.user.id, "signed in");
        Ok(SessionIdentity {
            email: credential.user.email.clone().unwrap_or_else(|| email.to_string()),
            id: credential.user.id,
            mode: SessionMode::Remote,
        })
    }

    /// Create an account on the hosted backend. Does not sign in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let gateway = self.require_gateway()?;
        let email = require_credentials(email, password)?;

        let user = gateway.sign_up(email, password).await?;
        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Drop every credential for this profile. A failed remote revoke is
    /// logged; the local credential is removed either way.
    pub async fn sign_out(&self) -> Result<()> {
        let credential: Option<AuthSession> = self.store.read_optional(keys::REMOTE_SESSION).await;

        if let (Some(gateway), Some(credential)) = (&self.gateway, &credential) {
            if let Err(e) = gateway.sign_out(&credential.access_token).await {
                warn!(error = %e, "remote sign-out failed");
            }
        }

        self.store.remove(keys::REMOTE_SESSION).await?;
        self.end_demo_session().await?;
        info!("signed out");
        Ok(())
    }
}

fn remote_identity(user: AuthUser, access_token: String) -> Option<Session> {
    match user {
        AuthUser {
            id,
            email: Some(email),
        } if !id.is_empty() && !email.is_empty() => Some(Session::Remote {
            id,
            email,
            access_token,
        }),
        _ => {
            debug!("stored credential has no usable identity");
            None
        }
    }
}

fn require_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SdkError::Validation("email and password are required".into()));
    }
    Ok(email)
}
