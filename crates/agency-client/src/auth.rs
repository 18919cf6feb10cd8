//! Authentication: the identity-provider seam and the session context

use agency_core::{Session, User, config::Config, types::unwrap_envelope};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    api_client::http_client,
    error::{ClientError, ClientResult},
    session::SessionHolder,
};

/// Login form contents
#[derive(Clone, Serialize, Validate)]
pub struct Credentials {
    /// Login email
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from raw form input
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Validate the form before anything is sent
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredentials`] naming the offending fields.
    pub fn check(&self) -> ClientResult<()> {
        self.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let message = errs
                        .first()
                        .and_then(|e| e.message.as_ref())
                        .map_or_else(|| "is invalid".to_string(), ToString::to_string);
                    format!("{field} {message}")
                })
                .collect();
            fields.sort();
            ClientError::InvalidCredentials(fields.join(", "))
        })
    }
}

/// Identity provider
#[async_trait]
pub trait AuthGateway: Send + Sync + fmt::Debug {
    /// Exchange credentials for a session
    async fn login(&self, credentials: &Credentials) -> ClientResult<Session>;

    /// Session currently held, if any
    fn current_session(&self) -> Option<Session>;
}

/// Gateway that posts credentials to the backend's login endpoint
///
/// The reply may be a bare `{token, user}` object or wrapped in an envelope.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: Client,
    login_url: String,
    session: SessionHolder,
}

impl HttpAuthGateway {
    /// Create a gateway posting to `login_url`
    pub fn new(login_url: impl Into<String>, session: SessionHolder) -> Self {
        Self::with_client(Client::new(), login_url, session)
    }

    /// Create a gateway around a preconfigured `reqwest` client
    pub fn with_client(client: Client, login_url: impl Into<String>, session: SessionHolder) -> Self {
        Self {
            client,
            login_url: login_url.into(),
            session,
        }
    }

    /// Create a gateway from configuration, applying the API timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config, session: SessionHolder) -> ClientResult<Self> {
        let path = config.auth.login_path.trim_start_matches('/');
        Ok(Self::with_client(
            http_client(&config.api)?,
            format!("{}/{path}", config.api.root()),
            session,
        ))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        credentials.check()?;

        let response = self
            .client
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;
        let status = response.status();

        // A refused login is not an expired session: no global logout here.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::InvalidCredentials(
                "email or password is incorrect".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let payload =
            unwrap_envelope(body).map_err(|message| ClientError::Rejected { message })?;
        Ok(serde_json::from_value(payload)?)
    }

    fn current_session(&self) -> Option<Session> {
        self.session.session()
    }
}

/// In-process gateway checking against accounts supplied at construction
///
/// Intended for tests and offline demos; it ships with no accounts.
#[derive(Debug, Clone)]
pub struct StaticAuthGateway {
    accounts: Vec<(String, String, User)>,
    session: SessionHolder,
}

impl StaticAuthGateway {
    /// Create a gateway with no accounts
    pub fn new(session: SessionHolder) -> Self {
        Self {
            accounts: Vec::new(),
            session,
        }
    }

    /// Register an account
    #[must_use]
    pub fn with_account(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        user: User,
    ) -> Self {
        self.accounts.push((email.into(), password.into(), user));
        self
    }
}

#[async_trait]
impl AuthGateway for StaticAuthGateway {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        credentials.check()?;

        self.accounts
            .iter()
            .find(|(email, password, _)| {
                email.eq_ignore_ascii_case(&credentials.email) && *password == credentials.password
            })
            .map(|(_, _, user)| Session {
                token: uuid::Uuid::new_v4().simple().to_string(),
                user: user.clone(),
            })
            .ok_or_else(|| {
                ClientError::InvalidCredentials("email or password is incorrect".to_string())
            })
    }

    fn current_session(&self) -> Option<Session> {
        self.session.session()
    }
}

/// Process-wide authentication state
#[derive(Debug, Clone)]
pub struct AuthContext {
    gateway: Arc<dyn AuthGateway>,
    session: SessionHolder,
}

impl AuthContext {
    /// Create a context over a gateway and the shared session
    pub fn new(gateway: Arc<dyn AuthGateway>, session: SessionHolder) -> Self {
        Self { gateway, session }
    }

    /// Attempt a login and persist the session on success
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.try_login(&Credentials::new(email, password)).await.is_ok()
    }

    /// Attempt a login, reporting why it failed
    ///
    /// # Errors
    ///
    /// Returns the gateway's error, or a storage error if the session cannot be saved.
    pub async fn try_login(&self, credentials: &Credentials) -> ClientResult<Session> {
        match self.gateway.login(credentials).await {
            Ok(session) => {
                self.session.set(&session)?;
                info!("Signed in as {}", session.user.email);
                Ok(session)
            }
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.email, e);
                Err(e)
            }
        }
    }

    /// Forget the current session
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed.
    pub fn logout(&self) -> ClientResult<()> {
        self.session.clear()?;
        info!("Signed out");
        Ok(())
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The signed-in user
    pub fn current_user(&self) -> Option<User> {
        self.gateway
            .current_session()
            .map(|session| session.user)
            .or_else(|| self.session.user())
    }
}
