//! Application state management

use agency_client::{
    ApiClient, AuthContext, AuthGateway, EntityService, HttpAuthGateway, LogNavigator, Navigator,
    Resource, SessionHolder,
};
use agency_core::Config;
use std::sync::Arc;

use crate::{
    controller::ManagementController,
    error::AdminResult,
    routes::{self, Route},
};

/// Application state holding configuration, the shared session and clients
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Session shared by the API client and the auth context
    pub session: SessionHolder,
    /// API client for backend communication
    pub api: ApiClient,
    /// Authentication context
    pub auth: AuthContext,
    /// Where forced redirects go
    pub navigator: Arc<dyn Navigator>,
}

impl AppState {
    /// Create state from configuration with a file-backed session
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> AdminResult<Self> {
        let session = SessionHolder::from_config(&config.session)?;
        let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
        let api = ApiClient::from_config(&config.api, session.clone(), Arc::clone(&navigator))?;
        let gateway = Arc::new(HttpAuthGateway::from_config(&config, session.clone())?);
        Ok(Self::with_parts(config, session, api, gateway, navigator))
    }

    /// Assemble state from prebuilt parts
    pub fn with_parts(
        config: Config,
        session: SessionHolder,
        api: ApiClient,
        gateway: Arc<dyn AuthGateway>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = AuthContext::new(gateway, session.clone());
        Self {
            config,
            session,
            api,
            auth,
            navigator,
        }
    }

    /// Service for one resource
    pub fn service(&self, resource: Resource) -> Arc<dyn EntityService> {
        Arc::new(self.api.resource(resource))
    }

    /// Controller for one resource, paged as configured
    pub fn controller(&self, resource: Resource) -> ManagementController {
        ManagementController::new(self.service(resource))
            .with_page_size(self.config.table.page_size)
    }

    /// Route for `path` after the auth guard
    pub fn route(&self, path: &str) -> Route {
        routes::resolve(path, self.auth.is_authenticated())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use agency_client::{RecordingNavigator, StaticAuthGateway};
    use agency_core::{Session, User};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn state() -> AppState {
        let session = SessionHolder::in_memory();
        let navigator = Arc::new(RecordingNavigator::new());
        let api = ApiClient::new("http://localhost:5000/api/v1", session.clone(), navigator.clone());
        let gateway = Arc::new(StaticAuthGateway::new(session.clone()));
        AppState::with_parts(Config::default(), session, api, gateway, navigator)
    }

    #[test]
    fn test_route_follows_session() {
        let state = state();
        assert_eq!(state.route("/dashboard/content/blogs"), Route::Login);

        state
            .session
            .set(&Session {
                token: "t".to_string(),
                user: User {
                    id: "u1".to_string(),
                    email: "admin@example.com".to_string(),
                    name: Some("Admin".to_string()),
                    role: Some("admin".to_string()),
                },
            })
            .unwrap();
        assert_eq!(state.route("/login"), Route::HOME);
    }

    #[tokio::test]
    async fn test_controller_uses_resource_and_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/careers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "j1", "title": "Engineer"},
                {"_id": "j2", "title": "Designer"},
                {"_id": "j3", "title": "Marketer"},
                {"_id": "j4", "title": "Writer"}
            ])))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.table.page_size = 3;
        let session = SessionHolder::in_memory();
        let navigator = Arc::new(RecordingNavigator::new());
        let api = ApiClient::new(
            format!("{}/api/v1", server.uri()),
            session.clone(),
            navigator.clone(),
        );
        let gateway = Arc::new(StaticAuthGateway::new(session.clone()));
        let state = AppState::with_parts(config, session, api, gateway, navigator);

        let mut controller = state.controller(Resource::Careers);
        assert_eq!(controller.resource(), Resource::Careers);
        assert_eq!(state.service(Resource::Reviews).resource(), Resource::Reviews);

        controller.load().await.unwrap();
        let view = controller.table_view();
        assert_eq!(view.rows.len(), 3);
        let meta = view.pagination.unwrap();
        assert_eq!(meta.per_page, 3);
        assert_eq!(meta.total_pages, 2);
    }
}
