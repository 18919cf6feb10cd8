//! REST client, session handling and authentication for the agency admin dashboard
//!
//! Every request goes through [`ApiClient`], which attaches the stored bearer
//! token and turns a 401 into a global logout plus a redirect to the login route.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::missing_errors_doc)]

pub mod api_client;
pub mod auth;
pub mod error;
pub mod mock;
pub mod navigator;
pub mod resources;
pub mod service;
pub mod session;

pub use api_client::{ApiClient, ResourceClient};
pub use auth::{AuthContext, AuthGateway, Credentials, HttpAuthGateway, StaticAuthGateway};
pub use error::{ClientError, ClientResult};
pub use mock::{MockEntityService, MockFailure};
pub use navigator::{LOGIN_PATH, LogNavigator, Navigator, RecordingNavigator};
pub use resources::{Capabilities, Operation, Resource};
pub use service::EntityService;
pub use session::{FileStorage, MemoryStorage, SessionHolder, SessionStorage};
