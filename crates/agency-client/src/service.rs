//! Entity service trait the management controllers depend on

use agency_core::Record;
use async_trait::async_trait;

use crate::{
    api_client::ResourceClient,
    error::ClientResult,
    resources::{Capabilities, Resource},
};

/// CRUD operations for one resource
///
/// The REST-backed [`ResourceClient`] and the in-memory
/// [`MockEntityService`](crate::mock::MockEntityService) both implement this,
/// so controllers can be driven without a server.
#[async_trait]
pub trait EntityService: Send + Sync {
    /// Resource served
    fn resource(&self) -> Resource;

    /// Operations the backend actually supports
    fn capabilities(&self) -> Capabilities {
        self.resource().capabilities()
    }

    /// List every record, identifiers normalized
    async fn list(&self) -> ClientResult<Vec<Record>>;

    /// Create a record
    async fn create(&self, payload: &Record) -> ClientResult<Record>;

    /// Replace a record
    async fn update(&self, id: &str, payload: &Record) -> ClientResult<Record>;

    /// Delete a record
    async fn delete(&self, id: &str) -> ClientResult<()>;
}

#[async_trait]
impl EntityService for ResourceClient {
    fn resource(&self) -> Resource {
        Self::resource(self)
    }

    async fn list(&self) -> ClientResult<Vec<Record>> {
        self.get_all().await
    }

    async fn create(&self, payload: &Record) -> ClientResult<Record> {
        Self::create(self, payload).await
    }

    async fn update(&self, id: &str, payload: &Record) -> ClientResult<Record> {
        Self::update(self, id, payload).await
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        Self::delete(self, id).await
    }
}
