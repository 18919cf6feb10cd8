//! In-memory entity service for tests and offline use

use agency_core::{Record, types::ID_FIELD};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::{
    error::{ClientError, ClientResult},
    resources::{Capabilities, Operation, Resource},
    service::EntityService,
};

/// Failure to inject into the next call of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Behave as if the backend answered 401
    Unauthorized,
    /// Behave as if the backend answered with this status and message
    Status(u16, String),
    /// Behave as if the envelope reported `success: false`
    Rejected(String),
}

impl From<MockFailure> for ClientError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Unauthorized => Self::Unauthorized,
            MockFailure::Status(status, message) => Self::Status { status, message },
            MockFailure::Rejected(message) => Self::Rejected { message },
        }
    }
}

/// Mock entity service holding records in memory
#[derive(Debug)]
pub struct MockEntityService {
    /// Resource served
    resource: Resource,

    /// Capability override
    capabilities: Capabilities,

    /// Stored records
    records: Mutex<Vec<Record>>,

    /// Pending injected failures, per operation
    failures: Mutex<HashMap<Operation, VecDeque<MockFailure>>>,

    /// Calls received, per operation
    calls: Mutex<HashMap<Operation, usize>>,
}

impl MockEntityService {
    /// Create an empty service with the resource's real capabilities
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            capabilities: resource.capabilities(),
            records: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Seed records; missing identifiers are generated
    #[must_use]
    pub fn with_records(self, records: Vec<Record>) -> Self {
        *self.records.lock() = records.into_iter().map(Self::with_id).collect();
        self
    }

    /// Override the capability descriptor
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Make the next call of `operation` fail
    pub fn fail_next(&self, operation: Operation, failure: MockFailure) {
        self.failures
            .lock()
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Number of calls received for `operation`
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    fn with_id(record: Record) -> Record {
        let mut record = record.normalized();
        if record.id().is_none() {
            record.insert(ID_FIELD, uuid::Uuid::new_v4().simple().to_string());
        }
        record
    }

    fn enter(&self, operation: Operation) -> ClientResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        if !self.capabilities.supports(operation) {
            return Err(ClientError::Unsupported {
                resource: self.resource,
                operation,
            });
        }

        let failure = self
            .failures
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        failure.map_or(Ok(()), |failure| Err(failure.into()))
    }

    fn position(records: &[Record], id: &str) -> ClientResult<usize> {
        records
            .iter()
            .position(|record| record.id().as_deref() == Some(id))
            .ok_or_else(|| ClientError::NotFound { id: id.to_string() })
    }
}

#[async_trait]
impl EntityService for MockEntityService {
    fn resource(&self) -> Resource {
        self.resource
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn list(&self) -> ClientResult<Vec<Record>> {
        self.enter(Operation::Read)?;
        Ok(self.records())
    }

    async fn create(&self, payload: &Record) -> ClientResult<Record> {
        self.enter(Operation::Create)?;
        let mut record = payload.clone();
        record.remove(ID_FIELD);
        let record = Self::with_id(record);
        self.records.lock().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, payload: &Record) -> ClientResult<Record> {
        self.enter(Operation::Update)?;
        let mut records = self.records.lock();
        let index = Self::position(&records, id)?;
        let stored = &mut records[index];
        stored.merge_from(payload);
        stored.insert(ID_FIELD, id);
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.enter(Operation::Delete)?;
        let mut records = self.records.lock();
        let index = Self::position(&records, id)?;
        records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_assigns_id() {
        let service = MockEntityService::new(Resource::Products);
        let created = service
            .create(&Record::new().with("name", "Kit"))
            .await
            .unwrap();

        assert!(created.id().is_some());
        assert_eq!(service.records().len(), 1);
        assert_eq!(service.calls(Operation::Create), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let service = MockEntityService::new(Resource::Blogs);
        service.fail_next(Operation::Read, MockFailure::Status(503, "down".to_string()));

        assert!(matches!(
            service.list().await,
            Err(ClientError::Status { status: 503, .. })
        ));
        assert!(service.list().await.is_ok());
        assert_eq!(service.calls(Operation::Read), 2);
    }

    #[tokio::test]
    async fn test_update_respects_capabilities() {
        let service = MockEntityService::new(Resource::Reviews)
            .with_records(vec![Record::new().with("id", "r1").with("name", "Ann")]);

        let result = service.update("r1", &Record::new().with("name", "Bo")).await;
        assert!(matches!(result, Err(ClientError::Unsupported { .. })));
        assert_eq!(service.records()[0].text("name"), Some("Ann"));
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let service = MockEntityService::new(Resource::Careers);
        let result = service.delete("nope").await;
        assert!(matches!(result, Err(ClientError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let service = MockEntityService::new(Resource::Services).with_records(vec![
            Record::new()
                .with("_id", "s1")
                .with("title", "SEO")
                .with("description", "Search"),
        ]);

        let updated = service
            .update("s1", &Record::new().with("title", "SEO Audits"))
            .await
            .unwrap();

        assert_eq!(updated.text("title"), Some("SEO Audits"));
        assert_eq!(updated.text("description"), Some("Search"));
        assert_eq!(updated.id().as_deref(), Some("s1"));
    }
}
