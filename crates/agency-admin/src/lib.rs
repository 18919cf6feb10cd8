//! Headless admin dashboard for the agency website
//!
//! Every screen renders into plain view structs: [`DataTable`] lists records
//! with search and pagination, [`ContentModal`] hosts the entity form, and a
//! [`ManagementController`] per resource ties both to an
//! [`EntityService`](agency_client::EntityService). Inbox records are typed
//! [`DetailRecord`]s triaged through a [`TriageList`].

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::missing_errors_doc)]

pub mod callback;
pub mod controller;
pub mod detail;
pub mod error;
pub mod form;
pub mod modal;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod state;
pub mod status;
pub mod table;
pub mod triage;

pub use callback::{ActionQueue, Callback, RowAction, RowEvent};
pub use controller::{FetchTicket, LoadState, ManagementController, RefreshPolicy};
pub use detail::{
    ApplicationStatus, ContactMessage, DetailModal, DetailRecord, DetailView, InboxKind,
    JobApplication, Lead, LeadStatus, MessageStatus, Subscriber, SubscriberStatus,
};
pub use error::{AdminError, AdminResult};
pub use form::{FieldKind, FieldView, FormField, FormState};
pub use modal::{ContentModal, ModalButton, ModalFooter, ModalView};
pub use pagination::{DEFAULT_PAGE_SIZE, Pagination, PaginationMeta};
pub use routes::{AnalyticsView, DashboardRoute, Route, resolve};
pub use schema::EntitySchema;
pub use state::AppState;
pub use status::{StatusDialog, StatusKind};
pub use table::{Column, DataTable, RowActions, RowView, TableView};
pub use triage::TriageList;
