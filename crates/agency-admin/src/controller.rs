//! CRUD orchestration shared by every content management screen
//!
//! A controller fetches its resource, feeds the records to a [`DataTable`],
//! hosts the entity form inside a [`ContentModal`] and routes destructive
//! actions through a confirm [`StatusDialog`]. Failures never escape as panics:
//! each one is mirrored into the banner or a status dialog and returned.

use agency_client::{ClientResult, EntityService, Resource};
use agency_core::{Record, types::ID_FIELD};
use std::{collections::BTreeSet, fmt, future::Future, sync::Arc};
use tracing::{debug, error, info, warn};

use crate::{
    callback::{ActionQueue, RowAction, RowEvent},
    error::{AdminError, AdminResult},
    form::{FieldView, FormState},
    modal::{ContentModal, ModalButton, ModalView},
    schema::EntitySchema,
    status::StatusDialog,
    table::{DataTable, RowActions, TableView},
};

/// Lifecycle of the record list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Fetch in flight
    Loading,
    /// List populated
    Ready,
    /// Last fetch failed; the list may be stale or empty
    Error(String),
}

/// How local state catches up with the server after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// List the resource again
    Refetch,
    /// Patch the local list with the server's reply
    #[default]
    Splice,
}

/// Identifies one fetch; only the most recent ticket may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone)]
struct Editor {
    mode: EditorMode,
    form: FormState,
}

/// Controller for one content resource
pub struct ManagementController {
    service: Arc<dyn EntityService>,
    schema: EntitySchema,
    policy: RefreshPolicy,
    state: LoadState,
    records: Vec<Record>,
    table: DataTable,
    modal: ContentModal,
    editor: Option<Editor>,
    viewing: Option<Record>,
    status: Option<StatusDialog>,
    banner: Option<String>,
    pending_delete: Option<String>,
    local_only: BTreeSet<String>,
    latest_fetch: u64,
    row_events: ActionQueue<RowEvent>,
    modal_events: ActionQueue<ModalButton>,
}

impl fmt::Debug for ManagementController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementController")
            .field("resource", &self.schema.resource)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("records", &self.records.len())
            .field("editing", &self.editor.is_some())
            .field("pending_delete", &self.pending_delete)
            .field("local_only", &self.local_only)
            .finish_non_exhaustive()
    }
}

impl ManagementController {
    /// Controller over `service`, in the `Loading` state until the first fetch lands
    pub fn new(service: Arc<dyn EntityService>) -> Self {
        let schema = EntitySchema::for_resource(service.resource());
        let row_events: ActionQueue<RowEvent> = ActionQueue::new();
        let modal_events: ActionQueue<ModalButton> = ActionQueue::new();

        let mut actions = RowActions::none()
            .on_view(row_events.row_sender(RowAction::View))
            .on_edit(row_events.row_sender(RowAction::Edit));
        if service.capabilities().delete {
            actions = actions.on_delete(row_events.row_sender(RowAction::Delete));
        }
        let table = DataTable::new(schema.columns.clone()).with_actions(actions);

        let modal = ContentModal::new(
            schema.create_title(),
            modal_events.sender(|()| ModalButton::Close),
        )
        .with_save(modal_events.sender(|()| ModalButton::Save));

        Self {
            service,
            schema,
            policy: RefreshPolicy::default(),
            state: LoadState::Loading,
            records: Vec::new(),
            table,
            modal,
            editor: None,
            viewing: None,
            status: None,
            banner: None,
            pending_delete: None,
            local_only: BTreeSet::new(),
            latest_fetch: 0,
            row_events,
            modal_events,
        }
    }

    /// Choose the post-mutation refresh strategy
    #[must_use]
    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Change the table's page size
    #[must_use]
    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.table = self.table.with_page_size(per_page);
        self
    }

    /// Resource managed
    pub const fn resource(&self) -> Resource {
        self.schema.resource
    }

    /// Columns and fields in use
    pub const fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Current lifecycle state
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Local list, the source of truth between fetches
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Inline error banner
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Hide the banner
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Open status or confirm dialog
    pub const fn status(&self) -> Option<&StatusDialog> {
        self.status.as_ref()
    }

    /// Close the status dialog; an unanswered confirm counts as cancel
    pub fn dismiss_status(&mut self) {
        if self.status.as_ref().is_some_and(StatusDialog::needs_answer) {
            self.cancel_delete();
        }
        self.status = None;
    }

    /// Whether the record carries an edit that never reached the backend
    pub fn is_local_only(&self, id: &str) -> bool {
        self.local_only.contains(id)
    }

    /// Identifiers of records with local-only edits
    pub fn local_only_ids(&self) -> impl Iterator<Item = &str> {
        self.local_only.iter().map(String::as_str)
    }

    fn position(&self, id: &str) -> AdminResult<usize> {
        self.records
            .iter()
            .position(|record| record.id().as_deref() == Some(id))
            .ok_or_else(|| AdminError::RecordNotFound { id: id.to_string() })
    }

    fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.table.set_records(self.records.clone());
    }

    // Fetching

    /// Start a fetch; any earlier ticket becomes stale
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_fetch += 1;
        self.state = LoadState::Loading;
        FetchTicket(self.latest_fetch)
    }

    /// List request detached from the controller, so fetches can overlap
    pub fn fetch(&self) -> impl Future<Output = ClientResult<Vec<Record>>> + Send + use<> {
        let service = Arc::clone(&self.service);
        async move { service.list().await }
    }

    /// Apply a fetch result unless a newer fetch has started since
    ///
    /// Returns `Ok(false)` when the result was discarded as stale.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after moving to [`LoadState::Error`]; the list is kept.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: ClientResult<Vec<Record>>,
    ) -> AdminResult<bool> {
        if ticket.0 != self.latest_fetch {
            debug!(
                "Discarding stale {} fetch {} (latest {})",
                self.resource(),
                ticket.0,
                self.latest_fetch
            );
            return Ok(false);
        }

        match result {
            Ok(records) => {
                if !self.local_only.is_empty() {
                    warn!(
                        "Refetch of {} discards {} local-only edit(s)",
                        self.resource(),
                        self.local_only.len()
                    );
                    self.local_only.clear();
                }
                let records = records.into_iter().map(Record::normalized).collect();
                self.replace_records(records);
                self.state = LoadState::Ready;
                self.banner = None;
                info!("Loaded {} {}", self.records.len(), self.resource());
                Ok(true)
            }
            Err(e) => {
                let e = AdminError::from(e);
                let message = e.user_message();
                error!("Failed to load {}: {}", self.resource(), e);
                self.state = LoadState::Error(message.clone());
                self.banner = Some(message);
                Err(e)
            }
        }
    }

    /// Fetch and apply the list
    ///
    /// # Errors
    ///
    /// Returns the fetch error; see [`Self::finish_fetch`].
    pub async fn load(&mut self) -> AdminResult<()> {
        let ticket = self.begin_fetch();
        let result = self.fetch().await;
        self.finish_fetch(ticket, result).map(|_| ())
    }

    /// Refetch after a successful mutation; a failure only shows in the banner
    async fn refetch(&mut self) {
        if let Err(e) = self.load().await {
            warn!("Refetch after mutation failed: {}", e);
        }
    }

    // Editing

    /// Open the modal with a blank draft
    pub fn open_create(&mut self) {
        self.viewing = None;
        self.editor = Some(Editor {
            mode: EditorMode::Create,
            form: FormState::from_defaults(&self.schema.fields),
        });
        self.modal.set_title(self.schema.create_title());
        self.modal.set_loading(false);
        self.modal.set_show(true);
    }

    /// Open the modal seeded from `record`
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no identifier or is not loaded.
    pub fn open_edit(&mut self, record: &Record) -> AdminResult<()> {
        let id = record
            .id()
            .ok_or_else(|| AdminError::validation(ID_FIELD, "record has no identifier"))?;
        let current = &self.records[self.position(&id)?];
        self.viewing = None;
        self.editor = Some(Editor {
            mode: EditorMode::Edit { id },
            form: FormState::from_record(&self.schema.fields, current),
        });
        self.modal.set_title(self.schema.edit_title());
        self.modal.set_loading(false);
        self.modal.set_show(true);
        Ok(())
    }

    /// Draft being edited
    pub fn form(&self) -> Option<&FormState> {
        self.editor.as_ref().map(|editor| &editor.form)
    }

    /// Mutable draft being edited
    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.editor.as_mut().map(|editor| &mut editor.form)
    }

    /// Whether the editor modal is open
    pub const fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    /// Identifier being edited, `None` when creating or closed
    pub fn editing_id(&self) -> Option<&str> {
        match &self.editor.as_ref()?.mode {
            EditorMode::Edit { id } => Some(id),
            EditorMode::Create => None,
        }
    }

    /// Close the modal and drop the draft
    pub fn close_modal(&mut self) {
        self.editor = None;
        self.modal.set_loading(false);
        self.modal.set_show(false);
    }

    /// Submit the draft
    ///
    /// Validation failures open an error dialog and send nothing. Backend
    /// failures keep the modal open with the draft intact.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::ModalClosed`] without an open editor, the
    /// validation error, or the backend error.
    pub async fn save(&mut self) -> AdminResult<()> {
        let Some(editor) = self.editor.as_ref() else {
            return Err(AdminError::ModalClosed);
        };
        if self.modal.is_loading() {
            debug!("Save ignored while another save is in flight");
            return Ok(());
        }
        if let Err(e) = editor.form.validate() {
            self.status = Some(StatusDialog::error("Missing information", e.user_message()));
            return Err(e);
        }

        let payload = editor.form.to_record();
        let mode = editor.mode.clone();
        self.modal.set_loading(true);
        let result = match mode {
            EditorMode::Create => self.create(payload).await,
            EditorMode::Edit { id } => self.update(&id, payload).await,
        };
        self.modal.set_loading(false);

        match result {
            Ok(dialog) => {
                self.close_modal();
                self.status = Some(dialog);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                error!("Saving {} failed: {}", self.resource(), e);
                self.banner = Some(message.clone());
                self.status = Some(StatusDialog::error(
                    format!("Could not save {}", self.resource().singular().to_lowercase()),
                    message,
                ));
                Err(e)
            }
        }
    }

    async fn create(&mut self, payload: Record) -> AdminResult<StatusDialog> {
        let created = self.service.create(&payload).await?.normalized();
        info!("Created {} {:?}", self.resource(), created.id());

        match (self.policy, created.id()) {
            (RefreshPolicy::Splice, Some(_)) => {
                let mut records = self.records.clone();
                records.push(created);
                self.replace_records(records);
            }
            _ => self.refetch().await,
        }

        let noun = self.resource().singular();
        Ok(StatusDialog::success(
            format!("{noun} created"),
            format!("The {} was created successfully.", noun.to_lowercase()),
        ))
    }

    async fn update(&mut self, id: &str, payload: Record) -> AdminResult<StatusDialog> {
        let index = self.position(id)?;
        let noun = self.resource().singular();

        if !self.service.capabilities().update {
            let mut record = self.records[index].clone();
            record.merge_from(&payload);
            record.insert(ID_FIELD, id);
            let mut records = self.records.clone();
            records[index] = record;
            self.replace_records(records);
            self.local_only.insert(id.to_string());
            warn!(
                "{} has no update endpoint; edit to {} kept locally only",
                self.resource(),
                id
            );
            return Ok(StatusDialog::warning(
                format!("{noun} updated locally"),
                "The backend cannot update this resource. The change is kept for this session only and will be lost on the next refresh.",
            ));
        }

        let updated = self.service.update(id, &payload).await?.normalized();
        info!("Updated {} {}", self.resource(), id);
        self.local_only.remove(id);

        match self.policy {
            RefreshPolicy::Splice => {
                let mut record = self.records[index].clone();
                record.merge_from(&updated);
                record.insert(ID_FIELD, id);
                let mut records = self.records.clone();
                records[index] = record;
                self.replace_records(records);
            }
            RefreshPolicy::Refetch => self.refetch().await,
        }

        Ok(StatusDialog::success(
            format!("{noun} updated"),
            format!("The {} was updated successfully.", noun.to_lowercase()),
        ))
    }

    // Deleting

    /// Ask for confirmation before deleting `record`
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no identifier or is not loaded.
    pub fn request_delete(&mut self, record: &Record) -> AdminResult<()> {
        let id = record
            .id()
            .ok_or_else(|| AdminError::validation(ID_FIELD, "record has no identifier"))?;
        let current = &self.records[self.position(&id)?];
        let name = self
            .schema
            .columns
            .first()
            .map(|column| column.cell(current))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone());

        self.status = Some(StatusDialog::confirm(
            format!("Delete {}?", self.resource().singular()),
            format!("\"{name}\" will be permanently deleted. This action cannot be undone."),
            "Delete",
        ));
        self.pending_delete = Some(id);
        Ok(())
    }

    /// Identifier awaiting delete confirmation
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Abandon a requested delete
    pub fn cancel_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.status = None;
        }
    }

    /// Delete the record awaiting confirmation
    ///
    /// On failure the local list is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NoPendingDelete`] without a prior request, or the
    /// backend error.
    pub async fn confirm_delete(&mut self) -> AdminResult<()> {
        let id = self.pending_delete.take().ok_or(AdminError::NoPendingDelete)?;
        self.status = None;
        let noun = self.resource().singular();

        if !self.service.capabilities().delete {
            self.remove_local(&id);
            warn!(
                "{} has no delete endpoint; {} removed locally only",
                self.resource(),
                id
            );
            self.status = Some(StatusDialog::warning(
                format!("{noun} removed locally"),
                "The backend cannot delete this resource. It will reappear on the next refresh.",
            ));
            return Ok(());
        }

        match self.service.delete(&id).await {
            Ok(()) => {
                info!("Deleted {} {}", self.resource(), id);
                self.local_only.remove(&id);
                match self.policy {
                    RefreshPolicy::Splice => self.remove_local(&id),
                    RefreshPolicy::Refetch => self.refetch().await,
                }
                self.status = Some(StatusDialog::success(
                    format!("{noun} deleted"),
                    format!("The {} was deleted.", noun.to_lowercase()),
                ));
                Ok(())
            }
            Err(e) => {
                let e = AdminError::from(e);
                let message = e.user_message();
                error!("Deleting {} {} failed: {}", self.resource(), id, e);
                self.banner = Some(message.clone());
                self.status = Some(StatusDialog::error(
                    format!("Could not delete {}", noun.to_lowercase()),
                    message,
                ));
                Err(e)
            }
        }
    }

    fn remove_local(&mut self, id: &str) {
        let records = self
            .records
            .iter()
            .filter(|record| record.id().as_deref() != Some(id))
            .cloned()
            .collect();
        self.replace_records(records);
    }

    // Table and events

    /// Change the search term (back to page 1)
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.table.set_search_term(term);
    }

    /// Move to a table page
    pub fn set_page(&mut self, page: usize) {
        self.table.set_page(page);
    }

    /// Press a row button on the `row`-th visible record
    pub fn trigger_row(&self, action: RowAction, row: usize) -> bool {
        self.table.trigger_row(action, row)
    }

    /// Press a modal button
    pub fn press_modal(&self, button: ModalButton) -> bool {
        self.modal.press(button)
    }

    /// Dispatch one row action
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be edited or deleted.
    pub fn handle_row_action(&mut self, action: RowAction, record: &Record) -> AdminResult<()> {
        match action {
            RowAction::View => {
                self.viewing = Some(record.clone());
                Ok(())
            }
            RowAction::Edit => self.open_edit(record),
            RowAction::Delete => self.request_delete(record),
        }
    }

    /// Handle queued row and modal events in arrival order per source
    ///
    /// Every drained event runs even when an earlier one fails. Returns how
    /// many events succeeded.
    ///
    /// # Errors
    ///
    /// Returns the first failing event's error once the queues are empty.
    pub async fn process_events(&mut self) -> AdminResult<usize> {
        let mut results = Vec::new();
        for (action, record) in self.row_events.drain() {
            results.push(self.handle_row_action(action, &record));
        }
        for button in self.modal_events.drain() {
            results.push(match button {
                ModalButton::Save => self.save().await,
                ModalButton::Close | ModalButton::Cancel => {
                    self.close_modal();
                    Ok(())
                }
            });
        }

        let mut handled = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(()) => handled += 1,
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => warn!("Queued event also failed: {}", e),
            }
        }
        first_error.map_or(Ok(handled), Err)
    }

    /// Record opened with the view action
    pub const fn viewing(&self) -> Option<&Record> {
        self.viewing.as_ref()
    }

    /// Close the read-only view
    pub fn close_view(&mut self) {
        self.viewing = None;
    }

    /// Render the table
    pub fn table_view(&self) -> TableView {
        self.table.render()
    }

    /// Render the modal, `None` while hidden
    pub fn modal_view(&self) -> Option<ModalView<Vec<FieldView>>> {
        let editor = self.editor.as_ref()?;
        self.modal.render(|| editor.form.view())
    }
}
