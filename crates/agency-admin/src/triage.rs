//! Inbox lists: leads, messages, applications and subscribers

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    callback::{ActionQueue, RowAction, RowEvent},
    detail::{DetailModal, DetailRecord, DetailView, InboxKind, MessageStatus},
    error::{AdminError, AdminResult},
    modal::ModalView,
    table::{Column, DataTable, RowActions, TableView},
};

fn columns(kind: InboxKind) -> Vec<Column> {
    let keys: &[(&str, &str)] = match kind {
        InboxKind::Leads => &[
            ("name", "Name"),
            ("company", "Company"),
            ("source", "Source"),
            ("value", "Value"),
            ("status", "Status"),
            ("created", "Created"),
        ],
        InboxKind::Messages => &[
            ("name", "From"),
            ("subject", "Subject"),
            ("preview", "Message"),
            ("status", "Status"),
            ("received", "Received"),
        ],
        InboxKind::JobApplications => &[
            ("name", "Applicant"),
            ("position", "Position"),
            ("experience", "Experience"),
            ("status", "Status"),
            ("applied", "Applied"),
        ],
        InboxKind::Newsletter => &[
            ("email", "Email"),
            ("name", "Name"),
            ("status", "Status"),
            ("subscribed", "Subscribed"),
        ],
    };
    keys.iter()
        .map(|(key, label)| Column::new(*key, *label))
        .collect()
}

/// Searchable list of one inbox with a read-only detail viewer
#[derive(Debug)]
pub struct TriageList {
    kind: InboxKind,
    records: Vec<DetailRecord>,
    table: DataTable,
    detail: DetailModal,
    row_events: ActionQueue<RowEvent>,
}

impl TriageList {
    /// Empty list for `kind`
    pub fn new(kind: InboxKind) -> Self {
        let row_events: ActionQueue<RowEvent> = ActionQueue::new();
        let table = DataTable::new(columns(kind))
            .with_actions(RowActions::none().on_view(row_events.row_sender(RowAction::View)));
        Self {
            kind,
            records: Vec::new(),
            table,
            detail: DetailModal::new(),
            row_events,
        }
    }

    /// Inbox shown
    pub const fn kind(&self) -> InboxKind {
        self.kind
    }

    /// Records in arrival order
    pub fn records(&self) -> &[DetailRecord] {
        &self.records
    }

    /// Replace the list
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the list untouched, if any record
    /// belongs to another inbox.
    pub fn set_records(&mut self, records: Vec<DetailRecord>) -> AdminResult<()> {
        if let Some(stray) = records.iter().find(|r| r.kind() != self.kind) {
            return Err(AdminError::validation(
                "kind",
                format!(
                    "{} record {} does not belong in {}",
                    stray.kind().label(),
                    stray.id(),
                    self.kind.label()
                ),
            ));
        }
        debug!("{} inbox holds {} records", self.kind.label(), records.len());
        self.records = records;
        self.sync_table();
        Ok(())
    }

    fn sync_table(&mut self) {
        self.table
            .set_records(self.records.iter().map(DetailRecord::to_row).collect());
    }

    fn find_mut(&mut self, id: &str) -> AdminResult<&mut DetailRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AdminError::RecordNotFound { id: id.to_string() })
    }

    /// Filter by search term
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.table.set_search_term(term);
    }

    /// Jump to a page
    pub fn set_page(&mut self, page: usize) {
        self.table.set_page(page);
    }

    /// Change the status of record `id`
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::RecordNotFound`] for an unknown id, or a
    /// validation error if the status does not apply to this inbox.
    pub fn set_status(&mut self, id: &str, status: &str) -> AdminResult<()> {
        let record = self.find_mut(id)?;
        record.set_status(status)?;
        let label = record.status_label();
        let snapshot = record.clone();
        if self.detail.record().is_some_and(|open| open.id() == id) {
            self.detail.open(snapshot);
        }
        self.sync_table();
        info!("{} {} marked {}", self.kind.label(), id, label);
        Ok(())
    }

    /// Number of records per status label, in order of first appearance
    pub fn status_counts(&self) -> IndexMap<&'static str, usize> {
        let mut counts = IndexMap::new();
        for record in &self.records {
            *counts.entry(record.status_label()).or_insert(0) += 1;
        }
        counts
    }

    /// Open record `id` in the detail viewer; opening an unread message marks it read
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::RecordNotFound`] for an unknown id.
    pub fn open(&mut self, id: &str) -> AdminResult<()> {
        let record = self.find_mut(id)?;
        if let DetailRecord::Message(message) = record
            && message.status == MessageStatus::Unread
        {
            message.status = MessageStatus::Read;
            debug!("Message {} marked read on open", id);
        }
        let snapshot = record.clone();
        self.detail.open(snapshot);
        self.sync_table();
        Ok(())
    }

    /// Apply queued view clicks and modal closes
    ///
    /// # Errors
    ///
    /// Returns the first error raised while opening a clicked row.
    pub fn process_events(&mut self) -> AdminResult<()> {
        self.detail.process_events();
        for (action, row) in self.row_events.drain() {
            if action == RowAction::View
                && let Some(id) = row.id()
            {
                self.open(&id)?;
            }
        }
        Ok(())
    }

    /// Click a row action on visible row `row`
    pub fn trigger_row(&self, action: RowAction, row: usize) -> bool {
        self.table.trigger_row(action, row)
    }

    /// Press the detail viewer's close control
    pub fn press_close(&self) -> bool {
        self.detail.press_close()
    }

    /// Hide the detail viewer
    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Drop record `id` from the list, closing the viewer if it shows it
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::RecordNotFound`] for an unknown id.
    pub fn remove(&mut self, id: &str) -> AdminResult<DetailRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| AdminError::RecordNotFound { id: id.to_string() })?;
        if self.detail.record().is_some_and(|open| open.id() == id) {
            self.detail.close();
        }
        let removed = self.records.remove(index);
        self.sync_table();
        Ok(removed)
    }

    /// Render the table
    pub fn table_view(&self) -> TableView {
        self.table.render()
    }

    /// Render the detail viewer
    pub fn detail_view(&self) -> Option<ModalView<DetailView>> {
        self.detail.render()
    }
}
