//! Generic data table: client-side search, pagination and row actions

use agency_core::{FieldValue, Record};
use serde::Serialize;
use std::{fmt, sync::Arc};

use crate::{
    callback::{Callback, RowAction},
    pagination::{DEFAULT_PAGE_SIZE, Pagination, PaginationMeta},
};

/// Cell renderer: `(field value, full record) -> display text`
pub type Renderer = Arc<dyn Fn(&FieldValue, &Record) -> String + Send + Sync>;

/// Column descriptor
#[derive(Clone)]
pub struct Column {
    /// Field rendered in this column
    pub key: String,

    /// Header text
    pub label: String,

    render: Option<Renderer>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("render", &self.render.is_some())
            .finish()
    }
}

impl Column {
    /// Column showing the raw field value
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            render: None,
        }
    }

    /// Use a render function instead of the raw value
    #[must_use]
    pub fn with_render(
        mut self,
        render: impl Fn(&FieldValue, &Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Display text of this column for `record`
    pub fn cell(&self, record: &Record) -> String {
        let value = record.value(&self.key);
        self.render.as_ref().map_or_else(
            || value.to_display_string(),
            |render| render(value, record),
        )
    }
}

/// Optional per-row handlers; the actions column exists only when one is set
#[derive(Debug, Clone, Default)]
pub struct RowActions {
    /// View handler
    pub on_view: Option<Callback<Record>>,
    /// Edit handler
    pub on_edit: Option<Callback<Record>>,
    /// Delete handler
    pub on_delete: Option<Callback<Record>>,
}

impl RowActions {
    /// No handlers
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the view handler
    #[must_use]
    pub fn on_view(mut self, callback: Callback<Record>) -> Self {
        self.on_view = Some(callback);
        self
    }

    /// Set the edit handler
    #[must_use]
    pub fn on_edit(mut self, callback: Callback<Record>) -> Self {
        self.on_edit = Some(callback);
        self
    }

    /// Set the delete handler
    #[must_use]
    pub fn on_delete(mut self, callback: Callback<Record>) -> Self {
        self.on_delete = Some(callback);
        self
    }

    /// Whether no handler is set
    pub const fn is_empty(&self) -> bool {
        self.on_view.is_none() && self.on_edit.is_none() && self.on_delete.is_none()
    }

    /// Actions available, in button order
    pub fn available(&self) -> Vec<RowAction> {
        [
            (RowAction::View, self.on_view.is_some()),
            (RowAction::Edit, self.on_edit.is_some()),
            (RowAction::Delete, self.on_delete.is_some()),
        ]
        .into_iter()
        .filter_map(|(action, set)| set.then_some(action))
        .collect()
    }

    fn handler(&self, action: RowAction) -> Option<&Callback<Record>> {
        match action {
            RowAction::View => self.on_view.as_ref(),
            RowAction::Edit => self.on_edit.as_ref(),
            RowAction::Delete => self.on_delete.as_ref(),
        }
    }
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Record identifier, when it has one
    pub id: Option<String>,
    /// Cell text in column order
    pub cells: Vec<String>,
    /// Buttons in the actions column
    pub actions: Vec<RowAction>,
}

/// Rendered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    /// Header labels, including a trailing `Actions` when present
    pub headers: Vec<String>,
    /// Visible rows
    pub rows: Vec<RowView>,
    /// Search term currently applied
    pub search_term: String,
    /// Pagination controls; `None` when everything fits on one page
    pub pagination: Option<PaginationMeta>,
}

impl TableView {
    /// Cell text for `column` of visible row `row`
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.cells.get(index).map(String::as_str)
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data_columns = self.rows.first().map_or(self.headers.len(), |r| r.cells.len());
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&self.headers))?;
        if self.rows.is_empty() {
            writeln!(f, "(no records)")?;
        }
        for row in &self.rows {
            let mut cells = row.cells.clone();
            if self.headers.len() > data_columns {
                let labels: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
                cells.push(labels.join("/"));
            }
            writeln!(f, "{}", line(&cells))?;
        }
        if let Some(meta) = &self.pagination {
            writeln!(f, "{} ({} records)", meta.label(), meta.total)?;
        }
        Ok(())
    }
}

/// Table over a list of heterogeneous records
#[derive(Debug, Clone)]
pub struct DataTable {
    columns: Vec<Column>,
    records: Vec<Record>,
    searchable: bool,
    search_term: String,
    pagination: Pagination,
    actions: RowActions,
}

impl DataTable {
    /// Searchable table with the default page size
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            searchable: true,
            search_term: String::new(),
            pagination: Pagination::new(DEFAULT_PAGE_SIZE),
            actions: RowActions::none(),
        }
    }

    /// Change the page size
    #[must_use]
    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.pagination = Pagination::new(per_page);
        self
    }

    /// Enable or disable search
    #[must_use]
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        if !searchable {
            self.search_term.clear();
        }
        self
    }

    /// Attach row handlers
    #[must_use]
    pub fn with_actions(mut self, actions: RowActions) -> Self {
        self.actions = actions;
        self
    }

    /// Replace the row handlers
    pub fn set_actions(&mut self, actions: RowActions) {
        self.actions = actions;
    }

    /// Declared columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Every record, unfiltered
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace the records, keeping the page within range
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        let total = self.filtered_len();
        self.pagination.set_page(self.pagination.page(), total);
    }

    /// Current search term
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Change the search term; a different term goes back to page 1
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        if !self.searchable {
            return;
        }
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.pagination.reset();
        }
    }

    /// Current page (1-based)
    pub const fn page(&self) -> usize {
        self.pagination.page()
    }

    /// Move to `page`, clamped to the available pages
    pub fn set_page(&mut self, page: usize) {
        let total = self.filtered_len();
        self.pagination.set_page(page, total);
    }

    /// Next page, if any
    pub fn next_page(&mut self) {
        self.set_page(self.page() + 1);
    }

    /// Previous page, if any
    pub fn prev_page(&mut self) {
        self.set_page(self.page().saturating_sub(1));
    }

    /// Records retained by the search, in original order
    ///
    /// A record is kept when the lowercase display form of any of its field
    /// values contains the lowercase term.
    pub fn filtered(&self) -> Vec<&Record> {
        let needle = self.search_term.to_lowercase();
        if !self.searchable || needle.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|record| {
                record
                    .values()
                    .any(|value| value.to_display_string().to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    /// `ceil(filtered / page size)`
    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.filtered_len())
    }

    /// Records on the current page
    pub fn visible(&self) -> Vec<&Record> {
        let filtered = self.filtered();
        let range = self.pagination.range(filtered.len());
        filtered[range].to_vec()
    }

    /// Whether the actions column is shown
    pub const fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Invoke the handler for `action` with `record`
    ///
    /// Returns whether a handler was set.
    pub fn trigger(&self, action: RowAction, record: &Record) -> bool {
        self.actions.handler(action).is_some_and(|handler| {
            handler.call(record);
            true
        })
    }

    /// Invoke `action` on the `row`-th visible record
    pub fn trigger_row(&self, action: RowAction, row: usize) -> bool {
        self.visible()
            .get(row)
            .is_some_and(|record| self.trigger(action, record))
    }

    /// Render headers, visible rows and pagination controls
    pub fn render(&self) -> TableView {
        let mut headers: Vec<String> = self.columns.iter().map(|c| c.label.clone()).collect();
        let actions = self.actions.available();
        if !actions.is_empty() {
            headers.push("Actions".to_string());
        }

        let filtered = self.filtered();
        let range = self.pagination.range(filtered.len());
        let rows = filtered[range]
            .iter()
            .map(|record| RowView {
                id: record.id(),
                cells: self.columns.iter().map(|c| c.cell(record)).collect(),
                actions: actions.clone(),
            })
            .collect();

        let meta = PaginationMeta::new(&self.pagination, filtered.len());
        TableView {
            headers,
            rows,
            search_term: self.search_term.clone(),
            pagination: (meta.total_pages > 1).then_some(meta),
        }
    }
}
