//! Callbacks handed to view components, and the queue that collects them

use agency_core::Record;
use parking_lot::Mutex;
use serde::Serialize;
use std::{collections::VecDeque, fmt, sync::Arc};

/// Shared event handler
///
/// Components only ever invoke callbacks; what happens next is the owner's
/// business.
pub struct Callback<T: ?Sized> {
    handler: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T: ?Sized> Callback<T> {
    /// Wrap a closure
    pub fn new(handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invoke the handler
    pub fn call(&self, value: &T) {
        (self.handler)(value);
    }
}

impl<T: ?Sized> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Per-row affordance offered by the data table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    /// Open a read-only view
    View,
    /// Open the editor
    Edit,
    /// Ask for deletion
    Delete,
}

impl RowAction {
    /// Button label
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// A row action together with the record it was triggered on
pub type RowEvent = (RowAction, Record);

/// FIFO of events raised through callbacks, drained by the owning controller
#[derive(Debug)]
pub struct ActionQueue<T> {
    events: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for ActionQueue<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> Default for ActionQueue<T> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl<T: Send + 'static> ActionQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event
    pub fn push(&self, event: T) {
        self.events.lock().push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.events.lock().drain(..).collect()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Callback that maps its argument to an event and enqueues it
    pub fn sender<I: ?Sized + 'static>(
        &self,
        map: impl Fn(&I) -> T + Send + Sync + 'static,
    ) -> Callback<I> {
        let queue = self.clone();
        Callback::new(move |input: &I| queue.push(map(input)))
    }
}

impl ActionQueue<RowEvent> {
    /// Callback that enqueues `action` with the record it receives
    pub fn row_sender(&self, action: RowAction) -> Callback<Record> {
        self.sender(move |record: &Record| (action, record.clone()))
    }
}
