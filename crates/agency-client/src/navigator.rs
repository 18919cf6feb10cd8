//! Navigation seam used to force a return to the login screen

use parking_lot::Mutex;
use std::fmt;
use tracing::info;

/// Path of the login route
pub const LOGIN_PATH: &str = "/login";

/// Something that can move the user to another route
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Navigate to `path`
    fn navigate(&self, path: &str);
}

/// Navigator that only logs, for headless processes
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!("Navigating to {}", path);
    }
}

/// Navigator that remembers every navigation, for assertions
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path navigated to, oldest first
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }

    /// How many times `path` was visited
    pub fn count(&self, path: &str) -> usize {
        self.visits.lock().iter().filter(|p| *p == path).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().push(path.to_string());
    }
}
