//! Confirm and feedback dialog

use serde::Serialize;

/// Dialog flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Operation succeeded with caveats
    Warning,
    /// Plain information
    Info,
    /// Destructive action awaiting confirmation
    Confirm,
}

/// Dialog shown after an action, or before a destructive one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDialog {
    /// Flavour
    pub kind: StatusKind,
    /// Heading
    pub title: String,
    /// Body text
    pub message: String,
    /// Primary button label
    pub confirm_label: String,
    /// Secondary button label; only confirm dialogs have one
    pub cancel_label: Option<String>,
}

impl StatusDialog {
    fn notice(kind: StatusKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            confirm_label: "OK".to_string(),
            cancel_label: None,
        }
    }

    /// Success notice
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(StatusKind::Success, title, message)
    }

    /// Error notice
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(StatusKind::Error, title, message)
    }

    /// Warning notice
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(StatusKind::Warning, title, message)
    }

    /// Information notice
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(StatusKind::Info, title, message)
    }

    /// Confirmation prompt with a custom primary label
    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_label: impl Into<String>,
    ) -> Self {
        Self {
            kind: StatusKind::Confirm,
            title: title.into(),
            message: message.into(),
            confirm_label: confirm_label.into(),
            cancel_label: Some("Cancel".to_string()),
        }
    }

    /// Whether the dialog waits for a yes/no answer
    pub const fn needs_answer(&self) -> bool {
        matches!(self.kind, StatusKind::Confirm)
    }

    /// Button labels in display order
    pub fn buttons(&self) -> Vec<&str> {
        self.cancel_label
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.confirm_label.as_str()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notice_has_single_button() {
        let dialog = StatusDialog::error("Save failed", "database offline");
        assert_eq!(dialog.kind, StatusKind::Error);
        assert_eq!(dialog.buttons(), vec!["OK"]);
        assert!(!dialog.needs_answer());
    }

    #[test]
    fn test_confirm_has_cancel_first() {
        let dialog = StatusDialog::confirm("Delete Product?", "This cannot be undone.", "Delete");
        assert!(dialog.needs_answer());
        assert_eq!(dialog.buttons(), vec!["Cancel", "Delete"]);
    }
}
