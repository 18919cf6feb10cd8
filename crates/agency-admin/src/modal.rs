//! Controlled overlay shell hosting an entity form

use serde::Serialize;

use crate::callback::Callback;

/// Buttons the modal can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalButton {
    /// Header close control
    Close,
    /// Footer cancel
    Cancel,
    /// Footer save
    Save,
}

/// Footer shown when the modal has a save action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalFooter {
    /// Cancel label
    pub cancel_label: &'static str,
    /// `Save`, or `Saving...` while loading
    pub save_label: &'static str,
    /// Save disabled while loading
    pub save_disabled: bool,
}

/// Rendered modal around an injected body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView<B> {
    /// Header title
    pub title: String,
    /// Body content supplied by the owner
    pub body: B,
    /// Footer, present only with a save action
    pub footer: Option<ModalFooter>,
}

/// Show/hide shell with title, body slot and an optional save/cancel footer
///
/// The modal owns no field state and never hides itself; closing goes through
/// `on_close` and the owner decides.
#[derive(Debug, Clone)]
pub struct ContentModal {
    show: bool,
    title: String,
    loading: bool,
    on_close: Callback<()>,
    on_save: Option<Callback<()>>,
}

impl ContentModal {
    /// Hidden modal without a save action
    pub fn new(title: impl Into<String>, on_close: Callback<()>) -> Self {
        Self {
            show: false,
            title: title.into(),
            loading: false,
            on_close,
            on_save: None,
        }
    }

    /// Add a save action, which also enables the footer
    #[must_use]
    pub fn with_save(mut self, on_save: Callback<()>) -> Self {
        self.on_save = Some(on_save);
        self
    }

    /// Show or hide
    pub const fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Whether the modal is visible
    pub const fn is_shown(&self) -> bool {
        self.show
    }

    /// Header title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Change the header title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// External loading flag
    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether a save is in flight
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Render around `body`; hidden modals render nothing and never build the body
    pub fn render<B>(&self, body: impl FnOnce() -> B) -> Option<ModalView<B>> {
        if !self.show {
            return None;
        }
        let footer = self.on_save.as_ref().map(|_| ModalFooter {
            cancel_label: "Cancel",
            save_label: if self.loading { "Saving..." } else { "Save" },
            save_disabled: self.loading,
        });
        Some(ModalView {
            title: self.title.clone(),
            body: body(),
            footer,
        })
    }

    /// Press a button; returns whether a callback ran
    ///
    /// Cancel only exists with a footer. Save is ignored while loading.
    pub fn press(&self, button: ModalButton) -> bool {
        if !self.show {
            return false;
        }
        match button {
            ModalButton::Close => {
                self.on_close.call(&());
                true
            }
            ModalButton::Cancel if self.on_save.is_some() => {
                self.on_close.call(&());
                true
            }
            ModalButton::Save if !self.loading => self.on_save.as_ref().is_some_and(|save| {
                save.call(&());
                true
            }),
            ModalButton::Cancel | ModalButton::Save => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::callback::ActionQueue;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn modal(queue: &ActionQueue<ModalButton>) -> ContentModal {
        ContentModal::new("Add Product", queue.sender(|()| ModalButton::Close))
            .with_save(queue.sender(|()| ModalButton::Save))
    }

    #[test]
    fn test_hidden_modal_renders_nothing() {
        let queue = ActionQueue::new();
        let modal = modal(&queue);
        let built = Cell::new(false);

        let view = modal.render(|| built.set(true));

        assert!(view.is_none());
        assert!(!built.get());
        assert!(!modal.press(ModalButton::Save));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_footer_follows_loading_flag() {
        let queue = ActionQueue::new();
        let mut modal = modal(&queue);
        modal.set_show(true);

        let footer = modal.render(|| "body").unwrap().footer.unwrap();
        assert_eq!(footer.save_label, "Save");
        assert!(!footer.save_disabled);

        modal.set_loading(true);
        let view = modal.render(|| "body").unwrap();
        assert_eq!(view.title, "Add Product");
        assert_eq!(view.body, "body");
        let footer = view.footer.unwrap();
        assert_eq!(footer.save_label, "Saving...");
        assert!(footer.save_disabled);
    }

    #[test]
    fn test_buttons_invoke_callbacks() {
        let queue = ActionQueue::new();
        let mut modal = modal(&queue);
        modal.set_show(true);

        assert!(modal.press(ModalButton::Cancel));
        assert!(modal.press(ModalButton::Save));
        modal.set_loading(true);
        assert!(!modal.press(ModalButton::Save));

        assert_eq!(queue.drain(), vec![ModalButton::Close, ModalButton::Save]);
    }

    #[test]
    fn test_no_footer_without_save() {
        let queue = ActionQueue::new();
        let mut modal = ContentModal::new("Details", queue.sender(|()| ModalButton::Close));
        modal.set_show(true);

        assert!(modal.render(|| ()).unwrap().footer.is_none());
        assert!(!modal.press(ModalButton::Cancel));
        assert!(modal.press(ModalButton::Close));
        assert_eq!(queue.len(), 1);
    }
}
