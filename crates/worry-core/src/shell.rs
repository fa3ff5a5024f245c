//! The application shell: owns the services, routes locations to views, and
//! reports storage trouble to the user.
//!
//! Everything happens on the caller's thread. A front end feeds the shell
//! element activations ([`Shell::click`], [`Shell::input`]) and keys, then
//! calls [`Shell::pump`] to let navigation, autosave and toasts catch up.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::KeyValueBackend;
use crate::clock::Clock;
use crate::config::JournalConfig;
use crate::id::IdGenerator;
use crate::location::Location;
use crate::render::{Key, Surface, Trigger};
use crate::router::{worry_path, Params, Router};
use crate::store::{RecordStore, StoreNotice};
use crate::views::{Action, EditView, ListView, Outcome, UiEvent};

/// A route handler runs with the shell as its context.
pub type RouteHandler = fn(&mut Shell, &Params);

pub const UNAVAILABLE_BANNER: &str =
    "Saving is turned off here, so your worries won't be kept after you close the journal.";

const WRITE_FAILED_MESSAGE: &str = "Your latest change couldn't be saved.";

/// Redirect chains longer than this are cut off.
const MAX_ROUTE_HOPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    None,
    Index,
    Editor,
}

/// A transient message that disappears on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

pub struct Shell {
    config: JournalConfig,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    store: RecordStore,
    notices: Receiver<StoreNotice>,
    router: Router<RouteHandler>,
    surface: Surface,
    list: ListView,
    editor: EditView,
    active: ActiveView,
    banner: Option<String>,
    toast: Option<Toast>,
}

impl Shell {
    /// Build the store and router, sweep stale empty worries, and register
    /// routes. Nothing is shown until the first [`pump`](Self::pump).
    pub fn new(
        config: JournalConfig,
        backend: impl KeyValueBackend + 'static,
        location: impl Location + 'static,
        clock: Arc<dyn Clock>,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        let store = RecordStore::new(backend, clock.clone(), &config);
        // Subscribe first so a corrupted document found by the sweep is reported.
        let notices = store.subscribe();

        let banner = if store.is_available() {
            None
        } else {
            tracing::warn!(backend = store.backend_name(), "Running without persistent storage");
            Some(UNAVAILABLE_BANNER.to_string())
        };

        store.cleanup_empty_worries();

        let mut router: Router<RouteHandler> = Router::new(location);
        router
            .on("/worry/:id", Shell::show_editor)
            .on("/", Shell::show_index);

        Self {
            list: ListView::new(config.title_limit),
            editor: EditView::new(config.autosave_delay()),
            config,
            clock,
            ids: Box::new(ids),
            store,
            notices,
            router,
            surface: Surface::new(),
            active: ActiveView::None,
            banner,
            toast: None,
        }
    }

    /// Catch up on everything that is due: location changes, the debounced
    /// save, store notices and toast expiry.
    pub fn pump(&mut self) {
        let mut hops = 0;
        while self.router.take_change() {
            hops += 1;
            if hops > MAX_ROUTE_HOPS {
                tracing::warn!(path = %self.router.current_path(), "Too many redirects, giving up");
                break;
            }
            self.dispatch_route();
        }

        let now = self.clock.now();
        if self.active == ActiveView::Editor {
            self.editor.poll_autosave(&self.store, now);
        }

        self.drain_notices();

        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
    }

    /// Run an action fired by a bound element.
    pub fn handle_event(&mut self, event: UiEvent) {
        let now = self.clock.now();
        let UiEvent { action, value } = event;
        let text = value.unwrap_or_default();
        tracing::trace!(?action, "Handling event");

        match action {
            Action::CreateWorry => {
                let outcome = ListView::create_worry(&self.store, self.ids.as_ref());
                self.apply(outcome);
            }
            Action::OpenWorry(id) => self.router.navigate(&worry_path(&id)),
            Action::RequestDelete(id) => self.list.request_delete(&id, &mut self.surface),
            Action::ConfirmDelete => self.list.confirm_delete(&self.store, now, &mut self.surface),
            Action::CancelDelete => self.list.cancel_delete(&mut self.surface),
            Action::EditTitle => self.editor.edit_title(&text, now, &mut self.surface),
            Action::EditReason(side, index) => {
                self.editor
                    .edit_reason(side, index, &text, now, &mut self.surface)
            }
            Action::AddReason(side) => self.editor.add_reason(side, &self.store, &mut self.surface),
            Action::RemoveReason(side, index) => {
                self.editor
                    .remove_reason(side, index, &self.store, &mut self.surface)
            }
            Action::SelectFeeling(feeling) => {
                self.editor.select_feeling(feeling, now, &mut self.surface)
            }
            Action::Back | Action::Done => {
                let outcome = self.editor.exit(&self.store);
                self.apply(outcome);
            }
        }
    }

    /// Activate an element the way a pointer click would.
    ///
    /// Radios are checked and fire their change binding; everything else
    /// fires its click binding. While a dialog is open only its elements
    /// respond.
    pub fn click(&mut self, id: &str) -> bool {
        if let Some(overlay) = self.surface.overlay() {
            if overlay.find_by_id(id).is_none() {
                return false;
            }
        }
        let Some(node) = self.surface.find(id) else {
            return false;
        };
        let is_radio = node.tag == "input" && node.get_attr("type") == Some("radio");
        let trigger = if is_radio { Trigger::Change } else { Trigger::Click };
        let action = node.binding(trigger).cloned();
        let focusable = node.is_focusable();

        if focusable {
            self.surface.focus(id);
        }
        if is_radio {
            self.surface.check_radio(id);
        }
        match action {
            Some(action) => {
                self.handle_event(UiEvent::new(action));
                true
            }
            None => false,
        }
    }

    /// Click whatever holds focus.
    pub fn activate_focused(&mut self) -> bool {
        match self.surface.focused().map(str::to_string) {
            Some(id) => self.click(&id),
            None => false,
        }
    }

    /// Replace a text field's value and fire its input binding.
    pub fn input(&mut self, id: &str, value: &str) -> bool {
        let Some(action) = self
            .surface
            .find(id)
            .and_then(|node| node.binding(Trigger::Input))
            .cloned()
        else {
            return false;
        };
        self.surface.set_value(id, value);
        self.handle_event(UiEvent::with_value(action, value));
        true
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Tab => self.surface.focus_next(),
            Key::BackTab => self.surface.focus_prev(),
            Key::Escape => {
                if self.list.dialog().is_some() {
                    self.handle_event(UiEvent::new(Action::CancelDelete));
                }
            }
        }
    }

    /// Go to the previous location, like a browser's back button.
    pub fn history_back(&mut self) {
        self.router.back();
    }

    /// The earliest moment something will be due in [`pump`](Self::pump).
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        [
            self.editor.next_deadline(),
            self.toast.as_ref().map(|t| t.expires_at),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Write any pending edit before the process exits.
    pub fn shutdown(&mut self) {
        self.editor.release(&self.store);
        self.list.release(&mut self.surface);
        self.drain_notices();
        self.active = ActiveView::None;
        tracing::info!("Shell shut down");
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn editor(&self) -> &EditView {
        &self.editor
    }

    pub fn active_view(&self) -> ActiveView {
        self.active
    }

    pub fn current_path(&self) -> String {
        self.router.current_path()
    }

    /// Persistent warning shown while storage is unavailable.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    fn dispatch_route(&mut self) {
        if let Some(matched) = self.router.handle_route_change() {
            (matched.handler)(self, &matched.params);
        }
    }

    fn show_index(&mut self, _params: &Params) {
        self.editor.release(&self.store);
        let now = self.clock.now();
        self.list.render(&self.store, now, &mut self.surface);
        self.active = ActiveView::Index;
    }

    fn show_editor(&mut self, params: &Params) {
        self.list.release(&mut self.surface);
        let Some(id) = params.get("id") else {
            self.router.navigate("/");
            return;
        };
        match self.editor.enter(id, &self.store, &mut self.surface) {
            Outcome::Stay => self.active = ActiveView::Editor,
            outcome => self.apply(outcome),
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        if let Outcome::Navigate(path) = outcome {
            self.router.navigate(&path);
        }
    }

    fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice {
                StoreNotice::Corrupted { message } => self.show_toast(message),
                StoreNotice::WriteFailed { operation } => {
                    tracing::debug!(operation, "Reporting failed write");
                    self.show_toast(WRITE_FAILED_MESSAGE);
                }
            }
        }
    }

    fn show_toast(&mut self, message: impl Into<String>) {
        let now = self.clock.now();
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: now
                .checked_add_signed(self.config.toast_duration())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }
}
