//! Filtered object-list windows: live document snapshot, text filter, and selection push.
//!
//! Filtering happens while the list is populated, so a new filter takes effect on the next
//! [`ObjectListWindow::fill_list`]. Entries are rebuilt from the document on every fill and refer
//! to objects by identity only.

mod kinds;

use std::{
    cell::RefCell,
    collections::BTreeSet,
    rc::{Rc, Weak},
};

use board_host::{BoardDocument, BoardObject, ItemSet, SessionRecordStream, TextLookup};
use leptos::logging;

pub use kinds::ObjectListKind;

use crate::{
    frame::FrameServices,
    model::{ListFilterPolicy, ListSelectionRecord, ListSnapshotInfo, ViewState},
    persistence::{
        read_record, write_record, SavableSubWindow, SavableWindow, LIST_SELECTION_KEY,
    },
    window_manager::{
        dispose_temporary_window, open_temporary_window, SubWindow, TemporaryWindowHandle,
        TemporaryWindowRegistry, WindowIdAllocator,
    },
};

/// One row of an object list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub object: BoardObject,
    pub label: String,
}

impl ListEntry {
    pub fn new(object: BoardObject) -> Self {
        let label = object.to_string();
        Self { object, label }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Empty,
    Populated,
    Filtered,
    SelectionPushed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListDisplay<'a> {
    Empty { message: String },
    Entries(&'a [ListEntry]),
}

/// Temporary window describing the entries selected when it was opened.
#[derive(Debug, Clone)]
pub struct InfoPopover {
    pub window: TemporaryWindowHandle,
    pub lines: Vec<String>,
}

pub struct ObjectListWindow {
    base: SavableSubWindow,
    kind: ObjectListKind,
    document: Rc<dyn BoardDocument>,
    text: Rc<dyn TextLookup>,
    filter: String,
    filter_policy: ListFilterPolicy,
    entries: Vec<ListEntry>,
    selected: BTreeSet<usize>,
    state: ListState,
    registry: Weak<RefCell<TemporaryWindowRegistry>>,
    ids: WindowIdAllocator,
    info_window_offset: i32,
    info_popovers: Vec<InfoPopover>,
}

impl ObjectListWindow {
    pub fn new(kind: ObjectListKind, services: &FrameServices) -> Self {
        let window = SubWindow::new(
            services.ids.next_id(),
            services.text.text(kind.title_key()),
            services.preferences.default_rect,
        );
        Self {
            base: SavableSubWindow::new(window),
            kind,
            document: Rc::clone(&services.document),
            text: Rc::clone(&services.text),
            filter: String::new(),
            filter_policy: services.preferences.filter_policy,
            entries: Vec::new(),
            selected: BTreeSet::new(),
            state: ListState::Empty,
            registry: Rc::downgrade(&services.registry),
            ids: services.ids.clone(),
            info_window_offset: services.preferences.info_window_offset,
            info_popovers: Vec::new(),
        }
    }

    pub fn kind(&self) -> ObjectListKind {
        self.kind
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Stores the filter text; call [`ObjectListWindow::fill_list`] to apply it.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn display(&self) -> ListDisplay<'_> {
        if self.entries.is_empty() {
            ListDisplay::Empty {
                message: self.text.text("list_empty"),
            }
        } else {
            ListDisplay::Entries(&self.entries)
        }
    }

    /// Rebuilds the list from the live document, keeping only entries that pass the filter.
    pub fn fill_list(&mut self) {
        self.entries.clear();
        self.selected.clear();
        for entry in self.kind.snapshot(self.document.as_ref()) {
            self.add_to_list(entry);
        }
        self.state = if self.entries.is_empty() {
            ListState::Empty
        } else if self.filter.trim().is_empty() {
            ListState::Populated
        } else {
            ListState::Filtered
        };
    }

    /// Appends `entry` if its label passes the current filter.
    pub fn add_to_list(&mut self, entry: ListEntry) {
        if self.filter_policy.matches(&self.filter, &entry.label) {
            self.entries.push(entry);
        }
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Replaces the row selection; indices past the end of the list are dropped.
    pub fn select_indices(&mut self, indices: impl IntoIterator<Item = usize>) {
        let len = self.entries.len();
        self.selected = indices.into_iter().filter(|&idx| idx < len).collect();
    }

    pub fn invert_selection(&mut self) {
        self.selected = (0..self.entries.len())
            .filter(|idx| !self.selected.contains(idx))
            .collect();
    }

    /// Pushes the union of the items behind every selected row to the document and zooms to it.
    ///
    /// Returns `false` without touching the document when the union is empty.
    pub fn select_instances(&mut self) -> bool {
        let mut items = ItemSet::new();
        for entry in self.selected.iter().filter_map(|&idx| self.entries.get(idx)) {
            items.extend(self.kind.expand(self.document.as_ref(), &entry.object));
        }
        if items.is_empty() {
            return false;
        }
        self.document.set_selection(&items);
        self.document.zoom_to_selection();
        self.state = ListState::SelectionPushed;
        true
    }

    /// Shows or hides the window; showing re-reads the document first.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.fill_list();
        }
        self.base.sub_window_mut().set_visible(visible);
    }

    pub fn snapshot_info(&self) -> ListSnapshotInfo {
        ListSnapshotInfo {
            filter: self.filter.clone(),
            selected_indices: self.selected_indices(),
        }
    }

    pub fn apply_snapshot_info(&mut self, info: &ListSnapshotInfo) {
        if info.filter != self.filter {
            self.filter = info.filter.clone();
            self.fill_list();
        }
        if !info.selected_indices.is_empty() {
            self.select_indices(info.selected_indices.iter().copied());
        }
    }

    /// Opens a temporary window listing the selected rows next to this window.
    pub fn show_selected_info(&mut self) -> Option<TemporaryWindowHandle> {
        if self.selected.is_empty() {
            return None;
        }
        let registry = self.registry.upgrade()?;
        self.info_popovers
            .retain(|popover| !popover.window.borrow().is_disposed());
        let lines: Vec<String> = self
            .selected
            .iter()
            .filter_map(|&idx| self.entries.get(idx))
            .map(|entry| entry.label.clone())
            .collect();
        let rect = self
            .base
            .geometry()
            .offset(self.info_window_offset, self.info_window_offset);
        let title = self.text.text("info_title");
        let window = open_temporary_window(&registry, &self.ids, title, rect);
        self.info_popovers.push(InfoPopover {
            window: Rc::clone(&window),
            lines,
        });
        Some(window)
    }

    pub fn info_popovers(&self) -> &[InfoPopover] {
        &self.info_popovers
    }

    /// Re-reads the document, keeping the selected rows that still exist.
    fn recalculate(&mut self) {
        let selected = self.selected_indices();
        self.fill_list();
        self.select_indices(selected);
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            filter_text: Some(self.filter.clone()),
            ..self.base.view_state()
        }
    }
}

impl SavableWindow for ObjectListWindow {
    fn sub_window(&self) -> &SubWindow {
        self.base.sub_window()
    }

    fn sub_window_mut(&mut self) -> &mut SubWindow {
        self.base.sub_window_mut()
    }

    fn save(&self, stream: &mut dyn SessionRecordStream) {
        let selection = ListSelectionRecord {
            selected_indices: self.selected_indices(),
        };
        if let Err(err) = write_record(stream, LIST_SELECTION_KEY, &selection) {
            let title = self.sub_window().title();
            logging::warn!("save list selection of `{title}` failed: {err}");
        }
        self.base.save_view_state(stream, &self.view_state());
    }

    fn load(&mut self, stream: &mut dyn SessionRecordStream) -> bool {
        let selection = match read_record::<ListSelectionRecord>(stream, LIST_SELECTION_KEY) {
            Ok(selection) => Some(selection),
            Err(err) => {
                let title = self.sub_window().title();
                logging::warn!("load list selection of `{title}` failed: {err}");
                None
            }
        };
        // read the base record even after a failed selection read to keep the cursor aligned
        let state = self.base.read_view_state(stream);
        let (Some(selection), Some(state)) = (selection, state) else {
            return false;
        };

        self.filter = state.filter_text.clone().unwrap_or_default();
        self.base.apply_view_state(&state);
        self.fill_list();
        self.select_indices(selection.selected_indices);
        true
    }

    fn refresh(&mut self) {
        if self.sub_window().is_visible() {
            self.recalculate();
        }
    }

    fn parent_deiconified(&mut self) {
        let was_visible = self.sub_window().is_visible();
        self.base.sub_window_mut().deiconify_notify();
        if !was_visible && self.sub_window().is_visible() {
            self.recalculate();
        }
    }

    fn dispose(&mut self) {
        for popover in self.info_popovers.drain(..) {
            dispose_temporary_window(&popover.window);
        }
        self.base.sub_window_mut().dispose();
    }
}
