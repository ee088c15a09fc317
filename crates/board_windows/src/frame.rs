//! The board frame: owner of every permanent and temporary sub-window.

use std::{cell::RefCell, rc::Rc};

use board_host::{BoardDocument, SessionRecordStream, TextLookup};
use leptos::logging;

use crate::{
    model::{SubWindowPreferences, WindowId, WindowRect},
    object_list::{ObjectListKind, ObjectListWindow},
    persistence::SavableWindow,
    rules::ManualRulesWindow,
    window_manager::{
        dispose_temporary_windows, open_temporary_window, RegistryHandle, TemporaryWindowHandle,
        TemporaryWindowRegistry, WindowIdAllocator,
    },
};

/// Collaborators handed to every window the frame creates.
#[derive(Clone)]
pub struct FrameServices {
    pub document: Rc<dyn BoardDocument>,
    pub text: Rc<dyn TextLookup>,
    pub preferences: SubWindowPreferences,
    pub registry: RegistryHandle,
    pub ids: WindowIdAllocator,
}

impl FrameServices {
    pub fn new(
        document: Rc<dyn BoardDocument>,
        text: Rc<dyn TextLookup>,
        preferences: SubWindowPreferences,
    ) -> Self {
        Self {
            document,
            text,
            preferences,
            registry: Rc::new(RefCell::new(TemporaryWindowRegistry::default())),
            ids: WindowIdAllocator::default(),
        }
    }
}

#[derive(Default)]
struct PermanentWindows {
    components: Option<ObjectListWindow>,
    packages: Option<ObjectListWindow>,
    padstacks: Option<ObjectListWindow>,
    incompletes: Option<ObjectListWindow>,
    manual_rules: Option<ManualRulesWindow>,
}

impl PermanentWindows {
    fn list_slot(&mut self, kind: ObjectListKind) -> &mut Option<ObjectListWindow> {
        match kind {
            ObjectListKind::Components => &mut self.components,
            ObjectListKind::Packages => &mut self.packages,
            ObjectListKind::Padstacks => &mut self.padstacks,
            ObjectListKind::Incompletes => &mut self.incompletes,
        }
    }

    /// Allocated windows in persistence order.
    fn allocated_mut(&mut self) -> Vec<&mut dyn SavableWindow> {
        let mut windows: Vec<&mut dyn SavableWindow> = Vec::new();
        if let Some(window) = self.components.as_mut() {
            windows.push(window);
        }
        if let Some(window) = self.packages.as_mut() {
            windows.push(window);
        }
        if let Some(window) = self.padstacks.as_mut() {
            windows.push(window);
        }
        if let Some(window) = self.incompletes.as_mut() {
            windows.push(window);
        }
        if let Some(window) = self.manual_rules.as_mut() {
            windows.push(window);
        }
        windows
    }
}

pub struct BoardFrame {
    services: FrameServices,
    permanent: PermanentWindows,
    disposed: bool,
}

impl BoardFrame {
    pub fn new(
        document: Rc<dyn BoardDocument>,
        text: Rc<dyn TextLookup>,
        preferences: SubWindowPreferences,
    ) -> Self {
        Self {
            services: FrameServices::new(document, text, preferences),
            permanent: PermanentWindows::default(),
            disposed: false,
        }
    }

    pub fn services(&self) -> &FrameServices {
        &self.services
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.services.registry
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns the list window for `kind`, creating it on first request.
    pub fn object_list_window(&mut self, kind: ObjectListKind) -> &mut ObjectListWindow {
        let services = &self.services;
        self.permanent
            .list_slot(kind)
            .get_or_insert_with(|| ObjectListWindow::new(kind, services))
    }

    pub fn manual_rules_window(&mut self) -> &mut ManualRulesWindow {
        let services = &self.services;
        self.permanent
            .manual_rules
            .get_or_insert_with(|| ManualRulesWindow::new(services))
    }

    /// Opens a temporary window that is force-closed when the frame is disposed.
    pub fn open_temporary_window(
        &self,
        title: impl Into<String>,
        rect: WindowRect,
    ) -> TemporaryWindowHandle {
        open_temporary_window(&self.services.registry, &self.services.ids, title, rect)
    }

    fn allocate_permanent_windows(&mut self) {
        for kind in ObjectListKind::ALL {
            self.object_list_window(kind);
        }
        self.manual_rules_window();
    }

    /// Hides every sub-window while the frame is minimized.
    pub fn parent_iconified(&mut self) {
        for window in self.permanent.allocated_mut() {
            window.parent_iconified();
        }
        let temporary = self.services.registry.borrow().snapshot();
        for window in temporary {
            window.borrow_mut().iconify_notify();
        }
    }

    pub fn parent_deiconified(&mut self) {
        for window in self.permanent.allocated_mut() {
            window.parent_deiconified();
        }
        let temporary = self.services.registry.borrow().snapshot();
        for window in temporary {
            window.borrow_mut().deiconify_notify();
        }
    }

    /// Forwards an external document change to every allocated window.
    pub fn refresh(&mut self) {
        for window in self.permanent.allocated_mut() {
            window.refresh();
        }
    }

    /// Saves every permanent window, in a fixed order, into one shared stream.
    pub fn save_windows(&mut self, stream: &mut dyn SessionRecordStream) {
        self.allocate_permanent_windows();
        for window in self.permanent.allocated_mut() {
            window.save(stream);
        }
    }

    /// Loads every permanent window in the order [`BoardFrame::save_windows`] wrote them.
    ///
    /// Returns `true` only when every window loaded.
    pub fn load_windows(&mut self, stream: &mut dyn SessionRecordStream) -> bool {
        self.allocate_permanent_windows();
        let mut all_loaded = true;
        for window in self.permanent.allocated_mut() {
            if !window.load(stream) {
                let title = window.sub_window().title();
                logging::warn!("window `{title}` kept its default placement");
                all_loaded = false;
            }
        }
        all_loaded
    }

    /// Disposes every permanent window, then force-disposes the remaining temporary windows.
    ///
    /// Returns the ids of the temporary windows closed by the frame.
    pub fn dispose(&mut self) -> Vec<WindowId> {
        if self.disposed {
            return Vec::new();
        }
        self.disposed = true;
        for window in self.permanent.allocated_mut() {
            window.dispose();
        }
        let closed = dispose_temporary_windows(&self.services.registry);
        logging::log!("board frame closed {} temporary windows", closed.len());
        closed
    }
}
