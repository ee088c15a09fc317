//! Sub-window lifecycle: iconify fan-out, disposal, and the temporary-window registry.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use crate::model::{WindowId, WindowRect};

/// Shared handle to a temporary window; the registry and its creator both hold one.
pub type TemporaryWindowHandle = Rc<RefCell<SubWindow>>;
/// Shared handle to the owner's temporary-window registry.
pub type RegistryHandle = Rc<RefCell<TemporaryWindowRegistry>>;

type DisposeHook = Box<dyn FnMut(WindowId)>;

/// Hands out window ids for every window of one frame.
#[derive(Debug, Clone, Default)]
pub struct WindowIdAllocator {
    next: Rc<Cell<u64>>,
}

impl WindowIdAllocator {
    pub fn next_id(&self) -> WindowId {
        let id = self.next.get().saturating_add(1);
        self.next.set(id);
        WindowId(id)
    }
}

/// Floatable panel owned by a board frame.
pub struct SubWindow {
    id: WindowId,
    title: String,
    rect: WindowRect,
    visible: bool,
    visible_before_iconify: Option<bool>,
    temporary: bool,
    disposed: bool,
    // back-reference for self-deregistration only
    registry: Weak<RefCell<TemporaryWindowRegistry>>,
    on_dispose: Option<DisposeHook>,
}

impl fmt::Debug for SubWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubWindow")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("rect", &self.rect)
            .field("visible", &self.visible)
            .field("visible_before_iconify", &self.visible_before_iconify)
            .field("temporary", &self.temporary)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl SubWindow {
    /// Creates a hidden permanent window.
    pub fn new(id: WindowId, title: impl Into<String>, rect: WindowRect) -> Self {
        Self {
            id,
            title: title.into(),
            rect,
            visible: false,
            visible_before_iconify: None,
            temporary: false,
            disposed: false,
            registry: Weak::new(),
            on_dispose: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rect(&self) -> WindowRect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: WindowRect) {
        self.rect = rect;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if !self.disposed {
            self.visible = visible;
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Installs a hook fired once when the window is disposed by either path.
    pub fn set_on_dispose(&mut self, hook: impl FnMut(WindowId) + 'static) {
        self.on_dispose = Some(Box::new(hook));
    }

    /// Records the current visibility and hides the window while the owner is minimized.
    pub fn iconify_notify(&mut self) {
        self.visible_before_iconify = Some(self.visible);
        self.visible = false;
    }

    /// Restores the visibility recorded by the last [`SubWindow::iconify_notify`], if any.
    pub fn deiconify_notify(&mut self) {
        if let Some(visible) = self.visible_before_iconify {
            self.set_visible(visible);
        }
    }

    /// User-initiated close. Temporary windows also leave the owner's registry.
    ///
    /// For a window behind a [`TemporaryWindowHandle`] use [`dispose_temporary_window`], which
    /// releases the borrow before the dispose hook runs.
    pub fn dispose(&mut self) {
        let hook = self.close_by_user();
        self.run_hook(hook);
    }

    /// Owner-initiated close; skips deregistration because the owner is draining the registry.
    pub fn board_frame_disposed(&mut self) {
        let hook = self.close_by_owner();
        self.run_hook(hook);
    }

    fn close_by_user(&mut self) -> Option<DisposeHook> {
        if self.disposed {
            return None;
        }
        if self.temporary {
            if let Some(registry) = self.registry.upgrade() {
                registry.borrow_mut().remove(self.id);
            }
        }
        self.finish_dispose()
    }

    fn close_by_owner(&mut self) -> Option<DisposeHook> {
        if self.disposed {
            return None;
        }
        self.finish_dispose()
    }

    fn finish_dispose(&mut self) -> Option<DisposeHook> {
        self.disposed = true;
        self.visible = false;
        self.on_dispose.take()
    }

    fn run_hook(&self, hook: Option<DisposeHook>) {
        if let Some(mut hook) = hook {
            hook(self.id);
        }
    }
}

/// Membership set of live temporary windows, keyed by window identity.
#[derive(Debug, Default)]
pub struct TemporaryWindowRegistry {
    windows: HashMap<WindowId, TemporaryWindowHandle>,
}

impl TemporaryWindowRegistry {
    pub fn insert(&mut self, window: TemporaryWindowHandle) {
        let id = window.borrow().id();
        self.windows.insert(id, window);
    }

    /// Removes `id`; removing a non-member is a no-op.
    pub fn remove(&mut self, id: WindowId) -> Option<TemporaryWindowHandle> {
        self.windows.remove(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns handles to every member without changing membership.
    pub fn snapshot(&self) -> Vec<TemporaryWindowHandle> {
        self.windows.values().cloned().collect()
    }

    fn drain_all(&mut self) -> Vec<TemporaryWindowHandle> {
        std::mem::take(&mut self.windows).into_values().collect()
    }
}

/// Creates a visible temporary window and registers it with `registry`.
pub fn open_temporary_window(
    registry: &RegistryHandle,
    ids: &WindowIdAllocator,
    title: impl Into<String>,
    rect: WindowRect,
) -> TemporaryWindowHandle {
    let mut window = SubWindow::new(ids.next_id(), title, rect);
    window.temporary = true;
    window.visible = true;
    window.registry = Rc::downgrade(registry);
    let handle = Rc::new(RefCell::new(window));
    registry.borrow_mut().insert(Rc::clone(&handle));
    handle
}

/// User-initiated close of a shared temporary window.
///
/// The dispose hook runs after the window borrow is released, so it may inspect the handle.
pub fn dispose_temporary_window(window: &TemporaryWindowHandle) {
    let (id, hook) = {
        let mut window = window.borrow_mut();
        (window.id(), window.close_by_user())
    };
    if let Some(mut hook) = hook {
        hook(id);
    }
}

/// Force-disposes every registered temporary window and empties the registry.
///
/// Returns the ids that received the owner disposal call.
pub fn dispose_temporary_windows(registry: &RegistryHandle) -> Vec<WindowId> {
    let drained = registry.borrow_mut().drain_all();
    let mut disposed = Vec::with_capacity(drained.len());
    for window in drained {
        let (id, hook) = {
            let mut window = window.borrow_mut();
            (window.id(), window.close_by_owner())
        };
        if let Some(mut hook) = hook {
            hook(id);
        }
        disposed.push(id);
    }
    disposed
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn registry() -> RegistryHandle {
        Rc::new(RefCell::new(TemporaryWindowRegistry::default()))
    }

    #[test]
    fn iconify_hides_and_deiconify_restores_previous_visibility() {
        let mut window = SubWindow::new(WindowId(1), "Components", WindowRect::default());
        window.set_visible(true);

        window.iconify_notify();
        assert!(!window.is_visible());
        window.deiconify_notify();
        assert!(window.is_visible());
    }

    #[test]
    fn window_closed_before_iconify_stays_closed_on_restore() {
        let mut window = SubWindow::new(WindowId(1), "Packages", WindowRect::default());
        window.set_visible(false);

        window.iconify_notify();
        window.deiconify_notify();
        assert!(!window.is_visible());
    }

    #[test]
    fn deiconify_without_iconify_is_noop() {
        let mut window = SubWindow::new(WindowId(1), "Padstacks", WindowRect::default());
        window.set_visible(true);
        window.deiconify_notify();
        assert!(window.is_visible());
        assert!(!window.is_temporary());
    }

    #[test]
    fn temporary_window_registers_on_open_and_deregisters_on_close() {
        let registry = registry();
        let ids = WindowIdAllocator::default();

        let window = open_temporary_window(&registry, &ids, "Info", WindowRect::default());
        let id = window.borrow().id();
        assert!(registry.borrow().contains(id));
        assert!(window.borrow().is_temporary());

        window.borrow_mut().dispose();
        assert!(!registry.borrow().contains(id));
        assert!(window.borrow().is_disposed());

        window.borrow_mut().dispose();
        assert!(registry.borrow_mut().remove(id).is_none());
    }

    #[test]
    fn owner_teardown_disposes_each_member_once_and_empties_registry() {
        let registry = registry();
        let ids = WindowIdAllocator::default();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let title = format!("Info {n}");
            let window = open_temporary_window(&registry, &ids, title, WindowRect::default());
            let calls = Rc::clone(&calls);
            window
                .borrow_mut()
                .set_on_dispose(move |id| calls.borrow_mut().push(id));
        }

        let mut disposed = dispose_temporary_windows(&registry);
        disposed.sort();
        let mut seen = calls.borrow().clone();
        seen.sort();

        assert_eq!(disposed, vec![WindowId(1), WindowId(2), WindowId(3)]);
        assert_eq!(seen, disposed);
        assert!(registry.borrow().is_empty());
        assert!(dispose_temporary_windows(&registry).is_empty());
    }

    #[test]
    fn dispose_hook_can_inspect_its_own_handle() {
        let registry = registry();
        let ids = WindowIdAllocator::default();
        let observed = Rc::new(RefCell::new(Vec::new()));

        let mut windows = Vec::new();
        for title in ["closed by user", "closed by owner"] {
            let window = open_temporary_window(&registry, &ids, title, WindowRect::default());
            let handle = Rc::downgrade(&window);
            let observed = Rc::clone(&observed);
            window.borrow_mut().set_on_dispose(move |_| {
                let window = handle.upgrade().expect("window alive");
                let window = window.borrow();
                observed
                    .borrow_mut()
                    .push((window.title().to_string(), window.is_disposed()));
            });
            windows.push(window);
        }

        dispose_temporary_window(&windows[0]);
        assert!(!registry.borrow().contains(windows[0].borrow().id()));
        dispose_temporary_windows(&registry);

        assert_eq!(
            *observed.borrow(),
            vec![
                ("closed by user".to_string(), true),
                ("closed by owner".to_string(), true),
            ]
        );
    }

    #[test]
    fn disposed_window_ignores_visibility_changes() {
        let mut window = SubWindow::new(WindowId(4), "Rules", WindowRect::default());
        window.dispose();
        window.set_visible(true);
        assert!(!window.is_visible());
    }
}
