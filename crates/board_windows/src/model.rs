use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_WIDTH: i32 = 320;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 400;
pub const DEFAULT_INFO_WINDOW_OFFSET: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

impl Default for WindowRect {
    fn default() -> Self {
        Self {
            x: 48,
            y: 48,
            w: DEFAULT_WINDOW_WIDTH,
            h: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Persisted geometry and visibility of one window.
///
/// `filter_text` is only present for filtered object-list windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub geometry: WindowRect,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
}

/// Selected list rows persisted ahead of a list window's view state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListSelectionRecord {
    pub selected_indices: Vec<usize>,
}

/// Filter text and selected rows captured for a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListSnapshotInfo {
    pub filter: String,
    pub selected_indices: Vec<usize>,
}

/// Choice positions persisted ahead of the manual-rules window's view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesSelectionRecord {
    pub clearance_position: usize,
    pub layer_position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilterPolicy {
    pub case_sensitive: bool,
}

impl Default for ListFilterPolicy {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl ListFilterPolicy {
    /// Returns whether `label` passes `filter`. A blank filter matches everything.
    pub fn matches(self, filter: &str, label: &str) -> bool {
        let filter = filter.trim();
        if filter.is_empty() {
            return true;
        }
        if self.case_sensitive {
            label.contains(filter)
        } else {
            label.to_lowercase().contains(&filter.to_lowercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubWindowPreferences {
    pub info_window_offset: i32,
    pub default_rect: WindowRect,
    pub filter_policy: ListFilterPolicy,
}

impl Default for SubWindowPreferences {
    fn default() -> Self {
        Self {
            info_window_offset: DEFAULT_INFO_WINDOW_OFFSET,
            default_rect: WindowRect::default(),
            filter_policy: ListFilterPolicy::default(),
        }
    }
}
