//! Sub-window lifecycle and view-state synchronization for the board editor.
//!
//! The [`frame::BoardFrame`] owns every auxiliary window: permanent savable windows that are
//! created lazily and persisted through one shared session stream, and temporary popovers tracked
//! in a [`window_manager::TemporaryWindowRegistry`] so they can be force-closed with the frame.

pub mod choice;
pub mod frame;
pub mod model;
pub mod object_list;
pub mod persistence;
pub mod rules;
pub mod window_manager;

pub use choice::{
    ChoiceError, ChoiceOption, ClearanceChoice, IndexStableChoice, LayerChoice, LayerSelection,
    ALL_LAYER_INDEX, INNER_LAYER_INDEX,
};
pub use frame::{BoardFrame, FrameServices};
pub use model::*;
pub use object_list::{
    InfoPopover, ListDisplay, ListEntry, ListState, ObjectListKind, ObjectListWindow,
};
pub use persistence::{PersistError, SavableSubWindow, SavableWindow};
pub use rules::ManualRulesWindow;
pub use window_manager::{
    dispose_temporary_window, dispose_temporary_windows, open_temporary_window, RegistryHandle,
    SubWindow, TemporaryWindowHandle, TemporaryWindowRegistry, WindowIdAllocator,
};
