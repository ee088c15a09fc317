//! Best-effort view-state persistence against a shared session record stream.

use board_host::{SessionRecord, SessionRecordStream, SESSION_RECORD_ENVELOPE_VERSION};
use leptos::logging;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    model::{ViewState, WindowRect},
    window_manager::SubWindow,
};

pub const VIEW_STATE_KEY: &str = "view_state";
pub const LIST_SELECTION_KEY: &str = "list_selection";
pub const RULES_SELECTION_KEY: &str = "rules_selection";

/// Failures while writing or reading one session record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// The underlying stream failed.
    #[error("session stream failed: {0}")]
    Stream(String),
    /// The stream had no record left to read.
    #[error("unexpected end of session stream")]
    EndOfStream,
    /// The next record was written by a different kind of window.
    #[error("expected `{expected}` record, found `{found}`")]
    KeyMismatch { expected: String, found: String },
    /// The record was written with an envelope version this build cannot read.
    #[error("unsupported session envelope version {0}")]
    EnvelopeVersion(u32),
    /// The payload did not decode into the expected shape.
    #[error("malformed `{key}` record: {reason}")]
    Malformed { key: String, reason: String },
    /// The payload could not be serialized.
    #[error("serialize `{key}` record failed: {reason}")]
    Serialize { key: String, reason: String },
}

/// Serializes `payload` and writes it as one `key` record.
///
/// # Errors
///
/// Returns [`PersistError::Serialize`] or [`PersistError::Stream`].
pub fn write_record<T: Serialize>(
    stream: &mut dyn SessionRecordStream,
    key: &str,
    payload: &T,
) -> Result<(), PersistError> {
    let payload = serde_json::to_value(payload).map_err(|e| PersistError::Serialize {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    stream
        .write_record(&SessionRecord::new(key, payload))
        .map_err(PersistError::Stream)
}

/// Reads the next record and decodes it as a `key` payload.
///
/// The record is consumed even when decoding fails, so the cursor stays aligned.
///
/// # Errors
///
/// Returns a [`PersistError`] describing why no value could be produced.
pub fn read_record<T: DeserializeOwned>(
    stream: &mut dyn SessionRecordStream,
    key: &str,
) -> Result<T, PersistError> {
    let record = stream
        .read_record()
        .map_err(PersistError::Stream)?
        .ok_or(PersistError::EndOfStream)?;
    if record.envelope_version != SESSION_RECORD_ENVELOPE_VERSION {
        return Err(PersistError::EnvelopeVersion(record.envelope_version));
    }
    if record.key != key {
        return Err(PersistError::KeyMismatch {
            expected: key.to_string(),
            found: record.key,
        });
    }
    serde_json::from_value(record.payload).map_err(|e| PersistError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// A permanent window the frame saves, loads, and refreshes.
pub trait SavableWindow {
    fn sub_window(&self) -> &SubWindow;

    fn sub_window_mut(&mut self) -> &mut SubWindow;

    /// Writes this window's records; failures are logged and swallowed.
    fn save(&self, stream: &mut dyn SessionRecordStream);

    /// Reads this window's records and applies them.
    ///
    /// Returns `false` and leaves the window untouched when any record fails.
    fn load(&mut self, stream: &mut dyn SessionRecordStream) -> bool;

    /// Re-derives displayed values after the document changed externally.
    fn refresh(&mut self) {}

    /// Hides the window while the owning frame is minimized.
    fn parent_iconified(&mut self) {
        self.sub_window_mut().iconify_notify();
    }

    /// Restores the visibility recorded by [`SavableWindow::parent_iconified`].
    fn parent_deiconified(&mut self) {
        self.sub_window_mut().deiconify_notify();
    }

    fn dispose(&mut self) {
        self.sub_window_mut().dispose();
    }
}

/// Sub-window whose geometry and visibility round-trip through the session stream.
#[derive(Debug)]
pub struct SavableSubWindow {
    window: SubWindow,
}

impl SavableSubWindow {
    pub fn new(window: SubWindow) -> Self {
        Self { window }
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            geometry: self.window.rect(),
            visible: self.window.is_visible(),
            filter_text: None,
        }
    }

    pub fn apply_view_state(&mut self, state: &ViewState) {
        self.window.set_rect(state.geometry);
        self.window.set_visible(state.visible);
    }

    /// Writes `state` as this window's base record.
    pub(crate) fn save_view_state(&self, stream: &mut dyn SessionRecordStream, state: &ViewState) {
        if let Err(err) = write_record(stream, VIEW_STATE_KEY, state) {
            logging::warn!("save view state of `{}` failed: {err}", self.window.title());
        }
    }

    /// Reads the base record without applying it.
    pub(crate) fn read_view_state(
        &self,
        stream: &mut dyn SessionRecordStream,
    ) -> Option<ViewState> {
        match read_record::<ViewState>(stream, VIEW_STATE_KEY) {
            Ok(state) => Some(state),
            Err(err) => {
                logging::warn!("load view state of `{}` failed: {err}", self.window.title());
                None
            }
        }
    }

    pub fn geometry(&self) -> WindowRect {
        self.window.rect()
    }
}

impl SavableWindow for SavableSubWindow {
    fn sub_window(&self) -> &SubWindow {
        &self.window
    }

    fn sub_window_mut(&mut self) -> &mut SubWindow {
        &mut self.window
    }

    fn save(&self, stream: &mut dyn SessionRecordStream) {
        self.save_view_state(stream, &self.view_state());
    }

    fn load(&mut self, stream: &mut dyn SessionRecordStream) -> bool {
        match self.read_view_state(stream) {
            Some(state) => {
                self.apply_view_state(&state);
                true
            }
            None => false,
        }
    }
}
