//! Typed host-domain contracts consumed by the board sub-window layer.
//!
//! This crate is the API-first boundary between the sub-window core and its collaborators: the
//! board document (object snapshots, item lookups, selection and viewport pushes), the sequential
//! session record stream that permanent windows persist into, and the text lookup capability that
//! replaces ambient resource bundles. In-memory adapters back tests and headless hosts.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod document;
pub mod storage;
pub mod text;

pub use document::{
    BoardDocument, BoardObject, ComponentId, ComponentObject, DomainKind, IncompleteConnection,
    IncompleteId, ItemId, ItemSet, MemoryBoardDocument, ObjectKind, PackageId, PackageObject,
    PadstackId, PadstackObject,
};
pub use storage::session::{
    JsonLinesRecordReader, JsonLinesRecordWriter, MemoryRecordStream, SessionRecord,
    SessionRecordStream, SESSION_RECORD_ENVELOPE_VERSION,
};
pub use text::{MemoryTextLookup, NoopTextLookup, TextLookup};
