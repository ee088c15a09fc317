//! Per-kind snapshot ordering and selection expansion for object-list windows.

use board_host::{BoardDocument, BoardObject, ItemSet, ObjectKind};
use serde::{Deserialize, Serialize};

use super::ListEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectListKind {
    Components,
    Packages,
    Padstacks,
    Incompletes,
}

impl ObjectListKind {
    pub const ALL: [Self; 4] = [
        Self::Components,
        Self::Packages,
        Self::Padstacks,
        Self::Incompletes,
    ];

    pub fn object_kind(self) -> ObjectKind {
        match self {
            Self::Components => ObjectKind::Component,
            Self::Packages => ObjectKind::Package,
            Self::Padstacks => ObjectKind::Padstack,
            Self::Incompletes => ObjectKind::Incomplete,
        }
    }

    pub fn title_key(self) -> &'static str {
        match self {
            Self::Components => "components_title",
            Self::Packages => "packages_title",
            Self::Padstacks => "padstacks_title",
            Self::Incompletes => "incompletes_title",
        }
    }

    /// Returns the live objects of this kind in display order, ties broken by creation index.
    pub fn snapshot(self, document: &dyn BoardDocument) -> Vec<ListEntry> {
        let mut entries: Vec<ListEntry> = document
            .objects_of_kind(self.object_kind())
            .into_iter()
            .map(ListEntry::new)
            .collect();
        entries.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.object.creation_index().cmp(&b.object.creation_index()))
        });
        entries
    }

    /// Maps one object to the document items a selection of it stands for.
    pub fn expand(self, document: &dyn BoardDocument, object: &BoardObject) -> ItemSet {
        match (self, object) {
            (Self::Components, BoardObject::Component(c)) => document.items_for_component(c.id),
            (Self::Packages, BoardObject::Package(p)) => document.items_for_package(p.id),
            (Self::Padstacks, BoardObject::Padstack(p)) => document.items_for_padstack(p.id),
            (Self::Incompletes, BoardObject::Incomplete(i)) => ItemSet::from([i.from, i.to]),
            _ => ItemSet::new(),
        }
    }
}
