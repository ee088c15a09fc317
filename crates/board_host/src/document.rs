//! Board document contract: object snapshots, item lookups, selection and viewport pushes.

use std::{cell::RefCell, collections::BTreeSet, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

/// Identity of one board item (pin, trace, via, conduction area).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Identity of a placed component. Ids are handed out in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// Identity of a component package (footprint library entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(pub u32);

/// Identity of a padstack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PadstackId(pub u32);

/// Identity of an unrouted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncompleteId(pub u32);

/// Uniqueness-preserving set of items pushed to the document as one selection.
pub type ItemSet = BTreeSet<ItemId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Kinds of document objects that object-list windows browse.
pub enum ObjectKind {
    /// Placed components.
    Component,
    /// Component packages.
    Package,
    /// Padstacks.
    Padstack,
    /// Unrouted connections.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Enumerable, resizable option domains exposed by the document.
pub enum DomainKind {
    /// Clearance classes of the clearance matrix.
    ClearanceClass,
    /// Signal layers of the layer structure.
    SignalLayer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Placed component snapshot.
pub struct ComponentObject {
    /// Component identity.
    pub id: ComponentId,
    /// Reference designator, for example `U3`.
    pub name: String,
    /// Package the component is placed with.
    pub package: PackageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Package snapshot.
pub struct PackageObject {
    /// Package identity.
    pub id: PackageId,
    /// Package name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Padstack snapshot.
pub struct PadstackObject {
    /// Padstack identity.
    pub id: PadstackId,
    /// Padstack name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Unrouted connection between two items of the same net.
pub struct IncompleteConnection {
    /// Connection identity.
    pub id: IncompleteId,
    /// Net the connection belongs to.
    pub net_name: String,
    /// First endpoint item.
    pub from: ItemId,
    /// Display label of the first endpoint (for example `U3-1`).
    pub from_label: String,
    /// Second endpoint item.
    pub to: ItemId,
    /// Display label of the second endpoint.
    pub to_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot of one live document object.
pub enum BoardObject {
    /// Placed component.
    Component(ComponentObject),
    /// Package.
    Package(PackageObject),
    /// Padstack.
    Padstack(PadstackObject),
    /// Unrouted connection.
    Incomplete(IncompleteConnection),
}

impl BoardObject {
    /// Returns the kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Component(_) => ObjectKind::Component,
            Self::Package(_) => ObjectKind::Package,
            Self::Padstack(_) => ObjectKind::Padstack,
            Self::Incomplete(_) => ObjectKind::Incomplete,
        }
    }

    /// Returns the creation index, used as the stable tie-breaker when sorting.
    pub fn creation_index(&self) -> u32 {
        match self {
            Self::Component(c) => c.id.0,
            Self::Package(p) => p.id.0,
            Self::Padstack(p) => p.id.0,
            Self::Incomplete(i) => i.id.0,
        }
    }
}

impl fmt::Display for BoardObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(c) => write!(f, "{}", c.name),
            Self::Package(p) => write!(f, "{}", p.name),
            Self::Padstack(p) => write!(f, "{}", p.name),
            Self::Incomplete(i) => write!(f, "{}: {} - {}", i.net_name, i.from_label, i.to_label),
        }
    }
}

/// Narrow document API consumed by the sub-window core.
///
/// Everything except [`BoardDocument::set_selection`] and [`BoardDocument::zoom_to_selection`] is
/// read-only. Implementations use interior mutability so windows can share one `Rc` handle.
pub trait BoardDocument {
    /// Returns a fresh snapshot of every live object of `kind`, in document order.
    fn objects_of_kind(&self, kind: ObjectKind) -> Vec<BoardObject>;

    /// Returns every item belonging to `component`.
    fn items_for_component(&self, component: ComponentId) -> ItemSet;

    /// Returns every item whose owning component is placed with `package`.
    fn items_for_package(&self, package: PackageId) -> ItemSet;

    /// Returns every item using `padstack`.
    fn items_for_padstack(&self, padstack: PadstackId) -> ItemSet;

    /// Replaces the document selection.
    fn set_selection(&self, items: &ItemSet);

    /// Zooms the viewport to the current selection.
    fn zoom_to_selection(&self);

    /// Returns the current size of `domain`.
    fn domain_size(&self, domain: DomainKind) -> usize;

    /// Returns the display label of entry `index` of `domain`.
    fn domain_label(&self, domain: DomainKind, index: usize) -> String;
}

#[derive(Debug, Clone, Default)]
struct MemoryItem {
    component: Option<ComponentId>,
    padstack: Option<PadstackId>,
}

#[derive(Debug, Default)]
struct MemoryBoard {
    components: Vec<ComponentObject>,
    packages: Vec<PackageObject>,
    padstacks: Vec<PadstackObject>,
    incompletes: Vec<IncompleteConnection>,
    items: Vec<MemoryItem>,
    clearance_classes: Vec<String>,
    signal_layers: Vec<String>,
    selection: ItemSet,
    zoom_requests: usize,
    selection_pushes: usize,
    next_ids: NextIds,
}

/// Per-kind id counters; ids are never reused after a removal.
#[derive(Debug, Default)]
struct NextIds {
    component: u32,
    package: u32,
    padstack: u32,
    incomplete: u32,
}

fn allocate(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

#[derive(Debug, Clone, Default)]
/// In-memory board document for headless hosts and tests.
///
/// Objects are returned in insertion order. Removing a component keeps its items unowned.
pub struct MemoryBoardDocument {
    inner: Rc<RefCell<MemoryBoard>>,
}

impl MemoryBoardDocument {
    /// Adds a package and returns its id.
    pub fn add_package(&self, name: impl Into<String>) -> PackageId {
        let mut board = self.inner.borrow_mut();
        let id = PackageId(allocate(&mut board.next_ids.package));
        board.packages.push(PackageObject {
            id,
            name: name.into(),
        });
        id
    }

    /// Adds a padstack and returns its id.
    pub fn add_padstack(&self, name: impl Into<String>) -> PadstackId {
        let mut board = self.inner.borrow_mut();
        let id = PadstackId(allocate(&mut board.next_ids.padstack));
        board.padstacks.push(PadstackObject {
            id,
            name: name.into(),
        });
        id
    }

    /// Places a component with `package` and returns its id.
    pub fn add_component(&self, name: impl Into<String>, package: PackageId) -> ComponentId {
        let mut board = self.inner.borrow_mut();
        let id = ComponentId(allocate(&mut board.next_ids.component));
        board.components.push(ComponentObject {
            id,
            name: name.into(),
            package,
        });
        id
    }

    /// Adds an item, optionally owned by a component and using a padstack.
    pub fn add_item(
        &self,
        component: Option<ComponentId>,
        padstack: Option<PadstackId>,
    ) -> ItemId {
        let mut board = self.inner.borrow_mut();
        // items are never removed, so an item id is its position
        let id = ItemId(board.items.len() as u32);
        board.items.push(MemoryItem {
            component,
            padstack,
        });
        id
    }

    /// Adds an unrouted connection between two items and returns its id.
    pub fn add_incomplete(
        &self,
        net_name: impl Into<String>,
        from: (ItemId, &str),
        to: (ItemId, &str),
    ) -> IncompleteId {
        let mut board = self.inner.borrow_mut();
        let id = IncompleteId(allocate(&mut board.next_ids.incomplete));
        board.incompletes.push(IncompleteConnection {
            id,
            net_name: net_name.into(),
            from: from.0,
            from_label: from.1.to_string(),
            to: to.0,
            to_label: to.1.to_string(),
        });
        id
    }

    /// Removes a component; its items stay but lose their owner.
    pub fn remove_component(&self, component: ComponentId) {
        let mut board = self.inner.borrow_mut();
        board.components.retain(|c| c.id != component);
        for item in &mut board.items {
            if item.component == Some(component) {
                item.component = None;
            }
        }
    }

    /// Marks an unrouted connection as routed.
    pub fn resolve_incomplete(&self, incomplete: IncompleteId) {
        self.inner
            .borrow_mut()
            .incompletes
            .retain(|i| i.id != incomplete);
    }

    /// Replaces the clearance class names (for example after a rules reload).
    pub fn set_clearance_classes<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.borrow_mut().clearance_classes = names.into_iter().map(Into::into).collect();
    }

    /// Replaces the signal layer names.
    pub fn set_signal_layers<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.borrow_mut().signal_layers = names.into_iter().map(Into::into).collect();
    }

    /// Returns the current document selection.
    pub fn selection(&self) -> ItemSet {
        self.inner.borrow().selection.clone()
    }

    /// Returns how many selections were pushed.
    pub fn selection_pushes(&self) -> usize {
        self.inner.borrow().selection_pushes
    }

    /// Returns how many zoom-to-selection requests were issued.
    pub fn zoom_requests(&self) -> usize {
        self.inner.borrow().zoom_requests
    }

    fn items_where(&self, predicate: impl Fn(&MemoryBoard, &MemoryItem) -> bool) -> ItemSet {
        let board = self.inner.borrow();
        board
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| predicate(&board, item))
            .map(|(idx, _)| ItemId(idx as u32))
            .collect()
    }
}

impl BoardDocument for MemoryBoardDocument {
    fn objects_of_kind(&self, kind: ObjectKind) -> Vec<BoardObject> {
        let board = self.inner.borrow();
        match kind {
            ObjectKind::Component => board
                .components
                .iter()
                .cloned()
                .map(BoardObject::Component)
                .collect(),
            ObjectKind::Package => board
                .packages
                .iter()
                .cloned()
                .map(BoardObject::Package)
                .collect(),
            ObjectKind::Padstack => board
                .padstacks
                .iter()
                .cloned()
                .map(BoardObject::Padstack)
                .collect(),
            ObjectKind::Incomplete => board
                .incompletes
                .iter()
                .cloned()
                .map(BoardObject::Incomplete)
                .collect(),
        }
    }

    fn items_for_component(&self, component: ComponentId) -> ItemSet {
        self.items_where(|_, item| item.component == Some(component))
    }

    fn items_for_package(&self, package: PackageId) -> ItemSet {
        self.items_where(|board, item| {
            item.component
                .and_then(|owner| board.components.iter().find(|c| c.id == owner))
                .map(|c| c.package == package)
                .unwrap_or(false)
        })
    }

    fn items_for_padstack(&self, padstack: PadstackId) -> ItemSet {
        self.items_where(|_, item| item.padstack == Some(padstack))
    }

    fn set_selection(&self, items: &ItemSet) {
        let mut board = self.inner.borrow_mut();
        board.selection = items.clone();
        board.selection_pushes += 1;
    }

    fn zoom_to_selection(&self) {
        self.inner.borrow_mut().zoom_requests += 1;
    }

    fn domain_size(&self, domain: DomainKind) -> usize {
        let board = self.inner.borrow();
        match domain {
            DomainKind::ClearanceClass => board.clearance_classes.len(),
            DomainKind::SignalLayer => board.signal_layers.len(),
        }
    }

    fn domain_label(&self, domain: DomainKind, index: usize) -> String {
        let board = self.inner.borrow();
        let names = match domain {
            DomainKind::ClearanceClass => &board.clearance_classes,
            DomainKind::SignalLayer => &board.signal_layers,
        };
        names.get(index).cloned().unwrap_or_default()
    }
}
