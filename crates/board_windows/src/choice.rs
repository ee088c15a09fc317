//! Selection widgets over small, resizable document domains (clearance classes, signal layers).
//!
//! Selection survives a domain rebuild by *position*, not by identity: after
//! [`IndexStableChoice::adjust`] the selected position is `min(old_position, new_len - 1)`. An
//! entry that moved to a different position is not followed.

use board_host::{BoardDocument, DomainKind, TextLookup};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Synthetic layer entry standing for every signal layer.
pub const ALL_LAYER_INDEX: i32 = -1;
/// Synthetic layer entry standing for the inner signal layers.
pub const INNER_LAYER_INDEX: i32 = -2;
/// Clearance choices start on the `default` class, which follows the `null` class.
pub const DEFAULT_CLEARANCE_POSITION: usize = 1;
pub const DEFAULT_LAYER_POSITION: usize = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("position {position} is outside the {len} available options")]
    PositionOutOfRange { position: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    /// Domain index, or one of the negative synthetic indices.
    pub domain_index: i32,
}

/// Combo-box model whose selected position always indexes a valid option while any exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStableChoice {
    options: Vec<ChoiceOption>,
    selected: Option<usize>,
}

impl IndexStableChoice {
    pub fn new(options: Vec<ChoiceOption>, default_position: usize) -> Self {
        let selected = clamp_position(default_position, options.len());
        Self { options, selected }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn selected_position(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&ChoiceOption> {
        self.selected.and_then(|pos| self.options.get(pos))
    }

    pub fn selected_domain_index(&self) -> Option<i32> {
        self.selected_option().map(|option| option.domain_index)
    }

    /// # Errors
    ///
    /// Returns [`ChoiceError::PositionOutOfRange`] and keeps the current selection when
    /// `position` does not index an option.
    pub fn select_position(&mut self, position: usize) -> Result<(), ChoiceError> {
        if position >= self.options.len() {
            return Err(ChoiceError::PositionOutOfRange {
                position,
                len: self.options.len(),
            });
        }
        self.selected = Some(position);
        Ok(())
    }

    /// Selects `position`, clamped to the last option.
    pub fn select_position_clamped(&mut self, position: usize) {
        self.selected = clamp_position(position, self.options.len());
    }

    /// Replaces the options and reselects at `min(old_position, new_len - 1)`.
    pub fn adjust(&mut self, options: Vec<ChoiceOption>) {
        let old_position = self.selected.unwrap_or(0);
        self.selected = clamp_position(old_position, options.len());
        self.options = options;
    }
}

fn clamp_position(position: usize, len: usize) -> Option<usize> {
    len.checked_sub(1).map(|last| position.min(last))
}

/// Builds one option per clearance class.
pub fn clearance_options(document: &dyn BoardDocument) -> Vec<ChoiceOption> {
    (0..document.domain_size(DomainKind::ClearanceClass))
        .map(|idx| ChoiceOption {
            label: document.domain_label(DomainKind::ClearanceClass, idx),
            domain_index: idx as i32,
        })
        .collect()
}

/// Builds the layer options: `all` first, `inner` when there are more than two signal layers,
/// then one option per signal layer.
pub fn layer_options(document: &dyn BoardDocument, text: &dyn TextLookup) -> Vec<ChoiceOption> {
    let layer_count = document.domain_size(DomainKind::SignalLayer);
    let mut options = Vec::with_capacity(layer_count + 2);
    options.push(ChoiceOption {
        label: text.text("layer_all"),
        domain_index: ALL_LAYER_INDEX,
    });
    if layer_count > 2 {
        options.push(ChoiceOption {
            label: text.text("layer_inner"),
            domain_index: INNER_LAYER_INDEX,
        });
    }
    options.extend((0..layer_count).map(|idx| ChoiceOption {
        label: document.domain_label(DomainKind::SignalLayer, idx),
        domain_index: idx as i32,
    }));
    options
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearanceChoice {
    choice: IndexStableChoice,
}

impl ClearanceChoice {
    pub fn new(document: &dyn BoardDocument) -> Self {
        Self {
            choice: IndexStableChoice::new(
                clearance_options(document),
                DEFAULT_CLEARANCE_POSITION,
            ),
        }
    }

    pub fn choice(&self) -> &IndexStableChoice {
        &self.choice
    }

    pub fn choice_mut(&mut self) -> &mut IndexStableChoice {
        &mut self.choice
    }

    /// Selected clearance class number.
    pub fn selected_class(&self) -> Option<usize> {
        self.choice
            .selected_domain_index()
            .and_then(|idx| usize::try_from(idx).ok())
    }

    pub fn adjust(&mut self, document: &dyn BoardDocument) {
        self.choice.adjust(clearance_options(document));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSelection {
    All,
    Inner,
    Layer(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerChoice {
    choice: IndexStableChoice,
    layer_count: usize,
}

impl LayerChoice {
    pub fn new(document: &dyn BoardDocument, text: &dyn TextLookup) -> Self {
        Self {
            choice: IndexStableChoice::new(layer_options(document, text), DEFAULT_LAYER_POSITION),
            layer_count: document.domain_size(DomainKind::SignalLayer),
        }
    }

    pub fn choice(&self) -> &IndexStableChoice {
        &self.choice
    }

    pub fn choice_mut(&mut self) -> &mut IndexStableChoice {
        &mut self.choice
    }

    pub fn selected_layer(&self) -> Option<LayerSelection> {
        match self.choice.selected_domain_index()? {
            ALL_LAYER_INDEX => Some(LayerSelection::All),
            INNER_LAYER_INDEX => Some(LayerSelection::Inner),
            idx => usize::try_from(idx).ok().map(LayerSelection::Layer),
        }
    }

    /// Resolves the selection to real signal-layer indices; synthetic entries never leak out.
    pub fn actionable_layers(&self) -> Vec<usize> {
        match self.selected_layer() {
            Some(LayerSelection::All) => (0..self.layer_count).collect(),
            Some(LayerSelection::Inner) => (1..self.layer_count.saturating_sub(1)).collect(),
            Some(LayerSelection::Layer(idx)) => vec![idx],
            None => Vec::new(),
        }
    }

    pub fn adjust(&mut self, document: &dyn BoardDocument, text: &dyn TextLookup) {
        self.layer_count = document.domain_size(DomainKind::SignalLayer);
        self.choice.adjust(layer_options(document, text));
    }
}
