//! Multi-select state for the coins list.

use crate::models::{DisplayItem, TrackedPair};

/// Result of a tap or long-press on a list item
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    /// Selection mode is off: open the pair's detail page
    OpenDetail(TrackedPair),
    /// The item's selection flag flipped to `selected`
    Toggled { pair: TrackedPair, selected: bool },
    /// No item with that pair is displayed
    Ignored,
}

/// Tracks whether selection mode is active.
///
/// Per-item flags live on [`DisplayItem::selected`]; `any_selected` is
/// recomputed from them after every mutation.
#[derive(Debug, Default, Clone)]
pub struct MultiSelector {
    any_selected: bool,
}

impl MultiSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff at least one item is selected
    pub fn any_selected(&self) -> bool {
        self.any_selected
    }

    /// Plain tap: navigates when nothing is selected, toggles otherwise
    pub fn tap(&mut self, items: &mut [DisplayItem], pair: &TrackedPair) -> TapOutcome {
        if !self.any_selected {
            return if items.iter().any(|item| &item.pair == pair) {
                TapOutcome::OpenDetail(pair.clone())
            } else {
                TapOutcome::Ignored
            };
        }
        self.toggle(items, pair)
    }

    /// Long-press always toggles
    pub fn long_press(&mut self, items: &mut [DisplayItem], pair: &TrackedPair) -> TapOutcome {
        self.toggle(items, pair)
    }

    fn toggle(&mut self, items: &mut [DisplayItem], pair: &TrackedPair) -> TapOutcome {
        let outcome = match items.iter_mut().find(|item| &item.pair == pair) {
            Some(item) => {
                item.selected = !item.selected;
                TapOutcome::Toggled {
                    pair: pair.clone(),
                    selected: item.selected,
                }
            }
            None => TapOutcome::Ignored,
        };
        self.recompute(items);
        outcome
    }

    /// Clear every flag. Returns `true` if anything was selected.
    pub fn clear(&mut self, items: &mut [DisplayItem]) -> bool {
        if !self.any_selected {
            return false;
        }
        items.iter_mut().for_each(|item| item.selected = false);
        self.any_selected = false;
        true
    }

    /// Remove and return every selected item
    pub fn delete_selected(&mut self, items: &mut Vec<DisplayItem>) -> Vec<DisplayItem> {
        let (removed, kept): (Vec<_>, Vec<_>) = items.drain(..).partition(|item| item.selected);
        *items = kept;
        self.recompute(items);
        removed
    }

    /// Re-derive `any_selected` from the item flags
    pub fn recompute(&mut self, items: &[DisplayItem]) {
        self.any_selected = items.iter().any(|item| item.selected);
    }
}
