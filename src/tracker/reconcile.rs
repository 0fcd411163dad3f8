//! Matching fetched quotes against the tracked pair list.
//!
//! The tracked list is the source of truth: output always has one entry per
//! tracked pair, in tracked order, and quotes for pairs nobody asked for are
//! dropped.

use crate::models::{DisplayItem, PriceQuote, TrackedPair};

/// Query parameters for a multi-pair price request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    /// Comma separated base codes
    pub fsyms: String,
    /// Comma separated quote codes
    pub tsyms: String,
}

/// Build the request for all tracked pairs: distinct base and quote codes in
/// first-appearance order. `None` when nothing is tracked.
pub fn price_request(pairs: &[TrackedPair]) -> Option<PriceRequest> {
    if pairs.is_empty() {
        return None;
    }

    let mut froms: Vec<&str> = Vec::new();
    let mut tos: Vec<&str> = Vec::new();
    for pair in pairs {
        if !froms.contains(&pair.from.as_str()) {
            froms.push(&pair.from);
        }
        if !tos.contains(&pair.to.as_str()) {
            tos.push(&pair.to);
        }
    }

    Some(PriceRequest {
        fsyms: froms.join(","),
        tsyms: tos.join(","),
    })
}

/// Keep only the quotes that match a tracked pair, in tracked order
pub fn filter_requested(tracked: &[TrackedPair], fetched: &[PriceQuote]) -> Vec<PriceQuote> {
    tracked
        .iter()
        .filter_map(|pair| fetched.iter().find(|quote| &quote.pair == pair))
        .cloned()
        .collect()
}

/// Join the current items with a fresh batch of quotes.
///
/// Items without a matching quote come back unchanged, selection included.
pub fn reconcile(current: &[DisplayItem], fetched: &[PriceQuote]) -> Vec<DisplayItem> {
    current
        .iter()
        .map(|item| {
            let mut next = item.clone();
            if let Some(quote) = fetched.iter().find(|quote| quote.pair == item.pair) {
                next.apply_quote(quote.clone());
            }
            next
        })
        .collect()
}
