//! Pure lookups used by the rendering layer.

use crate::models::{DisplayItem, Holding, TrackedPair};

/// Whether a coin symbol is already tracked against any quote currency
pub fn is_coin_added(items: &[DisplayItem], symbol: &str) -> bool {
    items.iter().any(|item| item.pair.from == symbol)
}

/// Holding for the given pair, if the user has one
pub fn find_holding<'a>(holdings: &'a [Holding], pair: &TrackedPair) -> Option<&'a Holding> {
    holdings.iter().find(|holding| &holding.pair == pair)
}

/// Current value of a holding at the latest displayed price
pub fn holding_value(holding: &Holding, items: &[DisplayItem]) -> Option<f64> {
    items
        .iter()
        .find(|item| item.pair == holding.pair)
        .and_then(DisplayItem::price)
        .map(|price| holding.quantity * price)
}

/// Sum of all holdings that currently have a price
pub fn total_holdings_value(holdings: &[Holding], items: &[DisplayItem]) -> f64 {
    holdings
        .iter()
        .filter_map(|holding| holding_value(holding, items))
        .sum()
}
