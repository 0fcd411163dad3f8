use serde::{Deserialize, Serialize};

use super::pair::{PriceQuote, TrackedPair};

/// On-screen row: a tracked pair joined with its latest quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub pair: TrackedPair,
    pub full_name: String,
    pub image_url: String,
    pub quote: Option<PriceQuote>,
    /// Transient multi-select state, never persisted
    #[serde(skip)]
    pub selected: bool,
}

impl DisplayItem {
    /// Create an item for a freshly tracked pair with no price yet
    pub fn new(pair: TrackedPair) -> Self {
        Self {
            pair,
            full_name: String::new(),
            image_url: String::new(),
            quote: None,
            selected: false,
        }
    }

    /// Attach catalogue name and image
    pub fn with_info(mut self, full_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self.image_url = image_url.into();
        self
    }

    /// Update in place from a newer quote for the same pair.
    /// Name and image are only overwritten when the quote carries them.
    pub fn apply_quote(&mut self, quote: PriceQuote) {
        debug_assert_eq!(self.pair, quote.pair);
        if let Some(name) = quote.full_name.as_deref().filter(|n| !n.is_empty()) {
            self.full_name = name.to_string();
        }
        if let Some(image) = quote.image_url.as_deref().filter(|i| !i.is_empty()) {
            self.image_url = image.to_string();
        }
        self.quote = Some(quote);
    }

    /// Last known price, if any quote has arrived
    pub fn price(&self) -> Option<f64> {
        self.quote.as_ref().map(|q| q.price)
    }

    /// Last known 24h percent change
    pub fn change_pct_24h(&self) -> Option<f64> {
        self.quote.as_ref().map(|q| q.change_pct_24h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_quote_keeps_catalogue_name_when_quote_has_none() {
        let pair = TrackedPair::new("BTC", "USD");
        let mut item = DisplayItem::new(pair.clone()).with_info("Bitcoin (BTC)", "https://img/btc.png");
        item.apply_quote(PriceQuote::new(pair, 64000.0, 1.5));

        assert_eq!(item.full_name, "Bitcoin (BTC)");
        assert_eq!(item.image_url, "https://img/btc.png");
        assert_eq!(item.price(), Some(64000.0));
        assert_eq!(item.change_pct_24h(), Some(1.5));
    }

    #[test]
    fn selection_is_not_serialized() {
        let mut item = DisplayItem::new(TrackedPair::new("ETH", "EUR"));
        item.selected = true;
        let json = serde_json::to_string(&item).unwrap();
        let back: DisplayItem = serde_json::from_str(&json).unwrap();
        assert!(!back.selected);
    }
}
