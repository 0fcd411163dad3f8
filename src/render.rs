//! Row view-models for the list surfaces.
//!
//! Everything a surface shows is computed here so views stay dumb.

use crate::models::{DisplayItem, Holding, TopCoin};
use crate::tracker::queries::{find_holding, holding_value, is_coin_added};
use crate::utils::{add_commas, format_price, parse_lenient_f64, two_decimals};

/// Direction of a 24h change, drives arrow and colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Up,
    Flat,
    Down,
}

impl ChangeDirection {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change == 0.0 {
            Self::Flat
        } else {
            Self::Down
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Flat => "–",
            Self::Down => "▼",
        }
    }
}

/// One row of the tracked coins list
#[derive(Debug, Clone, PartialEq)]
pub struct CoinRow {
    pub from: String,
    pub to: String,
    pub full_name: String,
    pub image_url: String,
    pub price: String,
    pub change: String,
    pub direction: ChangeDirection,
    pub holding_quantity: Option<String>,
    pub holding_value: Option<String>,
    pub selected: bool,
}

impl CoinRow {
    pub fn new(item: &DisplayItem, holdings: &[Holding], items: &[DisplayItem]) -> Self {
        let change = item.change_pct_24h().unwrap_or(0.0);
        let holding = find_holding(holdings, &item.pair);

        Self {
            from: item.pair.from.clone(),
            to: format!(" / {}", item.pair.to),
            full_name: item.full_name.clone(),
            image_url: item.image_url.clone(),
            price: item.price().map(format_price).unwrap_or_else(|| "-".to_string()),
            change: format!("{}%", two_decimals(change)),
            direction: ChangeDirection::from_change(change),
            holding_quantity: holding.map(|h| two_decimals(h.quantity)),
            holding_value: holding
                .and_then(|h| holding_value(h, items))
                .map(|value| format!("${}", two_decimals(value))),
            selected: item.selected,
        }
    }
}

/// Build rows for every displayed item
pub fn coin_rows(items: &[DisplayItem], holdings: &[Holding]) -> Vec<CoinRow> {
    items
        .iter()
        .map(|item| CoinRow::new(item, holdings, items))
        .collect()
}

/// One row of the top coins list
#[derive(Debug, Clone, PartialEq)]
pub struct TopCoinRow {
    pub rank: String,
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    pub price: String,
    pub change: String,
    pub direction: ChangeDirection,
    pub market_cap: String,
    pub supply: String,
    pub volume_24h: String,
    pub added: bool,
}

impl TopCoinRow {
    pub fn new(coin: &TopCoin, tracked: &[DisplayItem]) -> Self {
        let change = parse_lenient_f64(coin.percent_change_24h.as_deref());
        let or_dash = |value: &Option<String>| {
            value
                .as_deref()
                .map(add_commas)
                .unwrap_or_else(|| "-".to_string())
        };

        Self {
            rank: coin.rank.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            image_url: coin.image_url.clone().filter(|url| !url.is_empty()),
            price: coin.price_usd.clone().unwrap_or_else(|| "-".to_string()),
            change: coin
                .percent_change_24h
                .clone()
                .unwrap_or_else(|| "0".to_string()),
            direction: ChangeDirection::from_change(change),
            market_cap: or_dash(&coin.market_cap_usd),
            supply: or_dash(&coin.total_supply),
            volume_24h: or_dash(&coin.volume_24h_usd),
            added: is_coin_added(tracked, &coin.symbol),
        }
    }
}

/// Build rows for the top coins list
pub fn top_coin_rows(coins: &[TopCoin], tracked: &[DisplayItem]) -> Vec<TopCoinRow> {
    coins.iter().map(|coin| TopCoinRow::new(coin, tracked)).collect()
}
