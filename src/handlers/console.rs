use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{CoinEvent, DisplayItem, Holding, TopCoin, TrackedPair};
use crate::render::{coin_rows, TopCoinRow};
use crate::traits::event_handler::CoinEventHandler;
use crate::traits::view::{CoinListView, TopCoinsView};
use crate::tracker::queries::total_holdings_value;
use crate::utils::{two_decimals, truncate_string};

/// Console logging event handler
pub struct ConsoleEventHandler;

impl ConsoleEventHandler {
    /// Create a new console event handler
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoinEventHandler for ConsoleEventHandler {
    async fn handle_event(&self, event: CoinEvent) {
        match event {
            CoinEvent::LoadingChanged(true) => info!("Refreshing prices..."),
            CoinEvent::LoadingChanged(false) => info!("Prices refreshed"),
            CoinEvent::ListUpdated => info!("Tracked coins list updated"),
            CoinEvent::DeleteRequested => info!("Delete of selected coins requested"),
        }
    }

    async fn handle_error(&self, error: &anyhow::Error) {
        warn!("Coin tracker error: {:#}", error);
    }
}

/// Renders both lists to the log
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinListView for ConsoleView {
    fn render(&self, items: &[DisplayItem], holdings: &[Holding]) {
        info!("{}", "=".repeat(80));
        info!("TRACKED COINS ({})", items.len());
        info!("{}", "-".repeat(80));

        for row in coin_rows(items, holdings) {
            let marker = if row.selected { "*" } else { " " };
            info!(
                "{} {:<6}{:<8} {:<24} {:>16} {} {:>8}",
                marker,
                row.from,
                row.to,
                truncate_string(&row.full_name, 24),
                row.price,
                row.direction.arrow(),
                row.change
            );
            if let (Some(quantity), Some(value)) = (&row.holding_quantity, &row.holding_value) {
                info!("         Holding: {} ({})", quantity, value);
            }
        }

        if !holdings.is_empty() {
            info!("{}", "-".repeat(80));
            info!("Holdings value: ${}", two_decimals(total_holdings_value(holdings, items)));
        }
        info!("{}", "=".repeat(80));
    }

    fn open_detail(&self, pair: &TrackedPair) {
        info!("Opening detail for {}", pair);
    }

    fn hide_refreshing(&self) {
        info!("Refresh finished");
    }

    fn enable_swipe_to_refresh(&self) {}

    fn show_deleted(&self, count: usize) {
        if count > 1 {
            info!("{} coins deleted", count);
        } else {
            info!("Coin deleted");
        }
    }
}

impl TopCoinsView for ConsoleView {
    fn render(&self, rows: &[TopCoinRow]) {
        info!("{}", "=".repeat(80));
        info!("TOP COINS BY MARKET CAP");
        info!("{}", "-".repeat(80));

        for row in rows {
            info!(
                "{:>4}. {:<20} {:>14} {} {:>7}%  cap {}  vol {}  supply {} {}",
                row.rank,
                truncate_string(&row.name, 20),
                row.price,
                row.direction.arrow(),
                row.change,
                row.market_cap,
                row.volume_24h,
                row.supply,
                if row.added { "[added]" } else { "" }
            );
        }

        info!("{}", "=".repeat(80));
    }

    fn show_added(&self, coin: &TopCoin) {
        info!("Added {} ({}) to tracked coins", coin.name, coin.symbol);
    }
}
