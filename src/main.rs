use anyhow::Context;
use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use coin_tracker::{
  CoinStore, CoinsTracker, CompositeEventHandler, Config, ConsoleEventHandler,
  ConsoleView, DisplayItem, EventQueue, PriceSource, RemotePriceSource,
  SqliteStore, TopCoinsTracker, VERSION,
};

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let config = Config::from_env()?;

  // Initialize logging
  tracing_subscriber::fmt()
    .with_level(true)
    .with_target(false)
    .with_max_level(config.log_level)
    .with_file(true)
    .with_line_number(true)
    .init();

  tokio::runtime::Runtime::new()?.block_on(async {
    info!("Initializing coin tracker v{}...", VERSION);
    info!("CryptoCompare URL: {}", config.cryptocompare_url);
    info!("CoinMarketCap URL: {}", config.coinmarketcap_url);
    info!("Database: {}", config.database_path);

    let price_source: Arc<dyn PriceSource> = Arc::new(RemotePriceSource::new(
      config.cryptocompare_url.clone(),
      config.coinmarketcap_url.clone(),
      config.http_timeout,
    )?);
    let store: Arc<dyn CoinStore> = Arc::new(
      SqliteStore::open(&config.database_path).with_context(|| {
        format!("Failed to open database at {}", config.database_path)
      })?,
    );

    for pair in &config.tracked_pairs {
      if store.add_pair(DisplayItem::new(pair.clone())).await? {
        info!("Seeded tracked pair {}", pair);
      }
    }

    let mut handlers = CompositeEventHandler::new();
    handlers.add_handler(Arc::new(ConsoleEventHandler::new()));
    let events = EventQueue::new(Arc::new(handlers));

    let view = Arc::new(ConsoleView::new());

    let tracker = CoinsTracker::new(
      price_source.clone(),
      store.clone(),
      view.clone(),
      events.clone(),
    );
    let (handle, tracker_task) = tracker.spawn();

    let mut top_coins = TopCoinsTracker::new(price_source, store, view);
    if let Err(e) = top_coins.load(config.top_coins_limit).await {
      warn!("Failed to load top coins: {:#}", e);
    }

    // Periodic refresh, the first tick is covered by the initial snapshot
    let refresh = handle.clone();
    let period = config.refresh_interval;
    tokio::spawn(async move {
      let mut ticker = interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      ticker.tick().await;
      loop {
        ticker.tick().await;
        if !refresh.start() {
          break;
        }
      }
    });

    info!("Coin tracker is running. Press Ctrl+C to stop.");

    // Keep the program running
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.shutdown();
    match tracker_task.await {
      Ok(Ok(())) => {}
      Ok(Err(e)) => error!("Tracker error: {:#}", e),
      Err(e) => error!("Tracker task failed: {}", e),
    }
    events.shutdown();

    Ok(())
  })
}
