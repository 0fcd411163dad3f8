// src/tracker/coins_tracker.rs
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::{CoinEvent, DisplayItem, PriceQuote, TrackedPair, TrackerInput, COINS_PAGE};
use crate::notifications::EventQueue;
use crate::tracker::reconcile::{filter_requested, price_request, reconcile};
use crate::tracker::selection::{MultiSelector, TapOutcome};
use crate::traits::{coin_store::CoinStore, price_source::PriceSource, view::CoinListView};

type FetchResult = anyhow::Result<Vec<PriceQuote>>;

/// Sending side of the tracker's input channel
#[derive(Clone)]
pub struct TrackerHandle {
    sender: UnboundedSender<TrackerInput>,
}

impl TrackerHandle {
    /// Create a handle and the receiver to pass to [`CoinsTracker::run`]
    pub fn channel() -> (Self, UnboundedReceiver<TrackerInput>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Send an input. Returns `false` once the tracker has stopped.
    pub fn send(&self, input: TrackerInput) -> bool {
        self.sender.send(input).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(TrackerInput::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(TrackerInput::Stop)
    }

    pub fn swipe_refresh(&self) -> bool {
        self.send(TrackerInput::SwipeRefresh)
    }

    pub fn page_changed(&self, page: usize) -> bool {
        self.send(TrackerInput::PageChanged(page))
    }

    pub fn tap(&self, pair: TrackedPair) -> bool {
        self.send(TrackerInput::Tap(pair))
    }

    pub fn long_press(&self, pair: TrackedPair) -> bool {
        self.send(TrackerInput::LongPress(pair))
    }

    pub fn request_delete(&self) -> bool {
        self.send(TrackerInput::Signal(CoinEvent::DeleteRequested))
    }

    pub fn shutdown(&self) -> bool {
        self.send(TrackerInput::Shutdown)
    }
}

/// Owns the tracked coins list and sequences every change to it.
///
/// Network fetches run on spawned tasks; their results come back through a
/// channel so the list and selection flags are only mutated inside [`run`].
///
/// [`run`]: CoinsTracker::run
pub struct CoinsTracker {
    price_source: Arc<dyn PriceSource>,
    store: Arc<dyn CoinStore>,
    view: Arc<dyn CoinListView>,
    events: EventQueue,
    items: Vec<DisplayItem>,
    selector: MultiSelector,
    is_refreshing: bool,
    is_first_snapshot: bool,
    refreshes_in_flight: usize,
}

impl CoinsTracker {
    /// Create a new coins tracker
    pub fn new(
        price_source: Arc<dyn PriceSource>,
        store: Arc<dyn CoinStore>,
        view: Arc<dyn CoinListView>,
        events: EventQueue,
    ) -> Self {
        Self {
            price_source,
            store,
            view,
            events,
            items: Vec::new(),
            selector: MultiSelector::new(),
            is_refreshing: false,
            is_first_snapshot: true,
            refreshes_in_flight: 0,
        }
    }

    /// Run the tracker on its own task
    pub fn spawn(self) -> (TrackerHandle, JoinHandle<anyhow::Result<()>>) {
        let (handle, inputs) = TrackerHandle::channel();
        let task = tokio::spawn(self.run(inputs));
        (handle, task)
    }

    /// Event loop: store snapshots, user input and fetch results
    pub async fn run(mut self, mut inputs: UnboundedReceiver<TrackerInput>) -> anyhow::Result<()> {
        info!("Starting coins tracker");

        let mut snapshots = self.store.subscribe();
        let (done_tx, mut done_rx) = unbounded_channel::<FetchResult>();

        self.load_coin_catalogue();

        let initial = snapshots.borrow_and_update().clone();
        self.on_snapshot(initial, &done_tx).await;

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        warn!("Store closed, stopping coins tracker");
                        break;
                    }
                    let items = snapshots.borrow_and_update().clone();
                    self.on_snapshot(items, &done_tx).await;
                }
                input = inputs.recv() => match input {
                    Some(TrackerInput::Shutdown) | None => break,
                    Some(input) => self.handle_input(input, &done_tx).await,
                },
                Some(result) = done_rx.recv() => {
                    self.on_prices_fetched(result).await;
                }
            }
        }

        if self.refreshes_in_flight > 0 {
            debug!("{} price refreshes still in flight at shutdown", self.refreshes_in_flight);
        }
        info!("Coins tracker stopped");
        Ok(())
    }

    async fn handle_input(&mut self, input: TrackerInput, done_tx: &UnboundedSender<FetchResult>) {
        match input {
            TrackerInput::Start => {
                if !self.items.is_empty() {
                    self.update_prices(done_tx);
                }
            }
            TrackerInput::Stop => self.clear_selection().await,
            TrackerInput::SwipeRefresh => {
                self.clear_selection().await;
                self.is_refreshing = true;
                if !self.update_prices(done_tx) {
                    self.finish_swipe_refresh();
                }
            }
            TrackerInput::PageChanged(page) => {
                if page != COINS_PAGE {
                    self.clear_selection().await;
                }
            }
            TrackerInput::Tap(pair) => {
                let outcome = self.selector.tap(&mut self.items, &pair);
                self.on_tap_outcome(outcome).await;
            }
            TrackerInput::LongPress(pair) => {
                let outcome = self.selector.long_press(&mut self.items, &pair);
                self.on_tap_outcome(outcome).await;
            }
            TrackerInput::Signal(CoinEvent::DeleteRequested) => self.delete_selected().await,
            TrackerInput::Signal(other) => debug!("Ignoring outbound signal {:?}", other),
            TrackerInput::Shutdown => {}
        }
    }

    async fn on_tap_outcome(&self, outcome: TapOutcome) {
        match outcome {
            TapOutcome::OpenDetail(pair) => self.view.open_detail(&pair),
            TapOutcome::Toggled { pair, selected } => {
                debug!("{} selected: {}", pair, selected);
                self.render().await;
            }
            TapOutcome::Ignored => debug!("Input for a pair that is not displayed"),
        }
    }

    /// Take a new store snapshot as the displayed list
    async fn on_snapshot(&mut self, mut items: Vec<DisplayItem>, done_tx: &UnboundedSender<FetchResult>) {
        items.sort_by(|a, b| a.pair.from.cmp(&b.pair.from));
        for item in &mut items {
            item.selected = self
                .items
                .iter()
                .any(|old| old.selected && old.pair == item.pair);
        }

        self.items = items;
        self.selector.recompute(&self.items);
        self.render().await;

        if self.is_first_snapshot && !self.items.is_empty() {
            self.is_first_snapshot = false;
            self.update_prices(done_tx);
        }
    }

    /// Start a price refresh for every tracked pair.
    /// Returns `false` when there is nothing to request.
    fn update_prices(&mut self, done_tx: &UnboundedSender<FetchResult>) -> bool {
        let pairs: Vec<TrackedPair> = self.items.iter().map(|item| item.pair.clone()).collect();
        if price_request(&pairs).is_none() {
            return false;
        }

        self.events.notify(CoinEvent::LoadingChanged(true));
        self.refreshes_in_flight += 1;
        debug!("Refreshing prices for {} pairs", pairs.len());

        let source = self.price_source.clone();
        let done = done_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_prices(&pairs).await;
            if done.send(result).is_err() {
                debug!("Coins tracker stopped before price refresh completed");
            }
        });
        true
    }

    async fn on_prices_fetched(&mut self, result: FetchResult) {
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);

        match result {
            Ok(quotes) if !quotes.is_empty() => self.apply_quotes(quotes).await,
            Ok(_) => debug!("Price source returned no quotes"),
            Err(e) => warn!("Failed to refresh prices: {:#}", e),
        }

        self.events.notify(CoinEvent::LoadingChanged(false));
        self.finish_swipe_refresh();
    }

    fn finish_swipe_refresh(&mut self) {
        if self.is_refreshing {
            self.view.hide_refreshing();
            self.is_refreshing = false;
            self.view.enable_swipe_to_refresh();
        }
    }

    async fn apply_quotes(&mut self, quotes: Vec<PriceQuote>) {
        let tracked: Vec<TrackedPair> = self.items.iter().map(|item| item.pair.clone()).collect();
        let mut quotes = filter_requested(&tracked, &quotes);
        self.fill_names(&mut quotes).await;

        self.items = reconcile(&self.items, &quotes);
        info!("Updated prices for {} of {} pairs", quotes.len(), self.items.len());

        if let Err(e) = self.store.replace_all(&self.items).await {
            error!("Failed to store refreshed prices: {:#}", e);
            self.events.notify_error(&e);
        }
        self.render().await;
    }

    /// Fill display names and images from the coin catalogue
    async fn fill_names(&self, quotes: &mut [PriceQuote]) {
        for quote in quotes.iter_mut().filter(|q| q.full_name.is_none()) {
            match self.store.coin_info(&quote.pair.from).await {
                Ok(Some(info)) => {
                    quote.full_name = Some(info.full_name);
                    if !info.image_url.is_empty() {
                        quote.image_url = Some(info.image_url);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("Catalogue lookup for {} failed: {:#}", quote.pair.from, e),
            }
        }
    }

    async fn clear_selection(&mut self) {
        if self.selector.clear(&mut self.items) {
            self.render().await;
        }
    }

    async fn delete_selected(&mut self) {
        let previous = self.items.clone();
        let removed = self.selector.delete_selected(&mut self.items);
        if removed.is_empty() {
            debug!("Delete requested with nothing selected");
            return;
        }

        let pairs: Vec<TrackedPair> = removed.into_iter().map(|item| item.pair).collect();
        match self.store.delete(&pairs).await {
            Ok(count) => info!("Deleted {} tracked pairs", count),
            Err(e) => {
                error!("Failed to delete tracked pairs: {:#}", e);
                self.events.notify_error(&e);
                // Rows stay on screen, still selected, while the store holds them
                self.items = previous;
                self.selector.recompute(&self.items);
                self.render().await;
                return;
            }
        }

        self.view.show_deleted(pairs.len());
        self.events.notify(CoinEvent::ListUpdated);
        self.render().await;
    }

    async fn render(&self) {
        let holdings = match self.store.holdings().await {
            Ok(holdings) => holdings,
            Err(e) => {
                warn!("Failed to load holdings: {:#}", e);
                Vec::new()
            }
        };
        self.view.render(&self.items, &holdings);
    }

    /// Fetch and store the coin catalogue in the background; failures are only logged
    fn load_coin_catalogue(&self) {
        let source = self.price_source.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            match source.fetch_coin_list().await {
                Ok(coins) if !coins.is_empty() => {
                    if let Err(e) = store.save_coin_info(&coins).await {
                        warn!("Failed to store coin catalogue: {:#}", e);
                    }
                }
                Ok(_) => debug!("Coin catalogue is empty"),
                Err(e) => warn!("Failed to fetch coin catalogue: {:#}", e),
            }
        });
    }
}
