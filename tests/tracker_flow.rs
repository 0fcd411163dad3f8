use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use coin_tracker::models::TOP_COINS_PAGE;
use coin_tracker::{
    ChannelEventHandler, CoinEvent, CoinInfo, CoinListView, CoinStore, CoinsTracker,
    DisplayItem, EventQueue, Holding, MemoryStore, PriceQuote, PriceSource, TopCoin,
    TrackedPair, TrackerHandle,
};

const WAIT: Duration = Duration::from_secs(2);

/// Price source that replays queued responses, then returns no quotes
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<anyhow::Result<Vec<PriceQuote>>>>,
    requests: Mutex<Vec<Vec<TrackedPair>>>,
    catalogue: Vec<CoinInfo>,
}

impl ScriptedSource {
    fn with_responses(responses: Vec<anyhow::Result<Vec<PriceQuote>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<Vec<TrackedPair>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch_prices(&self, pairs: &[TrackedPair]) -> anyhow::Result<Vec<PriceQuote>> {
        self.requests.lock().unwrap().push(pairs.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_coin_list(&self) -> anyhow::Result<Vec<CoinInfo>> {
        Ok(self.catalogue.clone())
    }

    async fn fetch_top_coins(&self, _limit: usize) -> anyhow::Result<Vec<TopCoin>> {
        Ok(Vec::new())
    }
}

/// Memory store whose deletes always fail
struct FailingDeleteStore(MemoryStore);

#[async_trait]
impl CoinStore for FailingDeleteStore {
    async fn replace_all(&self, items: &[DisplayItem]) -> anyhow::Result<()> {
        self.0.replace_all(items).await
    }

    async fn add_pair(&self, item: DisplayItem) -> anyhow::Result<bool> {
        self.0.add_pair(item).await
    }

    async fn delete(&self, _pairs: &[TrackedPair]) -> anyhow::Result<usize> {
        anyhow::bail!("disk full")
    }

    async fn snapshot(&self) -> anyhow::Result<Vec<DisplayItem>> {
        self.0.snapshot().await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<DisplayItem>> {
        self.0.subscribe()
    }

    async fn save_coin_info(&self, coins: &[CoinInfo]) -> anyhow::Result<()> {
        self.0.save_coin_info(coins).await
    }

    async fn coin_info(&self, symbol: &str) -> anyhow::Result<Option<CoinInfo>> {
        self.0.coin_info(symbol).await
    }

    async fn add_holding(&self, holding: Holding) -> anyhow::Result<()> {
        self.0.add_holding(holding).await
    }

    async fn holdings(&self) -> anyhow::Result<Vec<Holding>> {
        self.0.holdings().await
    }

    async fn remove_holding(&self, pair: &TrackedPair) -> anyhow::Result<()> {
        self.0.remove_holding(pair).await
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ViewCall {
    Render(Vec<DisplayItem>),
    OpenDetail(TrackedPair),
    HideRefreshing,
    EnableSwipe,
    Deleted(usize),
}

struct RecordingView(UnboundedSender<ViewCall>);

impl CoinListView for RecordingView {
    fn render(&self, items: &[DisplayItem], _holdings: &[Holding]) {
        let _ = self.0.send(ViewCall::Render(items.to_vec()));
    }

    fn open_detail(&self, pair: &TrackedPair) {
        let _ = self.0.send(ViewCall::OpenDetail(pair.clone()));
    }

    fn hide_refreshing(&self) {
        let _ = self.0.send(ViewCall::HideRefreshing);
    }

    fn enable_swipe_to_refresh(&self) {
        let _ = self.0.send(ViewCall::EnableSwipe);
    }

    fn show_deleted(&self, count: usize) {
        let _ = self.0.send(ViewCall::Deleted(count));
    }
}

struct Harness {
    handle: TrackerHandle,
    task: JoinHandle<anyhow::Result<()>>,
    views: UnboundedReceiver<ViewCall>,
    events: UnboundedReceiver<CoinEvent>,
    store: Arc<dyn CoinStore>,
    source: Arc<ScriptedSource>,
}

impl Harness {
    fn start(store: impl CoinStore + 'static, source: ScriptedSource) -> Self {
        let store: Arc<dyn CoinStore> = Arc::new(store);
        let source = Arc::new(source);
        let (view_tx, views) = unbounded_channel();
        let (handler, events) = ChannelEventHandler::new();

        let tracker = CoinsTracker::new(
            source.clone(),
            store.clone(),
            Arc::new(RecordingView(view_tx)),
            EventQueue::new(Arc::new(handler)),
        );
        let (handle, task) = tracker.spawn();

        Self {
            handle,
            task,
            views,
            events,
            store,
            source,
        }
    }

    /// Skip view calls until one matches
    async fn view_call(&mut self, matches: impl Fn(&ViewCall) -> bool) -> ViewCall {
        loop {
            let call = timeout(WAIT, self.views.recv())
                .await
                .expect("timed out waiting for view call")
                .expect("view channel closed");
            if matches(&call) {
                return call;
            }
        }
    }

    /// Skip renders until one matches
    async fn render(&mut self, pred: impl Fn(&[DisplayItem]) -> bool) -> Vec<DisplayItem> {
        match self
            .view_call(|call| matches!(call, ViewCall::Render(items) if pred(items.as_slice())))
            .await
        {
            ViewCall::Render(items) => items,
            other => panic!("unexpected view call {:?}", other),
        }
    }

    async fn event(&mut self, expected: CoinEvent) {
        self.events_until(expected).await;
    }

    /// Collect events up to and including `expected`
    async fn events_until(&mut self, expected: CoinEvent) -> Vec<CoinEvent> {
        let mut seen = Vec::new();
        loop {
            let event = timeout(WAIT, self.events.recv())
                .await
                .expect("timed out waiting for event")
                .expect("event channel closed");
            seen.push(event);
            if event == expected {
                return seen;
            }
        }
    }

    /// Wait for the refresh started by the first snapshot to finish
    async fn initial_refresh(&mut self) {
        self.event(CoinEvent::LoadingChanged(true)).await;
        self.event(CoinEvent::LoadingChanged(false)).await;
    }
}

fn pair(from: &str) -> TrackedPair {
    TrackedPair::new(from, "USD")
}

fn pairs(codes: &[&str]) -> Vec<TrackedPair> {
    codes.iter().map(|code| pair(code)).collect()
}

fn selected(items: &[DisplayItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.selected)
        .map(|item| item.pair.from.clone())
        .collect()
}

#[tokio::test]
async fn first_snapshot_refreshes_and_reconciles() {
    let source = ScriptedSource::with_responses(vec![Ok(vec![
        PriceQuote::new(pair("ETH"), 3000.0, -2.1),
        PriceQuote::new(pair("XRP"), 0.5, 1.0),
    ])]);
    let mut harness = Harness::start(MemoryStore::with_pairs(pairs(&["ETH", "BTC"])), source);

    harness.initial_refresh().await;

    let items = harness.render(|items| items.iter().any(|i| i.quote.is_some())).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].pair, pair("BTC"));
    assert!(items[0].quote.is_none());
    assert_eq!(items[1].pair, pair("ETH"));
    assert_eq!(items[1].price(), Some(3000.0));
    assert_eq!(items[1].change_pct_24h(), Some(-2.1));

    assert_eq!(harness.source.requests(), vec![pairs(&["BTC", "ETH"])]);

    let stored = harness.store.snapshot().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|item| item.pair.from != "XRP"));
    let eth = stored.iter().find(|item| item.pair == pair("ETH")).unwrap();
    assert_eq!(eth.price(), Some(3000.0));
}

#[tokio::test]
async fn failed_refresh_keeps_prices_and_ends_loading() {
    let source = ScriptedSource::with_responses(vec![
        Ok(vec![PriceQuote::new(pair("BTC"), 60000.0, 1.5)]),
        Err(anyhow::anyhow!("connection reset")),
    ]);
    let mut harness = Harness::start(MemoryStore::with_pairs(pairs(&["BTC"])), source);
    harness.initial_refresh().await;

    assert!(harness.handle.start());
    harness.initial_refresh().await;

    let stored = harness.store.snapshot().await.unwrap();
    assert_eq!(stored[0].price(), Some(60000.0));
    assert_eq!(harness.source.requests().len(), 2);
}

#[tokio::test]
async fn quotes_fill_names_from_catalogue() {
    let store = MemoryStore::with_pairs(pairs(&["BTC"]));
    store
        .save_coin_info(&[CoinInfo {
            symbol: "BTC".to_string(),
            coin_name: "Bitcoin".to_string(),
            full_name: "Bitcoin (BTC)".to_string(),
            image_url: "https://img/btc.png".to_string(),
            sort_order: Some(1),
        }])
        .await
        .unwrap();
    let source =
        ScriptedSource::with_responses(vec![Ok(vec![PriceQuote::new(pair("BTC"), 1.0, 0.0)])]);
    let mut harness = Harness::start(store, source);

    let items = harness.render(|items| items[0].quote.is_some()).await;
    assert_eq!(items[0].full_name, "Bitcoin (BTC)");
    assert_eq!(items[0].image_url, "https://img/btc.png");
}

#[tokio::test]
async fn catalogue_is_saved_on_startup() {
    let source = ScriptedSource {
        catalogue: vec![CoinInfo {
            symbol: "ETH".to_string(),
            coin_name: "Ethereum".to_string(),
            full_name: "Ethereum (ETH)".to_string(),
            image_url: String::new(),
            sort_order: Some(2),
        }],
        ..Default::default()
    };
    let harness = Harness::start(MemoryStore::new(), source);

    let saved = timeout(WAIT, async {
        loop {
            if let Some(info) = harness.store.coin_info("ETH").await.unwrap() {
                return info;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("catalogue was not saved");
    assert_eq!(saved.full_name, "Ethereum (ETH)");
}

#[tokio::test]
async fn swipe_refresh_restores_indicator() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC"])),
        ScriptedSource::default(),
    );
    harness.initial_refresh().await;

    assert!(harness.handle.swipe_refresh());
    harness.initial_refresh().await;

    assert_eq!(
        harness.view_call(|call| *call == ViewCall::HideRefreshing).await,
        ViewCall::HideRefreshing
    );
    assert_eq!(harness.view_call(|_| true).await, ViewCall::EnableSwipe);
}

#[tokio::test]
async fn swipe_refresh_on_empty_list_ends_immediately() {
    let mut harness = Harness::start(MemoryStore::new(), ScriptedSource::default());

    assert!(harness.handle.swipe_refresh());
    harness.view_call(|call| *call == ViewCall::HideRefreshing).await;
    assert_eq!(harness.view_call(|_| true).await, ViewCall::EnableSwipe);
    assert!(harness.source.requests().is_empty());
}

#[tokio::test]
async fn tap_opens_detail_when_nothing_selected() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );

    assert!(harness.handle.tap(pair("ETH")));
    let call = harness
        .view_call(|call| matches!(call, ViewCall::OpenDetail(_)))
        .await;
    assert_eq!(call, ViewCall::OpenDetail(pair("ETH")));
}

#[tokio::test]
async fn long_press_enters_selection_mode() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH", "XRP"])),
        ScriptedSource::default(),
    );

    harness.handle.long_press(pair("BTC"));
    let items = harness.render(|items| !selected(items).is_empty()).await;
    assert_eq!(selected(&items), vec!["BTC"]);

    harness.handle.tap(pair("ETH"));
    let items = harness.render(|items| selected(items).len() == 2).await;
    assert_eq!(selected(&items), vec!["BTC", "ETH"]);

    harness.handle.tap(pair("BTC"));
    harness.handle.tap(pair("ETH"));
    harness.render(|items| selected(items).is_empty()).await;

    // Selection mode is over, taps navigate again
    harness.handle.tap(pair("XRP"));
    let call = harness
        .view_call(|call| matches!(call, ViewCall::OpenDetail(_)))
        .await;
    assert_eq!(call, ViewCall::OpenDetail(pair("XRP")));
}

#[tokio::test]
async fn delete_removes_selected_pairs() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH", "XRP"])),
        ScriptedSource::default(),
    );

    harness.handle.long_press(pair("ETH"));
    harness.render(|items| selected(items) == vec!["ETH"]).await;

    assert!(harness.handle.request_delete());
    assert_eq!(
        harness.view_call(|call| matches!(call, ViewCall::Deleted(_))).await,
        ViewCall::Deleted(1)
    );
    harness.event(CoinEvent::ListUpdated).await;

    let items = harness.render(|items| items.len() == 2).await;
    assert_eq!(items[0].pair, pair("BTC"));
    assert_eq!(items[1].pair, pair("XRP"));
    assert!(selected(&items).is_empty());

    let stored: Vec<TrackedPair> = harness
        .store
        .snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.pair)
        .collect();
    assert_eq!(stored, pairs(&["BTC", "XRP"]));
}

#[tokio::test]
async fn delete_with_nothing_selected_does_nothing() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );

    harness.handle.request_delete();
    harness.handle.tap(pair("BTC"));

    let mut calls = Vec::new();
    loop {
        let call = harness.view_call(|_| true).await;
        if matches!(call, ViewCall::OpenDetail(_)) {
            break;
        }
        calls.push(call);
    }
    assert!(!calls.iter().any(|call| matches!(call, ViewCall::Deleted(_))));
    assert_eq!(harness.store.snapshot().await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_delete_keeps_rows_selected() {
    let store = FailingDeleteStore(MemoryStore::with_pairs(pairs(&["BTC", "ETH", "XRP"])));
    let mut harness = Harness::start(store, ScriptedSource::default());
    harness.initial_refresh().await;

    harness.handle.long_press(pair("ETH"));
    harness.render(|items| selected(items) == vec!["ETH"]).await;

    harness.handle.request_delete();
    // Still in selection mode, so this tap toggles instead of navigating
    harness.handle.tap(pair("BTC"));

    let mut calls = Vec::new();
    loop {
        let call = harness.view_call(|_| true).await;
        let done = matches!(&call, ViewCall::Render(items) if selected(items).len() == 2);
        calls.push(call);
        if done {
            break;
        }
    }
    assert!(!calls.iter().any(|call| matches!(call, ViewCall::Deleted(_))));
    assert!(!calls.iter().any(|call| matches!(call, ViewCall::OpenDetail(_))));
    for call in &calls {
        if let ViewCall::Render(items) = call {
            assert_eq!(items.len(), 3);
        }
    }
    match calls.last() {
        Some(ViewCall::Render(items)) => assert_eq!(selected(items), vec!["BTC", "ETH"]),
        other => panic!("unexpected view call {:?}", other),
    }

    // Queue order puts any ListUpdated ahead of this refresh's loading signal
    harness.handle.start();
    let events = harness.events_until(CoinEvent::LoadingChanged(true)).await;
    assert!(!events.contains(&CoinEvent::ListUpdated));

    assert_eq!(harness.store.snapshot().await.unwrap().len(), 3);
}

#[tokio::test]
async fn price_refresh_keeps_selection() {
    let source = ScriptedSource::with_responses(vec![
        Ok(Vec::new()),
        Ok(vec![PriceQuote::new(pair("BTC"), 100.0, 2.0)]),
    ]);
    let mut harness = Harness::start(MemoryStore::with_pairs(pairs(&["BTC", "ETH"])), source);
    harness.initial_refresh().await;

    harness.handle.long_press(pair("BTC"));
    harness.render(|items| selected(items) == vec!["BTC"]).await;

    harness.handle.start();
    harness.initial_refresh().await;

    // Once from the reconciled list, once from the store snapshot that follows
    for _ in 0..2 {
        let items = harness.render(|items| items[0].quote.is_some()).await;
        assert_eq!(items[0].price(), Some(100.0));
        assert_eq!(selected(&items), vec!["BTC"]);
    }

    harness.handle.tap(pair("BTC"));
    harness.render(|items| selected(items).is_empty()).await;
}

#[tokio::test]
async fn stop_clears_selection() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );

    harness.handle.long_press(pair("ETH"));
    harness.render(|items| !selected(items).is_empty()).await;

    assert!(harness.handle.stop());
    harness.render(|items| selected(items).is_empty()).await;

    harness.handle.tap(pair("ETH"));
    let call = harness
        .view_call(|call| matches!(call, ViewCall::OpenDetail(_)))
        .await;
    assert_eq!(call, ViewCall::OpenDetail(pair("ETH")));
}

#[tokio::test]
async fn swipe_refresh_clears_selection() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );
    harness.initial_refresh().await;

    harness.handle.long_press(pair("BTC"));
    harness.render(|items| !selected(items).is_empty()).await;

    assert!(harness.handle.swipe_refresh());
    harness.render(|items| selected(items).is_empty()).await;
    harness.view_call(|call| *call == ViewCall::HideRefreshing).await;
    assert_eq!(harness.view_call(|_| true).await, ViewCall::EnableSwipe);
}

#[tokio::test]
async fn leaving_coins_page_clears_selection() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );

    harness.handle.long_press(pair("BTC"));
    harness.render(|items| !selected(items).is_empty()).await;

    harness.handle.page_changed(TOP_COINS_PAGE);
    harness.render(|items| selected(items).is_empty()).await;

    harness.handle.tap(pair("BTC"));
    let call = harness
        .view_call(|call| matches!(call, ViewCall::OpenDetail(_)))
        .await;
    assert_eq!(call, ViewCall::OpenDetail(pair("BTC")));
}

#[tokio::test]
async fn selection_survives_store_updates() {
    let mut harness = Harness::start(
        MemoryStore::with_pairs(pairs(&["BTC", "ETH"])),
        ScriptedSource::default(),
    );

    harness.handle.long_press(pair("ETH"));
    harness.render(|items| !selected(items).is_empty()).await;

    harness
        .store
        .add_pair(DisplayItem::new(pair("ADA")))
        .await
        .unwrap();
    let items = harness.render(|items| items.len() == 3).await;
    assert_eq!(items[0].pair, pair("ADA"));
    assert_eq!(selected(&items), vec!["ETH"]);
}

#[tokio::test]
async fn first_added_pair_triggers_refresh() {
    let mut harness = Harness::start(MemoryStore::new(), ScriptedSource::default());
    harness.render(|items| items.is_empty()).await;

    harness
        .store
        .add_pair(DisplayItem::new(pair("BTC")))
        .await
        .unwrap();
    harness.initial_refresh().await;

    assert_eq!(harness.source.requests(), vec![pairs(&["BTC"])]);
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let harness = Harness::start(MemoryStore::new(), ScriptedSource::default());

    assert!(harness.handle.shutdown());
    timeout(WAIT, harness.task)
        .await
        .expect("tracker did not stop")
        .unwrap()
        .unwrap();
    assert!(!harness.handle.start());
}
