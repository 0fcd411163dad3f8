use super::pair::TrackedPair;

/// Page index of the tracked coins list
pub const COINS_PAGE: usize = 0;
/// Page index of the top coins list
pub const TOP_COINS_PAGE: usize = 1;

/// Signals exchanged between the tracker and the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinEvent {
    /// A price refresh started (`true`) or finished (`false`)
    LoadingChanged(bool),
    /// The tracked list changed after a bulk delete
    ListUpdated,
    /// The surface asks to delete every selected item
    DeleteRequested,
}

/// Inputs consumed by the coins tracker loop
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerInput {
    /// The coins list became visible
    Start,
    /// The coins list left the screen
    Stop,
    /// Pull-to-refresh
    SwipeRefresh,
    /// The pager moved to another page
    PageChanged(usize),
    Tap(TrackedPair),
    LongPress(TrackedPair),
    Signal(CoinEvent),
    Shutdown,
}
