use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pair::TrackedPair;

/// A user position on a tracked pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub pair: TrackedPair,
    pub quantity: f64,
    pub buy_price: f64,
    pub created_at: DateTime<Utc>,
}

impl Holding {
    pub fn new(pair: TrackedPair, quantity: f64, buy_price: f64) -> Self {
        Self {
            pair,
            quantity,
            buy_price,
            created_at: Utc::now(),
        }
    }

    /// Amount paid for the position
    pub fn cost(&self) -> f64 {
        self.quantity * self.buy_price
    }
}
