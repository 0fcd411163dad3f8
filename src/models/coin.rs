use serde::{Deserialize, Serialize};

/// Entry of the full coin catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub symbol: String,
    pub coin_name: String,
    pub full_name: String,
    pub image_url: String,
    pub sort_order: Option<u32>,
}

/// Entry of the "top coins by market cap" list.
///
/// Numeric fields stay as the strings the source sends; they are parsed
/// leniently when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: String,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub percent_change_24h: Option<String>,
    #[serde(default)]
    pub market_cap_usd: Option<String>,
    #[serde(default, rename = "24h_volume_usd")]
    pub volume_24h_usd: Option<String>,
    #[serde(default)]
    pub total_supply: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}
