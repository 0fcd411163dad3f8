use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::{CoinInfo, DisplayItem, Holding, PriceQuote, TrackedPair};
use crate::traits::coin_store::CoinStore;

/// SQLite-backed store. Queries run on the blocking thread pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    snapshots: Arc<watch::Sender<Vec<DisplayItem>>>,
}

impl SqliteStore {
    /// Open (or create) the database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        info!("Opened database {}", path.display());
        Self::with_connection(conn)
    }

    /// Database that lives only as long as the store
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        let items = load_items(&conn)?;
        let (snapshots, _) = watch::channel(items);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            snapshots: Arc::new(snapshots),
        })
    }

    /// Run `f` against the connection off the async worker threads
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow!("Database connection lock poisoned"))?;
            f(&conn)
        })
        .await
        .context("Database task failed")?
    }

    /// Like `with_conn` for writes. When `f` reports a change the new
    /// snapshot is published while the lock is still held, so snapshots
    /// reach subscribers in commit order.
    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<(T, bool)> + Send + 'static,
    {
        let snapshots = self.snapshots.clone();
        self.with_conn(move |conn| {
            let (value, changed) = f(conn)?;
            if changed {
                snapshots.send_replace(load_items(conn)?);
            }
            Ok(value)
        })
        .await
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tracked_pairs (
            from_code TEXT NOT NULL,
            to_code TEXT NOT NULL,
            full_name TEXT NOT NULL DEFAULT '',
            image_url TEXT NOT NULL DEFAULT '',
            quote TEXT,
            position INTEGER NOT NULL,
            PRIMARY KEY (from_code, to_code)
        );

        CREATE TABLE IF NOT EXISTS coin_info (
            symbol TEXT PRIMARY KEY,
            coin_name TEXT NOT NULL,
            full_name TEXT NOT NULL,
            image_url TEXT NOT NULL DEFAULT '',
            sort_order INTEGER
        );

        CREATE TABLE IF NOT EXISTS holdings (
            from_code TEXT NOT NULL,
            to_code TEXT NOT NULL,
            quantity REAL NOT NULL,
            buy_price REAL NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (from_code, to_code)
        );
        ",
    )?;
    Ok(())
}

fn load_items(conn: &Connection) -> Result<Vec<DisplayItem>> {
    let mut stmt = conn.prepare(
        "SELECT from_code, to_code, full_name, image_url, quote FROM tracked_pairs ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (from, to, full_name, image_url, quote) = row?;
        let quote = match quote {
            Some(json) => Some(
                serde_json::from_str::<PriceQuote>(&json)
                    .with_context(|| format!("Corrupt stored quote for {}/{}", from, to))?,
            ),
            None => None,
        };
        items.push(DisplayItem {
            pair: TrackedPair::new(from, to),
            full_name,
            image_url,
            quote,
            selected: false,
        });
    }
    Ok(items)
}

fn next_position(conn: &Connection) -> Result<i64> {
    let position = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM tracked_pairs",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(position)
}

fn quote_json(item: &DisplayItem) -> Result<Option<String>> {
    Ok(item.quote.as_ref().map(serde_json::to_string).transpose()?)
}

fn load_holdings(conn: &Connection) -> Result<Vec<Holding>> {
    let mut stmt = conn.prepare(
        "SELECT from_code, to_code, quantity, buy_price, created_at FROM holdings ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut holdings = Vec::new();
    for row in rows {
        let (from, to, quantity, buy_price, created_at) = row?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Invalid holding timestamp {:?}", created_at))?
            .with_timezone(&Utc);
        holdings.push(Holding {
            pair: TrackedPair::new(from, to),
            quantity,
            buy_price,
            created_at,
        });
    }
    Ok(holdings)
}

#[async_trait]
impl CoinStore for SqliteStore {
    async fn replace_all(&self, items: &[DisplayItem]) -> Result<()> {
        let items = items.to_vec();
        let count = items.len();
        self.mutate(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for item in &items {
                let position = next_position(&tx)?;
                tx.execute(
                    "INSERT INTO tracked_pairs (from_code, to_code, full_name, image_url, quote, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(from_code, to_code) DO UPDATE SET
                        full_name = excluded.full_name,
                        image_url = excluded.image_url,
                        quote = excluded.quote",
                    params![
                        item.pair.from,
                        item.pair.to,
                        item.full_name,
                        item.image_url,
                        quote_json(item)?,
                        position
                    ],
                )?;
            }
            tx.commit()?;
            Ok(((), true))
        })
        .await?;
        debug!("Stored snapshot of {} items", count);
        Ok(())
    }

    async fn add_pair(&self, item: DisplayItem) -> Result<bool> {
        self.mutate(move |conn| {
            let position = next_position(conn)?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO tracked_pairs (from_code, to_code, full_name, image_url, quote, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.pair.from,
                    item.pair.to,
                    item.full_name,
                    item.image_url,
                    quote_json(&item)?,
                    position
                ],
            )?;
            Ok((inserted > 0, inserted > 0))
        })
        .await
    }

    async fn delete(&self, pairs: &[TrackedPair]) -> Result<usize> {
        let pairs = pairs.to_vec();
        self.mutate(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let mut removed = 0;
            for pair in &pairs {
                removed += tx.execute(
                    "DELETE FROM tracked_pairs WHERE from_code = ?1 AND to_code = ?2",
                    params![pair.from, pair.to],
                )?;
            }
            tx.commit()?;
            Ok((removed, removed > 0))
        })
        .await
    }

    async fn snapshot(&self) -> Result<Vec<DisplayItem>> {
        self.with_conn(load_items).await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<DisplayItem>> {
        self.snapshots.subscribe()
    }

    async fn save_coin_info(&self, coins: &[CoinInfo]) -> Result<()> {
        let coins = coins.to_vec();
        let count = coins.len();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for coin in &coins {
                tx.execute(
                    "INSERT OR REPLACE INTO coin_info (symbol, coin_name, full_name, image_url, sort_order)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![coin.symbol, coin.coin_name, coin.full_name, coin.image_url, coin.sort_order],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await?;
        debug!("Stored {} catalogue entries", count);
        Ok(())
    }

    async fn coin_info(&self, symbol: &str) -> Result<Option<CoinInfo>> {
        let symbol = symbol.to_string();
        self.with_conn(move |conn| {
            let coin = conn
                .query_row(
                    "SELECT symbol, coin_name, full_name, image_url, sort_order FROM coin_info WHERE symbol = ?1",
                    params![symbol],
                    |row| {
                        Ok(CoinInfo {
                            symbol: row.get(0)?,
                            coin_name: row.get(1)?,
                            full_name: row.get(2)?,
                            image_url: row.get(3)?,
                            sort_order: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(coin)
        })
        .await
    }

    async fn add_holding(&self, holding: Holding) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO holdings (from_code, to_code, quantity, buy_price, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    holding.pair.from,
                    holding.pair.to,
                    holding.quantity,
                    holding.buy_price,
                    holding.created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn holdings(&self) -> Result<Vec<Holding>> {
        self.with_conn(load_holdings).await
    }

    async fn remove_holding(&self, pair: &TrackedPair) -> Result<()> {
        let pair = pair.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM holdings WHERE from_code = ?1 AND to_code = ?2",
                params![pair.from, pair.to],
            )?;
            Ok(())
        })
        .await
    }
}
