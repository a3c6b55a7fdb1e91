// =============================================================================
// SQLite Store — stocks and daily price bars
// =============================================================================
//
// Plain CRUD over two tables:
//   stocks  — unique `symbol`
//   prices  — one row per (stock_id, date), cascades on stock delete
//
// A single connection is shared behind a `parking_lot::Mutex`; every call
// holds the lock only for the duration of its statements.
// =============================================================================

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::series::{PricePoint, PriceSeries, SeriesError};
use crate::types::{Price, PriceCreate, Stock, StockCreate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("symbol already exists: {0}")]
    DuplicateSymbol(String),
    #[error("stock not found: {0}")]
    StockNotFound(i64),
    #[error("price for stock {stock_id} on {date} already exists")]
    DuplicatePriceDate {
        stock_id: i64,
        date: chrono::NaiveDate,
    },
    #[error("stored prices are out of order: {0}")]
    Series(#[from] SeriesError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const STOCK_COLUMNS: &str = "id, symbol, name, market, sector, currency";
const PRICE_COLUMNS: &str = "id, stock_id, date, open, high, low, close, volume";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init_schema()?;
        info!(path = %path.display(), "SQLite store opened");
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store opened");
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

             CREATE TABLE IF NOT EXISTS stocks (
                 id       INTEGER PRIMARY KEY AUTOINCREMENT,
                 symbol   TEXT    NOT NULL UNIQUE,
                 name     TEXT    NOT NULL,
                 market   TEXT    NOT NULL,
                 sector   TEXT,
                 currency TEXT    NOT NULL DEFAULT 'KRW'
             );

             CREATE TABLE IF NOT EXISTS prices (
                 id       INTEGER PRIMARY KEY AUTOINCREMENT,
                 stock_id INTEGER NOT NULL REFERENCES stocks(id) ON DELETE CASCADE,
                 date     TEXT    NOT NULL,
                 open     REAL    NOT NULL,
                 high     REAL    NOT NULL,
                 low      REAL    NOT NULL,
                 close    REAL    NOT NULL,
                 volume   REAL,
                 UNIQUE (stock_id, date)
             );

             CREATE INDEX IF NOT EXISTS idx_prices_stock_date ON prices(stock_id, date DESC);",
        )?;
        debug!("SQLite schema initialized");
        Ok(())
    }

    // ========== Stocks ==========

    pub fn create_stock(&self, req: &StockCreate) -> StoreResult<Stock> {
        let conn = self.conn.lock();

        if symbol_exists(&conn, &req.symbol)? {
            warn!(symbol = %req.symbol, "rejected duplicate stock symbol");
            return Err(StoreError::DuplicateSymbol(req.symbol.clone()));
        }

        conn.execute(
            "INSERT INTO stocks (symbol, name, market, sector, currency)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![req.symbol, req.name, req.market, req.sector, req.currency],
        )?;

        Ok(Stock {
            id: conn.last_insert_rowid(),
            symbol: req.symbol.clone(),
            name: req.name.clone(),
            market: req.market.clone(),
            sector: req.sector.clone(),
            currency: req.currency.clone(),
        })
    }

    pub fn get_stock(&self, id: i64) -> StoreResult<Option<Stock>> {
        let conn = self.conn.lock();
        let stock = conn
            .query_row(
                &format!("SELECT {STOCK_COLUMNS} FROM stocks WHERE id = ?1"),
                params![id],
                stock_from_row,
            )
            .optional()?;
        Ok(stock)
    }

    pub fn list_stocks(&self, skip: usize, limit: usize) -> StoreResult<Vec<Stock>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {STOCK_COLUMNS} FROM stocks ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], stock_from_row)?;
        let stocks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    /// Replace every field of stock `id`. `Ok(None)` when it does not exist.
    pub fn update_stock(&self, id: i64, req: &StockCreate) -> StoreResult<Option<Stock>> {
        let conn = self.conn.lock();

        let current: Option<String> = conn
            .query_row(
                "SELECT symbol FROM stocks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current_symbol) = current else {
            return Ok(None);
        };

        if current_symbol != req.symbol && symbol_exists(&conn, &req.symbol)? {
            warn!(id, symbol = %req.symbol, "rejected symbol change to an existing symbol");
            return Err(StoreError::DuplicateSymbol(req.symbol.clone()));
        }

        conn.execute(
            "UPDATE stocks SET symbol = ?1, name = ?2, market = ?3, sector = ?4, currency = ?5
             WHERE id = ?6",
            params![req.symbol, req.name, req.market, req.sector, req.currency, id],
        )?;

        Ok(Some(Stock {
            id,
            symbol: req.symbol.clone(),
            name: req.name.clone(),
            market: req.market.clone(),
            sector: req.sector.clone(),
            currency: req.currency.clone(),
        }))
    }

    /// Delete a stock and its prices. Returns `false` if it did not exist.
    pub fn delete_stock(&self, id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM stocks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    // ========== Prices ==========

    pub fn create_price(&self, req: &PriceCreate) -> StoreResult<Price> {
        let conn = self.conn.lock();

        let stock_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM stocks WHERE id = ?1)",
            params![req.stock_id],
            |row| row.get(0),
        )?;
        if !stock_exists {
            warn!(stock_id = req.stock_id, "rejected price for unknown stock");
            return Err(StoreError::StockNotFound(req.stock_id));
        }

        let duplicate: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM prices WHERE stock_id = ?1 AND date = ?2)",
            params![req.stock_id, req.date],
            |row| row.get(0),
        )?;
        if duplicate {
            warn!(stock_id = req.stock_id, date = %req.date, "rejected duplicate price date");
            return Err(StoreError::DuplicatePriceDate {
                stock_id: req.stock_id,
                date: req.date,
            });
        }

        conn.execute(
            "INSERT INTO prices (stock_id, date, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                req.stock_id,
                req.date,
                req.open,
                req.high,
                req.low,
                req.close,
                req.volume,
            ],
        )?;

        Ok(Price {
            id: conn.last_insert_rowid(),
            stock_id: req.stock_id,
            date: req.date,
            open: req.open,
            high: req.high,
            low: req.low,
            close: req.close,
            volume: req.volume,
        })
    }

    pub fn get_price(&self, id: i64) -> StoreResult<Option<Price>> {
        let conn = self.conn.lock();
        let price = conn
            .query_row(
                &format!("SELECT {PRICE_COLUMNS} FROM prices WHERE id = ?1"),
                params![id],
                price_from_row,
            )
            .optional()?;
        Ok(price)
    }

    /// Prices for one stock, newest date first.
    pub fn list_prices_by_stock(
        &self,
        stock_id: i64,
        skip: usize,
        limit: usize,
    ) -> StoreResult<Vec<Price>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRICE_COLUMNS} FROM prices WHERE stock_id = ?1
             ORDER BY date DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![stock_id, limit as i64, skip as i64],
            price_from_row,
        )?;
        let prices = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(prices)
    }

    /// The most recent `limit` bars for a stock as an oldest-first series.
    pub fn recent_series(&self, stock_id: i64, limit: usize) -> StoreResult<PriceSeries> {
        let newest_first: Vec<PricePoint> = self
            .list_prices_by_stock(stock_id, 0, limit)?
            .into_iter()
            .map(PricePoint::from)
            .collect();
        Ok(PriceSeries::from_newest_first(newest_first)?)
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn symbol_exists(conn: &Connection, symbol: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM stocks WHERE symbol = ?1)",
        params![symbol],
        |row| row.get(0),
    )
}

fn stock_from_row(row: &Row<'_>) -> rusqlite::Result<Stock> {
    Ok(Stock {
        id: row.get(0)?,
        symbol: row.get(1)?,
        name: row.get(2)?,
        market: row.get(3)?,
        sector: row.get(4)?,
        currency: row.get(5)?,
    })
}

fn price_from_row(row: &Row<'_>) -> rusqlite::Result<Price> {
    Ok(Price {
        id: row.get(0)?,
        stock_id: row.get(1)?,
        date: row.get(2)?,
        open: row.get(3)?,
        high: row.get(4)?,
        low: row.get(5)?,
        close: row.get(6)?,
        volume: row.get(7)?,
    })
}
