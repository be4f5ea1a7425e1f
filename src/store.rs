//! Append-only SQLite store of every listing seen so far.
//!
//! `unique_hash` carries a UNIQUE constraint; inserting a known hash is a
//! no-op, which is how already-seen listings are filtered out.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{Listing, ListingRecord, field_or_placeholder};
use crate::utils::error::Result;

pub struct ListingStore {
    pool: SqlitePool,
}

impl ListingStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        Self::connect_with(options).await
    }

    /// Ephemeral database, mainly for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        // One connection: an in-memory database is per connection, and a
        // single writer is all a run needs.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Creates the `apartments` table if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS apartments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT,
                rentalgross TEXT,
                rooms TEXT,
                floor TEXT,
                area TEXT,
                move_in_date TEXT,
                zone TEXT,
                link TEXT,
                timestamp TEXT,
                unique_hash TEXT UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn exists(&self, identity_hash: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM apartments WHERE unique_hash = ?")
            .bind(identity_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Inserts `listing` unless its hash is already stored. Returns whether a
    /// row was written.
    pub async fn insert(&self, listing: &Listing) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO apartments
                (address, rentalgross, rooms, floor, area, move_in_date, zone, link, timestamp, unique_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(field_or_placeholder(&listing.address))
        .bind(field_or_placeholder(&listing.gross_rent))
        .bind(field_or_placeholder(&listing.rooms))
        .bind(field_or_placeholder(&listing.floor))
        .bind(field_or_placeholder(&listing.area))
        .bind(field_or_placeholder(&listing.move_in_date))
        .bind(field_or_placeholder(&listing.zone))
        .bind(listing.link_or_placeholder())
        .bind(listing.observed_at)
        .bind(&listing.identity_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Persists every listing not stored yet and returns those, in input
    /// order. Known listings, including repeats within `listings`, are
    /// dropped.
    pub async fn insert_all_new(&self, listings: Vec<Listing>) -> Result<Vec<Listing>> {
        info!("Saving new apartments...");
        let mut new_listings = Vec::new();

        for listing in listings {
            if self.exists(&listing.identity_hash).await? {
                debug!(hash = %listing.identity_hash, "Apartment already known");
                continue;
            }

            if self.insert(&listing).await? {
                info!(
                    hash = %listing.identity_hash,
                    address = field_or_placeholder(&listing.address),
                    "New apartment added"
                );
                new_listings.push(listing);
            }
        }

        info!(new = new_listings.len(), "Saved new apartments");
        Ok(new_listings)
    }

    pub async fn find_by_hash(&self, identity_hash: &str) -> Result<Option<Listing>> {
        let record = sqlx::query_as::<_, ListingRecord>(
            r#"
            SELECT id, address, rentalgross, rooms, floor, area, move_in_date, zone, link, timestamp, unique_hash
            FROM apartments
            WHERE unique_hash = ?
            "#,
        )
        .bind(identity_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Listing::from))
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apartments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
