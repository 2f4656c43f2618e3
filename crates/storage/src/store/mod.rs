//! Storage seam for the ingestion pipeline.
//!
//! The importer only talks to [`RatingStore`] and [`StoreTransaction`], so the
//! same upsert logic runs against PostgreSQL or the in-process store.

pub mod memory;
pub mod postgres;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ExternalPlayer, NewRatingSnapshot, NewSourceFile, PlayerProfile, PlayerSnapshot,
    RatingCategory, SourceFile, SourceFileRefresh,
};

#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// Opens the unit of work that scopes one file's writes.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>>;

    async fn find_source_file(&self, filename: &str) -> Result<Option<SourceFile>>;

    /// Snapshots of `category` at the latest rating date present for it.
    async fn latest_snapshots(
        &self,
        category: RatingCategory,
    ) -> Result<Option<(NaiveDate, Vec<PlayerSnapshot>)>>;

    /// Administrative purge; the only operation that removes snapshots.
    async fn purge_snapshots(
        &self,
        rating_date: NaiveDate,
        category: Option<RatingCategory>,
    ) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait StoreTransaction: Send {
    async fn find_source_file(&mut self, filename: &str) -> Result<Option<SourceFile>>;

    async fn insert_source_file(&mut self, file: &NewSourceFile) -> Result<SourceFile>;

    async fn refresh_source_file(
        &mut self,
        source_file_id: Uuid,
        refresh: &SourceFileRefresh,
    ) -> Result<()>;

    async fn find_player(&mut self, external_id: i64) -> Result<Option<ExternalPlayer>>;

    async fn insert_player(&mut self, profile: &PlayerProfile) -> Result<ExternalPlayer>;

    async fn update_player(&mut self, player: &ExternalPlayer) -> Result<()>;

    /// Returns `false` when a snapshot already exists for the
    /// (player, category, rating_date) key; the stored one is left untouched.
    async fn insert_snapshot_if_absent(&mut self, snapshot: &NewRatingSnapshot) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
