use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{RatingStore, StoreTransaction};
use crate::error::Result;
use crate::models::{
    ExternalPlayer, NewRatingSnapshot, NewSourceFile, PlayerProfile, PlayerSnapshot,
    RatingCategory, SourceFile, SourceFileRefresh,
};
use crate::repository::leaderboard::LeaderboardRepository;
use crate::repository::player::PlayerRepository;
use crate::repository::snapshot::SnapshotRepository;
use crate::repository::source_file::SourceFileRepository;

pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RatingStore for PgRatingStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }

    async fn find_source_file(&self, filename: &str) -> Result<Option<SourceFile>> {
        let mut conn = self.pool.acquire().await?;
        SourceFileRepository::new(&mut conn)
            .find_by_filename(filename)
            .await
    }

    async fn latest_snapshots(
        &self,
        category: RatingCategory,
    ) -> Result<Option<(NaiveDate, Vec<PlayerSnapshot>)>> {
        let repo = LeaderboardRepository::new(&self.pool);

        let Some(rating_date) = repo.latest_rating_date(category).await? else {
            return Ok(None);
        };

        let rows = repo.snapshots_at(category, rating_date).await?;
        Ok(Some((rating_date, rows)))
    }

    async fn purge_snapshots(
        &self,
        rating_date: NaiveDate,
        category: Option<RatingCategory>,
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = SnapshotRepository::new(&mut tx)
            .purge(rating_date, category)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }
}

/// One file's unit of work on PostgreSQL.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn find_source_file(&mut self, filename: &str) -> Result<Option<SourceFile>> {
        SourceFileRepository::new(&mut self.tx)
            .find_by_filename(filename)
            .await
    }

    async fn insert_source_file(&mut self, file: &NewSourceFile) -> Result<SourceFile> {
        SourceFileRepository::new(&mut self.tx).insert(file).await
    }

    async fn refresh_source_file(
        &mut self,
        source_file_id: Uuid,
        refresh: &SourceFileRefresh,
    ) -> Result<()> {
        SourceFileRepository::new(&mut self.tx)
            .refresh(source_file_id, refresh)
            .await
    }

    async fn find_player(&mut self, external_id: i64) -> Result<Option<ExternalPlayer>> {
        PlayerRepository::new(&mut self.tx)
            .find_by_external_id(external_id)
            .await
    }

    async fn insert_player(&mut self, profile: &PlayerProfile) -> Result<ExternalPlayer> {
        PlayerRepository::new(&mut self.tx).insert(profile).await
    }

    async fn update_player(&mut self, player: &ExternalPlayer) -> Result<()> {
        PlayerRepository::new(&mut self.tx).update(player).await
    }

    async fn insert_snapshot_if_absent(&mut self, snapshot: &NewRatingSnapshot) -> Result<bool> {
        SnapshotRepository::new(&mut self.tx)
            .insert_if_absent(snapshot)
            .await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgStoreTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgStoreTransaction { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
