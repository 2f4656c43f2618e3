use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ExternalPlayer, Gender, PlayerSnapshot, RatingCategory, RatingSnapshot};

#[derive(FromRow)]
struct LeaderboardRow {
    snapshot_id: Uuid,
    player_id: Uuid,
    category: String,
    rating_date: NaiveDate,
    rating: i32,
    rank: Option<i32>,
    tournaments_total: i32,
    tournaments_52_weeks: i32,
    tournaments_counted: i32,
    external_id: i64,
    last_name: String,
    first_name: String,
    middle_name: String,
    gender: String,
    birth_date: Option<NaiveDate>,
    city: String,
}

impl TryFrom<LeaderboardRow> for PlayerSnapshot {
    type Error = StorageError;

    fn try_from(row: LeaderboardRow) -> Result<Self> {
        let category: RatingCategory = row.category.parse()?;

        Ok(Self {
            player: ExternalPlayer {
                player_id: row.player_id,
                external_id: row.external_id,
                last_name: row.last_name,
                first_name: row.first_name,
                middle_name: row.middle_name,
                gender: Gender::from_code(&row.gender),
                birth_date: row.birth_date,
                city: row.city,
            },
            snapshot: RatingSnapshot {
                snapshot_id: row.snapshot_id,
                player_id: row.player_id,
                category,
                rating_date: row.rating_date,
                rating: row.rating,
                rank: row.rank,
                tournaments_total: row.tournaments_total,
                tournaments_52_weeks: row.tournaments_52_weeks,
                tournaments_counted: row.tournaments_counted,
            },
        })
    }
}

pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Each category resolves its own latest date; categories never share one.
    pub async fn latest_rating_date(&self, category: RatingCategory) -> Result<Option<NaiveDate>> {
        let date = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MAX(rating_date) FROM rating_snapshots WHERE category = $1",
        )
        .bind(category.code())
        .fetch_one(self.pool)
        .await?;

        Ok(date)
    }

    /// List snapshots of a category at a date, joined with their players
    pub async fn snapshots_at(
        &self,
        category: RatingCategory,
        rating_date: NaiveDate,
    ) -> Result<Vec<PlayerSnapshot>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                s.snapshot_id,
                s.player_id,
                s.category,
                s.rating_date,
                s.rating,
                s.rank,
                s.tournaments_total,
                s.tournaments_52_weeks,
                s.tournaments_counted,
                p.external_id,
                p.last_name,
                p.first_name,
                p.middle_name,
                p.gender,
                p.birth_date,
                p.city
            FROM rating_snapshots s
            INNER JOIN external_players p ON p.player_id = s.player_id
            WHERE s.category = $1 AND s.rating_date = $2
            ORDER BY s.rating DESC, p.last_name, p.first_name
            "#,
        )
        .bind(category.code())
        .bind(rating_date)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PlayerSnapshot::try_from).collect()
    }
}
