use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewRatingSnapshot, RatingCategory};

pub struct SnapshotRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> SnapshotRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Inserts unless the (player, category, rating_date) key already exists.
    /// Returns whether a row was created.
    pub async fn insert_if_absent(&mut self, snapshot: &NewRatingSnapshot) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO rating_snapshots
                (snapshot_id, player_id, category, rating_date, rating, rank,
                 tournaments_total, tournaments_52_weeks, tournaments_counted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (player_id, category, rating_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(snapshot.player_id)
        .bind(snapshot.category.code())
        .bind(snapshot.rating_date)
        .bind(snapshot.rating)
        .bind(snapshot.rank)
        .bind(snapshot.tournaments_total)
        .bind(snapshot.tournaments_52_weeks)
        .bind(snapshot.tournaments_counted)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete snapshots for a rating date, optionally limited to one category
    pub async fn purge(
        &mut self,
        rating_date: NaiveDate,
        category: Option<RatingCategory>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM rating_snapshots
            WHERE rating_date = $1
              AND ($2::TEXT IS NULL OR category = $2)
            "#,
        )
        .bind(rating_date)
        .bind(category.map(|c| c.code()))
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
