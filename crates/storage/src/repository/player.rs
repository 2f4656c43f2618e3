use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ExternalPlayer, Gender, PlayerProfile};

#[derive(FromRow)]
struct PlayerRow {
    player_id: Uuid,
    external_id: i64,
    last_name: String,
    first_name: String,
    middle_name: String,
    gender: String,
    birth_date: Option<NaiveDate>,
    city: String,
}

impl From<PlayerRow> for ExternalPlayer {
    fn from(row: PlayerRow) -> Self {
        Self {
            player_id: row.player_id,
            external_id: row.external_id,
            last_name: row.last_name,
            first_name: row.first_name,
            middle_name: row.middle_name,
            gender: Gender::from_code(&row.gender),
            birth_date: row.birth_date,
            city: row.city,
        }
    }
}

pub struct PlayerRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PlayerRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find a player by archive identifier
    pub async fn find_by_external_id(&mut self, external_id: i64) -> Result<Option<ExternalPlayer>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, external_id, last_name, first_name, middle_name,
                   gender, birth_date, city
            FROM external_players
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(ExternalPlayer::from))
    }

    /// Create a player, rejecting a duplicate archive identifier
    pub async fn insert(&mut self, profile: &PlayerProfile) -> Result<ExternalPlayer> {
        let player = ExternalPlayer::from_profile(Uuid::new_v4(), profile);

        sqlx::query(
            r#"
            INSERT INTO external_players
                (player_id, external_id, last_name, first_name, middle_name, gender, birth_date, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(player.player_id)
        .bind(player.external_id)
        .bind(&player.last_name)
        .bind(&player.first_name)
        .bind(&player.middle_name)
        .bind(player.gender.as_str())
        .bind(player.birth_date)
        .bind(&player.city)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::ConstraintViolation(format!(
                    "external id {} already exists",
                    player.external_id
                ))
            } else {
                err
            }
        })?;

        Ok(player)
    }

    /// The external identifier is immutable and only used to locate the row.
    pub async fn update(&mut self, player: &ExternalPlayer) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE external_players
            SET last_name = $2,
                first_name = $3,
                middle_name = $4,
                gender = $5,
                birth_date = $6,
                city = $7,
                updated_at = CURRENT_TIMESTAMP
            WHERE player_id = $1
            "#,
        )
        .bind(player.player_id)
        .bind(&player.last_name)
        .bind(&player.first_name)
        .bind(&player.middle_name)
        .bind(player.gender.as_str())
        .bind(player.birth_date)
        .bind(&player.city)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}
