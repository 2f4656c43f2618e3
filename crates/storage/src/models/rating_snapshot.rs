use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ExternalPlayer, RatingCategory};

/// One dated rating observation. Created once per
/// (player, category, rating_date) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub snapshot_id: Uuid,
    pub player_id: Uuid,
    pub category: RatingCategory,
    pub rating_date: NaiveDate,
    pub rating: i32,
    pub rank: Option<i32>,
    pub tournaments_total: i32,
    pub tournaments_52_weeks: i32,
    pub tournaments_counted: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRatingSnapshot {
    pub player_id: Uuid,
    pub category: RatingCategory,
    pub rating_date: NaiveDate,
    pub rating: i32,
    pub rank: Option<i32>,
    pub tournaments_total: i32,
    pub tournaments_52_weeks: i32,
    pub tournaments_counted: i32,
}

impl RatingSnapshot {
    pub fn from_new(snapshot_id: Uuid, new: &NewRatingSnapshot) -> Self {
        Self {
            snapshot_id,
            player_id: new.player_id,
            category: new.category,
            rating_date: new.rating_date,
            rating: new.rating,
            rank: new.rank,
            tournaments_total: new.tournaments_total,
            tournaments_52_weeks: new.tournaments_52_weeks,
            tournaments_counted: new.tournaments_counted,
        }
    }
}

/// A snapshot joined with the player it belongs to.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub player: ExternalPlayer,
    pub snapshot: RatingSnapshot,
}
