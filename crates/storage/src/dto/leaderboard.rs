use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Gender, PlayerSnapshot, RatingCategory};

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct LeaderboardFilter {
    /// Free-text narrowing applied after ranking.
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub category: Option<RatingCategory>,
}

impl LeaderboardFilter {
    pub fn categories(&self) -> Vec<RatingCategory> {
        match self.category {
            Some(category) => vec![category],
            None => RatingCategory::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub external_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub city: String,
    pub rating: i32,
    pub tournaments_total: i32,
    pub tournaments_52_weeks: i32,
    pub tournaments_counted: i32,
}

impl From<PlayerSnapshot> for LeaderboardEntry {
    fn from(row: PlayerSnapshot) -> Self {
        let PlayerSnapshot { player, snapshot } = row;
        Self {
            rank: 0,
            external_id: player.external_id,
            last_name: player.last_name,
            first_name: player.first_name,
            middle_name: player.middle_name,
            gender: player.gender,
            birth_date: player.birth_date,
            city: player.city,
            rating: snapshot.rating,
            tournaments_total: snapshot.tournaments_total,
            tournaments_52_weeks: snapshot.tournaments_52_weeks,
            tournaments_counted: snapshot.tournaments_counted,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryLeaderboard {
    pub label: String,
    pub rating_date: Option<NaiveDate>,
    pub results: Vec<LeaderboardEntry>,
    pub total: usize,
}

/// Category code to its ranked table, as served to the web layer.
pub type Leaderboard = BTreeMap<String, CategoryLeaderboard>;
