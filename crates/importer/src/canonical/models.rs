use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use storage::models::{Gender, NewRatingSnapshot, PlayerProfile, RatingCategory};
use uuid::Uuid;

/// One ranked player row, normalized out of a rating sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub external_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    pub city: String,
    pub category: RatingCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub rating: Decimal,
    pub tournaments_total: i32,
    pub tournaments_52_weeks: i32,
    pub tournaments_counted: i32,
}

impl PlayerRecord {
    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile {
            external_id: self.external_id,
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            gender: self.gender,
            birth_date: self.birth_date,
            city: self.city.clone(),
        }
    }

    /// Rating as stored: fractional points are truncated toward zero.
    pub fn rating_points(&self) -> i32 {
        self.rating.trunc().to_i32().unwrap_or(0)
    }

    pub fn snapshot(&self, player_id: Uuid, rating_date: NaiveDate) -> NewRatingSnapshot {
        NewRatingSnapshot {
            player_id,
            category: self.category,
            rating_date,
            rating: self.rating_points(),
            rank: self.rank,
            tournaments_total: self.tournaments_total,
            tournaments_52_weeks: self.tournaments_52_weeks,
            tournaments_counted: self.tournaments_counted,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(external_id: i64, category: RatingCategory, rating: i64) -> PlayerRecord {
    PlayerRecord {
        external_id,
        last_name: format!("Игрок{}", external_id),
        first_name: "Иван".to_string(),
        middle_name: String::new(),
        gender: category.gender(),
        birth_date: None,
        city: "Москва".to_string(),
        category,
        rank: Some(1),
        rating: Decimal::from(rating),
        tournaments_total: 0,
        tournaments_52_weeks: 0,
        tournaments_counted: 0,
    }
}
