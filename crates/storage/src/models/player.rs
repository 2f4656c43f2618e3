use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Gender;

/// Identity of a player in the external rating system.
///
/// `external_id` is the de-duplication key and never changes once stored;
/// every other field follows the most recently imported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExternalPlayer {
    pub player_id: Uuid,
    pub external_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub city: String,
}

/// Player attributes as read from one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub external_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub city: String,
}

impl ExternalPlayer {
    pub fn from_profile(player_id: Uuid, profile: &PlayerProfile) -> Self {
        Self {
            player_id,
            external_id: profile.external_id,
            last_name: profile.last_name.clone(),
            first_name: profile.first_name.clone(),
            middle_name: profile.middle_name.clone(),
            gender: profile.gender,
            birth_date: profile.birth_date,
            city: profile.city.clone(),
        }
    }

    /// Refreshes stored attributes from an incoming profile and reports
    /// whether anything changed.
    ///
    /// Empty incoming text never replaces a stored value, and a missing
    /// birth date keeps the stored one.
    pub fn apply_profile(&mut self, incoming: &PlayerProfile) -> bool {
        let mut changed = false;

        changed |= refresh_text(&mut self.last_name, &incoming.last_name);
        changed |= refresh_text(&mut self.first_name, &incoming.first_name);
        changed |= refresh_text(&mut self.middle_name, &incoming.middle_name);
        changed |= refresh_text(&mut self.city, &incoming.city);

        if self.gender != incoming.gender {
            self.gender = incoming.gender;
            changed = true;
        }

        if let Some(birth_date) = incoming.birth_date
            && self.birth_date != Some(birth_date)
        {
            self.birth_date = Some(birth_date);
            changed = true;
        }

        changed
    }
}

fn refresh_text(stored: &mut String, incoming: &str) -> bool {
    let incoming = incoming.trim();
    if incoming.is_empty() || stored == incoming {
        return false;
    }
    *stored = incoming.to_string();
    true
}
