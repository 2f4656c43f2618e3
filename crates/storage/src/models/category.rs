use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StorageError;

/// One of the six rating partitions published by the external federation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum RatingCategory {
    #[serde(rename = "MD")]
    MenDoubles,
    #[serde(rename = "MMX")]
    MenMixed,
    #[serde(rename = "WD")]
    WomenDoubles,
    #[serde(rename = "WMX")]
    WomenMixed,
    #[serde(rename = "JM")]
    JuniorMale,
    #[serde(rename = "JF")]
    JuniorFemale,
}

impl RatingCategory {
    pub const ALL: [RatingCategory; 6] = [
        Self::MenDoubles,
        Self::MenMixed,
        Self::WomenDoubles,
        Self::WomenMixed,
        Self::JuniorMale,
        Self::JuniorFemale,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::MenDoubles => "MD",
            Self::MenMixed => "MMX",
            Self::WomenDoubles => "WD",
            Self::WomenMixed => "WMX",
            Self::JuniorMale => "JM",
            Self::JuniorFemale => "JF",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MenDoubles => "Мужчины, парный разряд",
            Self::MenMixed => "Мужчины, смешанный разряд",
            Self::WomenDoubles => "Женщины, парный разряд",
            Self::WomenMixed => "Женщины, смешанный разряд",
            Self::JuniorMale => "Юноши",
            Self::JuniorFemale => "Девушки",
        }
    }

    pub fn gender(&self) -> Gender {
        Gender::from(*self)
    }

    fn parse_str(s: &str) -> Result<Self, StorageError> {
        let normalized = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.code() == normalized)
            .ok_or_else(|| {
                StorageError::InvalidData(format!(
                    "Unknown rating category: '{}'. Available: {}",
                    s,
                    Self::ALL
                        .iter()
                        .map(|c| c.code())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl std::str::FromStr for RatingCategory {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    /// Anything other than `F` is treated as male.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "F" => Self::Female,
            _ => Self::Male,
        }
    }
}

impl From<RatingCategory> for Gender {
    fn from(category: RatingCategory) -> Self {
        match category {
            RatingCategory::MenDoubles | RatingCategory::MenMixed | RatingCategory::JuniorMale => {
                Self::Male
            }
            RatingCategory::WomenDoubles
            | RatingCategory::WomenMixed
            | RatingCategory::JuniorFemale => Self::Female,
        }
    }
}
