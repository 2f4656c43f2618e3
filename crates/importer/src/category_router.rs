use std::collections::BTreeSet;

use storage::models::RatingCategory;

pub trait CategoryRouter {
    fn route(&self, sheet_name: &str) -> Option<RatingCategory>;
}

/// Sheet names used across the archive: English codes, full Russian
/// labels, and short Russian codes.
pub struct KnownSheetNames;

impl CategoryRouter for KnownSheetNames {
    fn route(&self, sheet_name: &str) -> Option<RatingCategory> {
        match sheet_name.trim() {
            "MD" | "Мужчины, парный разряд" | "МП" => Some(RatingCategory::MenDoubles),
            "MMX" | "Мужчины, смешанный разряд" | "ММ" => Some(RatingCategory::MenMixed),
            "WD" | "Женщины, парный разряд" | "ЖП" => Some(RatingCategory::WomenDoubles),
            "WMX" | "Женщины, смешанный разряд" | "ЖМ" => Some(RatingCategory::WomenMixed),
            "JM" | "Юноши" | "ЮН" => Some(RatingCategory::JuniorMale),
            "JF" | "Девушки" | "ДВ" => Some(RatingCategory::JuniorFemale),
            _ => None,
        }
    }
}

/// Categories absent from `found`, in canonical order.
pub fn missing_categories(found: &BTreeSet<RatingCategory>) -> Vec<RatingCategory> {
    RatingCategory::ALL
        .iter()
        .copied()
        .filter(|category| !found.contains(category))
        .collect()
}
