use validator::Validate;

use crate::dto::leaderboard::{CategoryLeaderboard, Leaderboard, LeaderboardEntry, LeaderboardFilter};
use crate::error::{Result, StorageError};
use crate::store::RatingStore;

/// Competition ranks for values already sorted in descending order.
///
/// Tied values share a rank and the next distinct value takes its 1-based
/// position: `[100, 100, 90]` ranks as `[1, 1, 3]`.
pub fn competition_ranks(sorted_values: &[i32]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(sorted_values.len());
    let mut previous: Option<(i32, i64)> = None;

    for (idx, value) in sorted_values.iter().enumerate() {
        let rank = match previous {
            Some((prev_value, prev_rank)) if prev_value == *value => prev_rank,
            _ => idx as i64 + 1,
        };
        ranks.push(rank);
        previous = Some((*value, rank));
    }

    ranks
}

/// Sorts entries by rating (highest first) and assigns competition ranks.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.external_id.cmp(&b.external_id))
    });

    let values: Vec<i32> = entries.iter().map(|e| e.rating).collect();
    for (entry, rank) in entries.iter_mut().zip(competition_ranks(&values)) {
        entry.rank = rank;
    }

    entries
}

/// Keeps entries matching `search` in name, city or external id.
/// Ranks are not recomputed.
pub fn filter_entries(entries: Vec<LeaderboardEntry>, search: Option<&str>) -> Vec<LeaderboardEntry> {
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return entries,
    };

    entries
        .into_iter()
        .filter(|entry| {
            let haystack = format!(
                "{} {} {} {}",
                entry.last_name, entry.first_name, entry.middle_name, entry.city
            )
            .to_lowercase();
            haystack.contains(&needle) || entry.external_id.to_string() == needle
        })
        .collect()
}

pub async fn build_leaderboard(
    store: &dyn RatingStore,
    filter: &LeaderboardFilter,
) -> Result<Leaderboard> {
    filter
        .validate()
        .map_err(|e| StorageError::InvalidData(e.to_string()))?;

    let mut leaderboard = Leaderboard::new();

    for category in filter.categories() {
        let (rating_date, rows) = match store.latest_snapshots(category).await? {
            Some((date, rows)) => (Some(date), rows),
            None => (None, Vec::new()),
        };

        let ranked = rank_entries(rows.into_iter().map(LeaderboardEntry::from).collect());
        let results = filter_entries(ranked, filter.search.as_deref());

        leaderboard.insert(
            category.code().to_string(),
            CategoryLeaderboard {
                label: category.label().to_string(),
                rating_date,
                total: results.len(),
                results,
            },
        );
    }

    Ok(leaderboard)
}
