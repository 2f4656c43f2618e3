use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use super::{RatingStore, StoreTransaction};
use crate::error::{Result, StorageError};
use crate::models::{
    ExternalPlayer, NewRatingSnapshot, NewSourceFile, PlayerProfile, PlayerSnapshot,
    RatingCategory, RatingSnapshot, SourceFile, SourceFileRefresh,
};

type SnapshotKey = (Uuid, RatingCategory, NaiveDate);

#[derive(Debug, Default, Clone)]
struct MemoryState {
    players: HashMap<i64, ExternalPlayer>,
    /// `player_id` to `external_id`.
    player_ids: HashMap<Uuid, i64>,
    source_files: HashMap<String, SourceFile>,
    snapshots: BTreeMap<SnapshotKey, RatingSnapshot>,
}

/// In-process store with the same uniqueness rules as the PostgreSQL schema.
///
/// A transaction works on a copy of the state; commit swaps the copy in,
/// rollback drops it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn player_count(&self) -> usize {
        self.lock().players.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.lock().snapshots.len()
    }

    pub fn source_file_count(&self) -> usize {
        self.lock().source_files.len()
    }

    pub fn player(&self, external_id: i64) -> Option<ExternalPlayer> {
        self.lock().players.get(&external_id).cloned()
    }

    pub fn snapshots_for(&self, external_id: i64) -> Vec<RatingSnapshot> {
        let state = self.lock();
        let Some(player) = state.players.get(&external_id) else {
            return Vec::new();
        };
        state
            .snapshots
            .values()
            .filter(|s| s.player_id == player.player_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl RatingStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        let working = self.lock().clone();
        Ok(Box::new(MemoryTransaction {
            store: self,
            working,
        }))
    }

    async fn find_source_file(&self, filename: &str) -> Result<Option<SourceFile>> {
        Ok(self.lock().source_files.get(filename).cloned())
    }

    async fn latest_snapshots(
        &self,
        category: RatingCategory,
    ) -> Result<Option<(NaiveDate, Vec<PlayerSnapshot>)>> {
        let state = self.lock();

        let Some(rating_date) = state
            .snapshots
            .values()
            .filter(|s| s.category == category)
            .map(|s| s.rating_date)
            .max()
        else {
            return Ok(None);
        };

        let mut rows = Vec::new();
        for snapshot in state
            .snapshots
            .values()
            .filter(|s| s.category == category && s.rating_date == rating_date)
        {
            let player = state
                .player_ids
                .get(&snapshot.player_id)
                .and_then(|external_id| state.players.get(external_id))
                .ok_or_else(|| {
                    StorageError::InvalidData(format!(
                        "Snapshot {} references unknown player {}",
                        snapshot.snapshot_id, snapshot.player_id
                    ))
                })?;
            rows.push(PlayerSnapshot {
                player: player.clone(),
                snapshot: snapshot.clone(),
            });
        }

        rows.sort_by(|a, b| {
            b.snapshot
                .rating
                .cmp(&a.snapshot.rating)
                .then_with(|| a.player.last_name.cmp(&b.player.last_name))
                .then_with(|| a.player.first_name.cmp(&b.player.first_name))
        });

        Ok(Some((rating_date, rows)))
    }

    async fn purge_snapshots(
        &self,
        rating_date: NaiveDate,
        category: Option<RatingCategory>,
    ) -> Result<u64> {
        let mut state = self.lock();
        let before = state.snapshots.len();
        state.snapshots.retain(|(_, snapshot_category, date), _| {
            !(*date == rating_date && category.is_none_or(|c| c == *snapshot_category))
        });
        Ok((before - state.snapshots.len()) as u64)
    }
}

pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    working: MemoryState,
}

#[async_trait::async_trait]
impl StoreTransaction for MemoryTransaction<'_> {
    async fn find_source_file(&mut self, filename: &str) -> Result<Option<SourceFile>> {
        Ok(self.working.source_files.get(filename).cloned())
    }

    async fn insert_source_file(&mut self, file: &NewSourceFile) -> Result<SourceFile> {
        if self.working.source_files.contains_key(&file.filename) {
            return Err(StorageError::ConstraintViolation(format!(
                "source file '{}' already recorded",
                file.filename
            )));
        }
        let record = SourceFile::from_new(Uuid::new_v4(), file);
        self.working
            .source_files
            .insert(record.filename.clone(), record.clone());
        Ok(record)
    }

    async fn refresh_source_file(
        &mut self,
        source_file_id: Uuid,
        refresh: &SourceFileRefresh,
    ) -> Result<()> {
        let file = self
            .working
            .source_files
            .values_mut()
            .find(|f| f.source_file_id == source_file_id)
            .ok_or(StorageError::NotFound)?;
        file.apply_refresh(refresh);
        Ok(())
    }

    async fn find_player(&mut self, external_id: i64) -> Result<Option<ExternalPlayer>> {
        Ok(self.working.players.get(&external_id).cloned())
    }

    async fn insert_player(&mut self, profile: &PlayerProfile) -> Result<ExternalPlayer> {
        if self.working.players.contains_key(&profile.external_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "external id {} already exists",
                profile.external_id
            )));
        }
        let player = ExternalPlayer::from_profile(Uuid::new_v4(), profile);
        self.working
            .player_ids
            .insert(player.player_id, player.external_id);
        self.working
            .players
            .insert(player.external_id, player.clone());
        Ok(player)
    }

    async fn update_player(&mut self, player: &ExternalPlayer) -> Result<()> {
        match self.working.players.get_mut(&player.external_id) {
            Some(stored) if stored.player_id == player.player_id => {
                *stored = player.clone();
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn insert_snapshot_if_absent(&mut self, snapshot: &NewRatingSnapshot) -> Result<bool> {
        let key = (snapshot.player_id, snapshot.category, snapshot.rating_date);
        if self.working.snapshots.contains_key(&key) {
            return Ok(false);
        }
        if !self.working.player_ids.contains_key(&snapshot.player_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "snapshot references unknown player {}",
                snapshot.player_id
            )));
        }
        self.working
            .snapshots
            .insert(key, RatingSnapshot::from_new(Uuid::new_v4(), snapshot));
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction { store, working } = *self;
        *store.lock() = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
