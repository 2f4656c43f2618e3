use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use storage::models::{NewSourceFile, SourceFile, SourceFileRefresh};
use storage::{RatingStore, StoreTransaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::PlayerRecord;
use crate::Result;

/// What to do when the filename is already recorded in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingFilePolicy {
    /// Leave the file alone; used by directory imports.
    Skip,
    /// Process it again and refresh its applied time; used by remote fetches.
    Reprocess,
}

/// Identity of the file a batch of records came from.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub filename: String,
    pub source_url: String,
    pub rating_date: NaiveDate,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub players_created: usize,
    pub players_updated: usize,
    pub snapshots_created: usize,
    pub snapshots_skipped: usize,
    pub records_seen: usize,
}

impl ImportStats {
    pub fn absorb(&mut self, other: &ImportStats) {
        self.players_created += other.players_created;
        self.players_updated += other.players_updated;
        self.snapshots_created += other.snapshots_created;
        self.snapshots_skipped += other.snapshots_skipped;
        self.records_seen += other.records_seen;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileImport {
    Imported(ImportStats),
    AlreadyRecorded,
}

/// Merges normalized records into the store, one transaction per file.
pub struct RatingImporter<'a> {
    store: &'a dyn RatingStore,
    dry_run: bool,
}

impl<'a> RatingImporter<'a> {
    pub fn new(store: &'a dyn RatingStore) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// In dry-run mode every file's transaction is rolled back.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn import_file(
        &self,
        source: &SourceDescriptor,
        records: &[PlayerRecord],
        policy: ExistingFilePolicy,
    ) -> Result<FileImport> {
        let mut tx = self.store.begin().await?;

        let applied = self.apply(tx.as_mut(), source, records, policy).await;

        match applied {
            Ok(FileImport::Imported(stats)) if !self.dry_run => {
                tx.commit().await?;
                info!(
                    "Imported {}: {} players created, {} updated, {} snapshots created, {} skipped",
                    source.filename,
                    stats.players_created,
                    stats.players_updated,
                    stats.snapshots_created,
                    stats.snapshots_skipped
                );
                Ok(FileImport::Imported(stats))
            }
            Ok(outcome) => {
                tx.rollback().await?;
                if self.dry_run {
                    info!("Dry run: discarded changes for {}", source.filename);
                }
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback for {} failed: {}", source.filename, rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut (dyn StoreTransaction + '_),
        source: &SourceDescriptor,
        records: &[PlayerRecord],
        policy: ExistingFilePolicy,
    ) -> Result<FileImport> {
        let source_file = match (tx.find_source_file(&source.filename).await?, policy) {
            (Some(_), ExistingFilePolicy::Skip) => {
                info!("{} is already recorded, skipping", source.filename);
                return Ok(FileImport::AlreadyRecorded);
            }
            (Some(existing), ExistingFilePolicy::Reprocess) => {
                debug!("Reprocessing already recorded file {}", source.filename);
                existing
            }
            (None, _) => self.record_source_file(tx, source).await?,
        };

        let mut stats = ImportStats::default();
        let mut created: HashSet<Uuid> = HashSet::new();
        let mut updated: HashSet<Uuid> = HashSet::new();

        for record in records {
            stats.records_seen += 1;
            let profile = record.profile();

            let player_id = match tx.find_player(record.external_id).await? {
                Some(mut player) => {
                    if player.apply_profile(&profile) {
                        tx.update_player(&player).await?;
                        if !created.contains(&player.player_id) && updated.insert(player.player_id)
                        {
                            stats.players_updated += 1;
                        }
                    }
                    player.player_id
                }
                None => {
                    let player = tx.insert_player(&profile).await?;
                    stats.players_created += 1;
                    created.insert(player.player_id);
                    player.player_id
                }
            };

            if tx
                .insert_snapshot_if_absent(&record.snapshot(player_id, source.rating_date))
                .await?
            {
                stats.snapshots_created += 1;
            } else {
                stats.snapshots_skipped += 1;
            }
        }

        tx.refresh_source_file(
            source_file.source_file_id,
            &SourceFileRefresh {
                applied_at: Utc::now(),
                downloaded_at: source.downloaded_at,
                fingerprint: source.fingerprint.clone(),
            },
        )
        .await?;

        Ok(FileImport::Imported(stats))
    }

    async fn record_source_file(
        &self,
        tx: &mut (dyn StoreTransaction + '_),
        source: &SourceDescriptor,
    ) -> Result<SourceFile> {
        let file = tx
            .insert_source_file(&NewSourceFile {
                filename: source.filename.clone(),
                source_url: source.source_url.clone(),
                downloaded_at: source.downloaded_at,
                fingerprint: source.fingerprint.clone(),
            })
            .await?;
        Ok(file)
    }
}
