use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One archive file known to the store, keyed by its canonical filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SourceFile {
    pub source_file_id: Uuid,
    pub filename: String,
    pub source_url: String,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSourceFile {
    pub filename: String,
    pub source_url: String,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub fingerprint: Option<String>,
}

/// Columns touched when an already recorded file is processed again.
#[derive(Debug, Clone)]
pub struct SourceFileRefresh {
    pub applied_at: DateTime<Utc>,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub fingerprint: Option<String>,
}

impl SourceFile {
    pub fn from_new(source_file_id: Uuid, new: &NewSourceFile) -> Self {
        Self {
            source_file_id,
            filename: new.filename.clone(),
            source_url: new.source_url.clone(),
            downloaded_at: new.downloaded_at,
            applied_at: None,
            fingerprint: new.fingerprint.clone(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    pub fn apply_refresh(&mut self, refresh: &SourceFileRefresh) {
        self.applied_at = Some(refresh.applied_at);
        if refresh.downloaded_at.is_some() {
            self.downloaded_at = refresh.downloaded_at;
        }
        if refresh.fingerprint.is_some() {
            self.fingerprint = refresh.fingerprint.clone();
        }
    }
}
