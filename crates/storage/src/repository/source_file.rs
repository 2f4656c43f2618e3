use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{NewSourceFile, SourceFile, SourceFileRefresh};

pub struct SourceFileRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> SourceFileRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find a source file by name
    pub async fn find_by_filename(&mut self, filename: &str) -> Result<Option<SourceFile>> {
        let file = sqlx::query_as::<_, SourceFile>(
            r#"
            SELECT source_file_id, filename, source_url, downloaded_at, applied_at, fingerprint
            FROM source_files
            WHERE filename = $1
            "#,
        )
        .bind(filename)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(file)
    }

    /// Record a newly applied source file
    pub async fn insert(&mut self, new: &NewSourceFile) -> Result<SourceFile> {
        let file = SourceFile::from_new(Uuid::new_v4(), new);

        sqlx::query(
            r#"
            INSERT INTO source_files (source_file_id, filename, source_url, downloaded_at, fingerprint)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(file.source_file_id)
        .bind(&file.filename)
        .bind(&file.source_url)
        .bind(file.downloaded_at)
        .bind(&file.fingerprint)
        .execute(&mut *self.conn)
        .await?;

        Ok(file)
    }

    /// Update applied time and fingerprint after a reprocess
    pub async fn refresh(&mut self, source_file_id: Uuid, refresh: &SourceFileRefresh) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE source_files
            SET applied_at = $2,
                downloaded_at = COALESCE($3, downloaded_at),
                fingerprint = COALESCE($4, fingerprint)
            WHERE source_file_id = $1
            "#,
        )
        .bind(source_file_id)
        .bind(refresh.applied_at)
        .bind(refresh.downloaded_at)
        .bind(&refresh.fingerprint)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
