use chrono::Utc;
use form_core::model::{FormId, ResponseSnapshot};

use super::SqliteRepository;
use super::mapping::{encode_snapshot, map_snapshot_row};
use crate::repository::{SnapshotRepository, StorageError};

#[async_trait::async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn save_snapshot(&self, snapshot: &ResponseSnapshot) -> Result<(), StorageError> {
        let payload = encode_snapshot(snapshot)?;
        sqlx::query(
            r"
            INSERT INTO response_snapshots (storage_name, form_id, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(storage_name, form_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(self.storage_name.as_str())
        .bind(snapshot.form_id.as_str())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::debug!(
            form_id = %snapshot.form_id,
            index = snapshot.current_block_index,
            "saved response snapshot"
        );
        Ok(())
    }

    async fn load_snapshot(
        &self,
        form_id: &FormId,
    ) -> Result<Option<ResponseSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload
            FROM response_snapshots
            WHERE storage_name = ?1 AND form_id = ?2
            ",
        )
        .bind(self.storage_name.as_str())
        .bind(form_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|row| map_snapshot_row(&row, form_id)).transpose()
    }

    async fn clear_snapshot(&self, form_id: &FormId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM response_snapshots
            WHERE storage_name = ?1 AND form_id = ?2
            ",
        )
        .bind(self.storage_name.as_str())
        .bind(form_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
