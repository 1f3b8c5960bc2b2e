use form_core::model::{FormId, ResponseSnapshot};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn encode_snapshot(snapshot: &ResponseSnapshot) -> Result<String, StorageError> {
    serde_json::to_string(snapshot).map_err(ser)
}

/// Decode a stored payload, rejecting rows whose payload names another form.
pub(crate) fn map_snapshot_row(
    row: &sqlx::sqlite::SqliteRow,
    expected: &FormId,
) -> Result<ResponseSnapshot, StorageError> {
    let payload: String = row.try_get("payload").map_err(ser)?;
    let snapshot: ResponseSnapshot = serde_json::from_str(&payload).map_err(ser)?;
    if &snapshot.form_id != expected {
        return Err(StorageError::Serialization(format!(
            "snapshot payload for {} stored under {expected}",
            snapshot.form_id
        )));
    }
    Ok(snapshot)
}
