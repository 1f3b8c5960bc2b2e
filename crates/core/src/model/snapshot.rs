use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::answer::Answer;
use crate::model::ids::{BlockId, FormId};

/// Storage name the snapshot is persisted under.
pub const SNAPSHOT_STORAGE_NAME: &str = "form-response-storage";

/// Restartable subset of a response session.
///
/// Block definitions and validity are not part of it; they are refetched and
/// recomputed after a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub responses: BTreeMap<BlockId, Answer>,
    pub form_id: FormId,
    pub current_block_index: usize,
}

impl ResponseSnapshot {
    #[must_use]
    pub fn empty(form_id: FormId) -> Self {
        Self {
            responses: BTreeMap::new(),
            form_id,
            current_block_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_exactly_three_camel_case_fields() {
        let mut snapshot = ResponseSnapshot::empty(FormId::new("form-1"));
        snapshot
            .responses
            .insert(BlockId::new("q1"), Answer::text("hello"));
        snapshot.current_block_index = 2;

        let json = serde_json::to_value(&snapshot).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["formId"], "form-1");
        assert_eq!(json["currentBlockIndex"], 2);
        assert_eq!(json["responses"]["q1"]["value"], "hello");
    }
}
