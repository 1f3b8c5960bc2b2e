use std::collections::BTreeMap;

use form_core::model::{
    Answer, BlockDraft, BlockId, BlockKind, FormDefinition, FormId, SpecialRole,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormsApiError;

/// Form as returned by the public forms endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiForm {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ApiFormBlock>,
}

/// Block row as stored by the form definition store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFormBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub is_special: Option<SpecialRole>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_url: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub order: i64,
}

impl ApiFormBlock {
    fn into_draft(self) -> BlockDraft {
        BlockDraft {
            id: self.id,
            kind: Some(self.kind),
            special_role: self.is_special,
            label: self.question,
            help_text: self.description,
            continue_label: self.button_text,
            continue_url: self.button_url,
            is_required: self.required,
            placeholder: self.placeholder,
            choice_options: self.options,
            max_text_length: self.max_length,
            min_value: self.min_value,
            max_value: self.max_value,
            max_file_size_bytes: self.max_file_size,
        }
    }
}

impl ApiForm {
    /// Sort blocks by `order` (stable for ties) and validate them.
    ///
    /// # Errors
    ///
    /// Returns `FormsApiError::InvalidBlock` or `FormsApiError::InvalidForm`
    /// when a block or the block set is malformed.
    pub fn into_definition(self) -> Result<FormDefinition, FormsApiError> {
        let mut rows = self.blocks;
        rows.sort_by_key(|row| row.order);
        let blocks = rows
            .into_iter()
            .map(|row| row.into_draft().validate())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FormDefinition::new(FormId::new(self.id), self.title, blocks)?)
    }
}

/// JSON body posted to the response sink.
///
/// File answers are left out; their bytes go through a separate upload
/// channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionBody {
    pub responses: BTreeMap<String, Value>,
}

impl SubmissionBody {
    #[must_use]
    pub fn from_answers(answers: &BTreeMap<BlockId, Answer>) -> Self {
        let responses = answers
            .iter()
            .filter_map(|(id, answer)| answer_value(answer).map(|value| (id.to_string(), value)))
            .collect();
        Self { responses }
    }
}

fn answer_value(answer: &Answer) -> Option<Value> {
    match answer {
        Answer::Text(value)
        | Answer::Phone(value)
        | Answer::Number(value)
        | Answer::Date(value)
        | Answer::Choice(value) => Some(Value::String(value.clone())),
        Answer::Selection(values) => Some(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        Answer::File(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::model::FileHandle;
    use serde_json::json;

    #[test]
    fn api_form_sorts_by_order_and_maps_fields() {
        let form: ApiForm = serde_json::from_value(json!({
            "id": "form-1",
            "title": "Signup",
            "userId": "u1",
            "blocks": [
                { "id": "q2", "type": "number", "question": "Age", "order": 2,
                  "minValue": 0, "maxValue": 120, "required": true },
                { "id": "thanks", "type": "statement", "isSpecial": "thankYou",
                  "question": "Thanks", "buttonUrl": "example.com", "order": 1 },
                { "id": "q1", "type": "singleSelect", "question": "Pick",
                  "options": ["A", "B"], "order": 0, "description": null }
            ]
        }))
        .unwrap();

        let definition = form.into_definition().unwrap();
        let ids: Vec<&str> = definition
            .blocks()
            .iter()
            .map(|b| b.id().as_str())
            .collect();
        assert_eq!(ids, ["q1", "thanks", "q2"]);

        let age = &definition.blocks()[2];
        assert_eq!(age.min_value(), Some(0.0));
        assert_eq!(age.max_value(), Some(120.0));
        assert!(age.is_required());

        let presented: Vec<String> = definition
            .into_presentation_blocks()
            .iter()
            .map(|b| b.id().to_string())
            .collect();
        assert_eq!(presented, ["q1", "q2", "thanks"]);
    }

    #[test]
    fn api_form_rejects_choice_block_without_options() {
        let form: ApiForm = serde_json::from_value(json!({
            "id": "form-1",
            "title": "Broken",
            "blocks": [{ "id": "q1", "type": "dropdown", "question": "Pick", "order": 0 }]
        }))
        .unwrap();
        assert!(matches!(
            form.into_definition(),
            Err(FormsApiError::InvalidBlock(_))
        ));
    }

    #[test]
    fn submission_body_encodes_values_and_skips_files() {
        let mut answers = BTreeMap::new();
        answers.insert(BlockId::new("name"), Answer::text("Ada"));
        answers.insert(BlockId::new("tags"), Answer::selection(["a", "b"]));
        answers.insert(BlockId::new("phone"), Answer::phone("US", "2015550123"));
        answers.insert(
            BlockId::new("cv"),
            Answer::file(FileHandle::new("cv.pdf", 10)),
        );

        let body = serde_json::to_value(SubmissionBody::from_answers(&answers)).unwrap();
        assert_eq!(
            body,
            json!({
                "responses": {
                    "name": "Ada",
                    "tags": ["a", "b"],
                    "phone": "US-2015550123"
                }
            })
        );
    }
}
