use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::BlockId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BlockError {
    #[error("block id cannot be empty")]
    EmptyId,

    #[error("{kind} block {id} needs at least one choice option")]
    MissingOptions { id: BlockId, kind: BlockKind },

    #[error("block {id} has min value {min} greater than max value {max}")]
    InvalidBounds { id: BlockId, min: f64, max: f64 },

    #[error("block {id} max text length must be > 0")]
    InvalidMaxTextLength { id: BlockId },
}

//
// ─── KINDS ─────────────────────────────────────────────────────────────────────
//

/// The input type a block collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Statement,
    ShortText,
    LongText,
    Email,
    Phone,
    Number,
    Url,
    SingleSelect,
    MultiSelect,
    Dropdown,
    Date,
    FileUpload,
}

impl BlockKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Statement => "statement",
            BlockKind::ShortText => "shortText",
            BlockKind::LongText => "longText",
            BlockKind::Email => "email",
            BlockKind::Phone => "phone",
            BlockKind::Number => "number",
            BlockKind::Url => "url",
            BlockKind::SingleSelect => "singleSelect",
            BlockKind::MultiSelect => "multiSelect",
            BlockKind::Dropdown => "dropdown",
            BlockKind::Date => "date",
            BlockKind::FileUpload => "fileUpload",
        }
    }

    /// Kinds whose answer is picked from `choice_options`.
    #[must_use]
    pub fn has_choices(self) -> bool {
        matches!(
            self,
            BlockKind::SingleSelect | BlockKind::MultiSelect | BlockKind::Dropdown
        )
    }

    /// Kinds that honour `max_text_length`.
    #[must_use]
    pub fn is_free_text(self) -> bool {
        matches!(self, BlockKind::ShortText | BlockKind::LongText)
    }

    /// Statement blocks only display content and never collect an answer.
    #[must_use]
    pub fn collects_answer(self) -> bool {
        self != BlockKind::Statement
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening or closing role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialRole {
    Welcome,
    ThankYou,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated block definition, as produced by the form builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockDraft {
    pub id: String,
    pub kind: Option<BlockKind>,
    pub special_role: Option<SpecialRole>,
    pub label: String,
    pub help_text: Option<String>,
    pub continue_label: Option<String>,
    pub continue_url: Option<String>,
    pub is_required: bool,
    pub placeholder: Option<String>,
    pub choice_options: Vec<String>,
    pub max_text_length: Option<u32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub max_file_size_bytes: Option<u64>,
}

impl BlockDraft {
    /// Start a draft for the given id and kind.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    #[must_use]
    pub fn role(mut self, role: SpecialRole) -> Self {
        self.special_role = Some(role);
        self
    }

    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choice_options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn bounds(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    #[must_use]
    pub fn max_text_length(mut self, max: u32) -> Self {
        self.max_text_length = Some(max);
        self
    }

    #[must_use]
    pub fn max_file_size_bytes(mut self, max: u64) -> Self {
        self.max_file_size_bytes = Some(max);
        self
    }

    #[must_use]
    pub fn continue_url(mut self, url: impl Into<String>) -> Self {
        self.continue_url = Some(url.into());
        self
    }

    /// Validate the draft into an immutable `Block`.
    ///
    /// Blank optional strings are normalized to `None`. A missing kind is
    /// treated as a statement.
    ///
    /// # Errors
    ///
    /// Returns `BlockError` if the id is empty, a choice block has no options,
    /// numeric bounds are inverted, or the max text length is zero.
    pub fn validate(self) -> Result<Block, BlockError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(BlockError::EmptyId);
        }
        let id = BlockId::new(id);
        let kind = self.kind.unwrap_or(BlockKind::Statement);

        let choice_options: Vec<String> = self
            .choice_options
            .into_iter()
            .map(|option| option.trim().to_owned())
            .filter(|option| !option.is_empty())
            .collect();
        if kind.has_choices() && choice_options.is_empty() {
            return Err(BlockError::MissingOptions { id, kind });
        }

        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(BlockError::InvalidBounds { id, min, max });
            }
        }

        if self.max_text_length == Some(0) {
            return Err(BlockError::InvalidMaxTextLength { id });
        }

        Ok(Block {
            id,
            kind,
            special_role: self.special_role,
            label: self.label,
            help_text: non_blank(self.help_text),
            continue_label: non_blank(self.continue_label),
            continue_url: non_blank(self.continue_url),
            is_required: self.is_required && kind.collects_answer(),
            placeholder: non_blank(self.placeholder),
            choice_options,
            max_text_length: self.max_text_length,
            min_value: self.min_value,
            max_value: self.max_value,
            max_file_size_bytes: self.max_file_size_bytes,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//
// ─── BLOCK ─────────────────────────────────────────────────────────────────────
//

/// A single question or step of a form. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    special_role: Option<SpecialRole>,
    label: String,
    help_text: Option<String>,
    continue_label: Option<String>,
    continue_url: Option<String>,
    is_required: bool,
    placeholder: Option<String>,
    choice_options: Vec<String>,
    max_text_length: Option<u32>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    max_file_size_bytes: Option<u64>,
}

impl Block {
    #[must_use]
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    #[must_use]
    pub fn special_role(&self) -> Option<SpecialRole> {
        self.special_role
    }

    #[must_use]
    pub fn is_welcome(&self) -> bool {
        self.special_role == Some(SpecialRole::Welcome)
    }

    #[must_use]
    pub fn is_thank_you(&self) -> bool {
        self.special_role == Some(SpecialRole::ThankYou)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    #[must_use]
    pub fn continue_label(&self) -> Option<&str> {
        self.continue_label.as_deref()
    }

    /// Only meaningful on the thank-you block.
    #[must_use]
    pub fn continue_url(&self) -> Option<&str> {
        if self.is_thank_you() {
            self.continue_url.as_deref()
        } else {
            None
        }
    }

    /// Always false for statement blocks.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    #[must_use]
    pub fn choice_options(&self) -> &[String] {
        &self.choice_options
    }

    #[must_use]
    pub fn max_text_length(&self) -> Option<u32> {
        self.max_text_length
    }

    #[must_use]
    pub fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    #[must_use]
    pub fn max_value(&self) -> Option<f64> {
        self.max_value
    }

    #[must_use]
    pub fn max_file_size_bytes(&self) -> Option<u64> {
        self.max_file_size_bytes
    }
}

/// Arrange blocks for presentation: the thank-you block moves to the tail,
/// everything else keeps its relative order.
#[must_use]
pub fn presentation_order(blocks: Vec<Block>) -> Vec<Block> {
    let (mut ordered, closing): (Vec<Block>, Vec<Block>) =
        blocks.into_iter().partition(|block| !block.is_thank_you());
    ordered.extend(closing);
    ordered
}
