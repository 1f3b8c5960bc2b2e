use serde::{Deserialize, Serialize};

use crate::model::block::BlockKind;

/// Metadata for a file chosen by the respondent.
///
/// The bytes travel through a separate upload channel; the session only keeps
/// what it needs to validate and display the choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileHandle {
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }
}

/// A phone answer split into its ISO region code and national number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneParts<'a> {
    pub region: &'a str,
    pub national: &'a str,
}

/// Value recorded for one block, tagged by the kind of input that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Answer {
    /// shortText, longText, email and url.
    Text(String),
    /// Encoded as `REGION-national`, e.g. `US-2015550123`.
    Phone(String),
    /// Numeric literal, validated but never coerced.
    Number(String),
    /// Calendar date, `YYYY-MM-DD`.
    Date(String),
    /// singleSelect and dropdown.
    Choice(String),
    /// multiSelect, de-duplicated in selection order.
    Selection(Vec<String>),
    /// fileUpload; `None` once the respondent clears the file.
    File(Option<FileHandle>),
}

impl Answer {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn phone(region: &str, national: &str) -> Self {
        Self::Phone(format!("{}-{}", region.trim(), national.trim()))
    }

    #[must_use]
    pub fn number(value: impl Into<String>) -> Self {
        Self::Number(value.into())
    }

    #[must_use]
    pub fn date(value: impl Into<String>) -> Self {
        Self::Date(value.into())
    }

    #[must_use]
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    #[must_use]
    pub fn selection<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut picked: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !picked.contains(&value) {
                picked.push(value);
            }
        }
        Self::Selection(picked)
    }

    #[must_use]
    pub fn file(handle: FileHandle) -> Self {
        Self::File(Some(handle))
    }

    #[must_use]
    pub fn cleared_file() -> Self {
        Self::File(None)
    }

    /// True when nothing meaningful was entered: blank text, an empty
    /// selection, or no file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Text(value)
            | Answer::Number(value)
            | Answer::Date(value)
            | Answer::Choice(value) => value.trim().is_empty(),
            Answer::Phone(value) => Self::split_phone(value)
                .is_none_or(|parts| parts.national.trim().is_empty()),
            Answer::Selection(values) => values.is_empty(),
            Answer::File(handle) => handle.is_none(),
        }
    }

    /// Whether this variant is the one a block of `kind` produces.
    #[must_use]
    pub fn fits(&self, kind: BlockKind) -> bool {
        match self {
            Answer::Text(_) => matches!(
                kind,
                BlockKind::ShortText | BlockKind::LongText | BlockKind::Email | BlockKind::Url
            ),
            Answer::Phone(_) => kind == BlockKind::Phone,
            Answer::Number(_) => kind == BlockKind::Number,
            Answer::Date(_) => kind == BlockKind::Date,
            Answer::Choice(_) => matches!(kind, BlockKind::SingleSelect | BlockKind::Dropdown),
            Answer::Selection(_) => kind == BlockKind::MultiSelect,
            Answer::File(_) => kind == BlockKind::FileUpload,
        }
    }

    /// Split a phone answer into region and national number.
    #[must_use]
    pub fn phone_parts(&self) -> Option<PhoneParts<'_>> {
        match self {
            Answer::Phone(value) => Self::split_phone(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn file_handle(&self) -> Option<&FileHandle> {
        match self {
            Answer::File(handle) => handle.as_ref(),
            _ => None,
        }
    }

    fn split_phone(value: &str) -> Option<PhoneParts<'_>> {
        let (region, national) = value.split_once('-')?;
        Some(PhoneParts { region, national })
    }
}
