use form_core::model::{Answer, Block, BlockKind, FileHandle};
use services::ResponseSession;

use super::keyboard::needs_command_enter;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Region used for a phone answer before the respondent picks one.
pub const DEFAULT_PHONE_REGION: &str = "IN";

/// Raw input events from the rendered block, before they become an `Answer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerInput {
    /// Typed value of a text, email, url, number or date input.
    Text(String),
    PhoneRegion(String),
    PhoneNumber(String),
    /// A choice was clicked or selected; toggles on multiSelect.
    Option(String),
    File(FileHandle),
    ClearFile,
}

/// Everything the view needs to render the active block.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseBlockVm {
    pub block_id: String,
    pub kind: BlockKind,
    pub is_thank_you: bool,
    pub label: String,
    pub help_text: Option<String>,
    pub required: bool,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
    pub answer: Option<Answer>,
    /// The primary button sends the answers instead of advancing.
    pub submits: bool,
    pub button_label: String,
    /// Absolute continue URL, thankYou blocks only.
    pub continue_url: Option<String>,
    /// `None` on thankYou blocks.
    pub key_hint: Option<&'static str>,
    pub max_file_size_mb: Option<String>,
    pub validation_message: Option<String>,
    pub progress_percent: u8,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl ResponseBlockVm {
    /// Build the view-model for the session's active block.
    #[must_use]
    pub fn from_session(session: &ResponseSession) -> Option<Self> {
        let block = session.current_block()?;
        let index = session.current_index();
        let is_thank_you = block.is_thank_you();

        // The block right before thankYou is where answers get sent.
        let submits = !is_thank_you
            && session
                .blocks()
                .get(index + 1)
                .is_none_or(Block::is_thank_you);
        let button_label = if submits {
            "Submit".to_string()
        } else {
            block.continue_label().unwrap_or("Continue").to_string()
        };

        let key_hint = if is_thank_you {
            None
        } else if needs_command_enter(block.kind()) {
            Some("⌘ + Enter")
        } else {
            Some("Enter")
        };

        let validation_message = if session.is_validated() && !session.current_block_valid() {
            session.validation_message().map(str::to_string)
        } else {
            None
        };

        Some(Self {
            block_id: block.id().to_string(),
            kind: block.kind(),
            is_thank_you,
            label: block.label().to_string(),
            help_text: block.help_text().map(str::to_string),
            required: block.is_required(),
            placeholder: placeholder_for(block),
            options: block.choice_options().to_vec(),
            answer: session.current_answer().cloned(),
            submits,
            button_label,
            continue_url: block.continue_url().map(absolute_url),
            key_hint,
            max_file_size_mb: block.max_file_size_bytes().map(format_megabytes),
            validation_message,
            progress_percent: session.progress_summary().percent(),
            can_go_back: session.can_go_previous(),
            can_go_forward: session.can_go_next(),
        })
    }

    /// Text to prefill a single-line or multi-line input with.
    #[must_use]
    pub fn answer_text(&self) -> String {
        match &self.answer {
            Some(
                Answer::Text(value)
                | Answer::Number(value)
                | Answer::Date(value)
                | Answer::Choice(value),
            ) => value.clone(),
            Some(answer @ Answer::Phone(_)) => answer
                .phone_parts()
                .map(|parts| parts.national.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Region part of the current phone answer.
    #[must_use]
    pub fn phone_region(&self) -> &str {
        self.answer
            .as_ref()
            .and_then(Answer::phone_parts)
            .map(|parts| parts.region)
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_PHONE_REGION)
    }

    /// Turn an input event into the answer to record, or `None` when the
    /// input does not apply to this block.
    #[must_use]
    pub fn answer_for(&self, input: AnswerInput) -> Option<Answer> {
        match (self.kind, input) {
            (
                BlockKind::ShortText | BlockKind::LongText | BlockKind::Email | BlockKind::Url,
                AnswerInput::Text(value),
            ) => Some(Answer::text(value)),
            (BlockKind::Number, AnswerInput::Text(value)) => Some(Answer::number(value)),
            (BlockKind::Date, AnswerInput::Text(value)) => Some(Answer::date(value)),
            (BlockKind::Phone, AnswerInput::PhoneRegion(region)) => {
                Some(Answer::phone(&region, &self.answer_text()))
            }
            (BlockKind::Phone, AnswerInput::PhoneNumber(national)) => {
                Some(Answer::phone(self.phone_region(), &national))
            }
            (kind, AnswerInput::Option(option)) if self.options.contains(&option) => match kind {
                BlockKind::SingleSelect | BlockKind::Dropdown => Some(Answer::choice(option)),
                BlockKind::MultiSelect => Some(self.toggled_selection(&option)),
                _ => None,
            },
            (BlockKind::FileUpload, AnswerInput::File(handle)) => Some(Answer::file(handle)),
            (BlockKind::FileUpload, AnswerInput::ClearFile) => Some(Answer::cleared_file()),
            _ => None,
        }
    }

    fn toggled_selection(&self, option: &str) -> Answer {
        let mut picked = match &self.answer {
            Some(Answer::Selection(values)) => values.clone(),
            _ => Vec::new(),
        };
        if let Some(position) = picked.iter().position(|value| value == option) {
            picked.remove(position);
        } else {
            picked.push(option.to_string());
        }
        Answer::selection(picked)
    }

    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        match &self.answer {
            Some(Answer::Choice(value)) => value == option,
            Some(Answer::Selection(values)) => values.iter().any(|value| value == option),
            _ => false,
        }
    }
}

fn placeholder_for(block: &Block) -> Option<String> {
    if let Some(placeholder) = block.placeholder() {
        return Some(placeholder.to_string());
    }
    let fallback = match block.kind() {
        BlockKind::Email => "Enter your email",
        BlockKind::Phone => "Phone number",
        BlockKind::Url => "https://example.com",
        BlockKind::Dropdown => "Select an option",
        _ => return None,
    };
    Some(fallback.to_string())
}

fn absolute_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_megabytes(bytes: u64) -> String {
    format!("{:.0}", bytes as f64 / BYTES_PER_MB)
}
