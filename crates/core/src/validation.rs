//! Per-kind answer validation.
//!
//! Rules run in a fixed order and stop at the first failure:
//! statement blocks always pass, then required-ness, then the shape rule for
//! the block kind. Failures are plain values whose `Display` is the message
//! shown to the respondent.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::model::{Answer, Block, BlockKind};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,

    #[error("Please keep your answer to {max} characters or fewer.")]
    TooLong { max: u32 },

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a valid phone number.")]
    InvalidPhone,

    #[error("Please enter a valid URL.")]
    InvalidUrl,

    #[error("Please enter a valid number.")]
    InvalidNumber,

    #[error("Please enter a number greater than or equal to {min}.")]
    BelowMinimum { min: f64 },

    #[error("Please enter a number less than or equal to {max}.")]
    AboveMaximum { max: f64 },

    #[error("Please enter a valid date.")]
    InvalidDate,

    #[error("File size must not exceed {}.", format_size(.max_bytes))]
    FileTooLarge { max_bytes: u64 },

    #[error("This answer does not match the question type.")]
    KindMismatch,

    #[error("No question is available yet.")]
    NoCurrentBlock,
}

/// Outcome of validating the active block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: Option<String>,
}

impl Validation {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(err: &ValidationError) -> Self {
        Self {
            valid: false,
            message: Some(err.to_string()),
        }
    }
}

impl From<Result<(), ValidationError>> for Validation {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(err) => Self::failed(&err),
        }
    }
}

/// Validate `answer` against the rules of `block`.
///
/// # Errors
///
/// Returns the first `ValidationError` that applies.
pub fn validate_answer(block: &Block, answer: Option<&Answer>) -> Result<(), ValidationError> {
    if block.kind() == BlockKind::Statement {
        return Ok(());
    }

    let answer = match answer {
        Some(answer) if !answer.is_empty() => answer,
        _ => {
            if block.is_required() {
                return Err(ValidationError::Required);
            }
            return Ok(());
        }
    };

    if !answer.fits(block.kind()) {
        return Err(ValidationError::KindMismatch);
    }

    match answer {
        Answer::Text(value) => match block.kind() {
            BlockKind::Email => check_email(value),
            BlockKind::Url => check_url(value),
            _ => check_length(value, block.max_text_length()),
        },
        Answer::Phone(_) => {
            let parts = answer.phone_parts().ok_or(ValidationError::InvalidPhone)?;
            check_phone(parts.region, parts.national)
        }
        Answer::Number(value) => check_number(value, block.min_value(), block.max_value()),
        Answer::Date(value) => check_date(value),
        Answer::File(handle) => match (handle, block.max_file_size_bytes()) {
            (Some(file), Some(max_bytes)) if file.size > max_bytes => {
                Err(ValidationError::FileTooLarge { max_bytes })
            }
            _ => Ok(()),
        },
        // Membership in the options is enforced by the input surface.
        Answer::Choice(_) | Answer::Selection(_) => Ok(()),
    }
}

fn check_length(value: &str, max: Option<u32>) -> Result<(), ValidationError> {
    match max {
        Some(max) if value.chars().count() > max as usize => Err(ValidationError::TooLong { max }),
        _ => Ok(()),
    }
}

fn check_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Bare domains are accepted by assuming `https://`.
fn check_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let candidate = if value.contains("://") {
        value.to_owned()
    } else {
        format!("https://{value}")
    };
    let url = Url::parse(&candidate).map_err(|_| ValidationError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl);
    }
    match url.host() {
        Some(url::Host::Domain(domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            let dotted = labels.len() >= 2 && labels.iter().all(|label| !label.is_empty());
            if dotted {
                Ok(())
            } else {
                Err(ValidationError::InvalidUrl)
            }
        }
        Some(url::Host::Ipv4(_) | url::Host::Ipv6(_)) => Ok(()),
        None => Err(ValidationError::InvalidUrl),
    }
}

fn check_phone(region: &str, national: &str) -> Result<(), ValidationError> {
    let region = region
        .trim()
        .to_ascii_uppercase()
        .parse::<phonenumber::country::Id>()
        .map_err(|_| ValidationError::InvalidPhone)?;
    let number = phonenumber::parse(Some(region), national.trim())
        .map_err(|_| ValidationError::InvalidPhone)?;
    if phonenumber::is_valid(&number) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

fn check_number(value: &str, min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::InvalidNumber)?;
    if let Some(min) = min {
        if parsed < min {
            return Err(ValidationError::BelowMinimum { min });
        }
    }
    if let Some(max) = max {
        if parsed > max {
            return Err(ValidationError::AboveMaximum { max });
        }
    }
    Ok(())
}

fn check_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidDate)
}

fn format_size(bytes: &u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;
    if *bytes >= MB {
        format!("{} MB", bytes / MB)
    } else if *bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockDraft, FileHandle};

    fn block(kind: BlockKind) -> Block {
        let draft = BlockDraft::new("q1", kind, "Question");
        let draft = if kind.has_choices() {
            draft.options(["A", "B"])
        } else {
            draft
        };
        draft.validate().unwrap()
    }

    fn required(kind: BlockKind) -> Block {
        BlockDraft::new("q1", kind, "Question")
            .required(true)
            .validate()
            .unwrap()
    }

    fn message(result: Result<(), ValidationError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn statement_always_passes() {
        let block = BlockDraft::new("s", BlockKind::Statement, "Welcome")
            .required(true)
            .validate()
            .unwrap();
        assert!(validate_answer(&block, None).is_ok());
    }

    #[test]
    fn required_short_text_rejects_blank() {
        let block = required(BlockKind::ShortText);
        assert_eq!(message(validate_answer(&block, None)), "This field is required.");
        assert_eq!(
            message(validate_answer(&block, Some(&Answer::text("")))),
            "This field is required."
        );
        assert_eq!(
            validate_answer(&block, Some(&Answer::text("  \t"))),
            Err(ValidationError::Required)
        );
        assert!(validate_answer(&block, Some(&Answer::text("hello"))).is_ok());
    }

    #[test]
    fn optional_blank_answer_skips_shape_rules() {
        let block = block(BlockKind::Email);
        assert!(validate_answer(&block, Some(&Answer::text(""))).is_ok());
    }

    #[test]
    fn required_multi_select_rejects_empty_selection() {
        let block = BlockDraft::new("q1", BlockKind::MultiSelect, "Pick")
            .options(["A", "B"])
            .required(true)
            .validate()
            .unwrap();
        let empty = Answer::selection(Vec::<String>::new());
        assert_eq!(validate_answer(&block, Some(&empty)), Err(ValidationError::Required));
        assert!(validate_answer(&block, Some(&Answer::selection(["A"]))).is_ok());
    }

    #[test]
    fn text_length_limit() {
        let block = BlockDraft::new("q1", BlockKind::LongText, "Bio")
            .max_text_length(5)
            .validate()
            .unwrap();
        assert!(validate_answer(&block, Some(&Answer::text("héllo"))).is_ok());
        assert_eq!(
            validate_answer(&block, Some(&Answer::text("hello!"))),
            Err(ValidationError::TooLong { max: 5 })
        );
    }

    #[test]
    fn email_shape() {
        let block = block(BlockKind::Email);
        assert!(validate_answer(&block, Some(&Answer::text("a@b.com"))).is_ok());
        assert_eq!(
            validate_answer(&block, Some(&Answer::text("not-an-email"))),
            Err(ValidationError::InvalidEmail)
        );
        assert!(validate_answer(&block, Some(&Answer::text("a@b"))).is_err());
    }

    #[test]
    fn url_accepts_bare_domains() {
        let block = block(BlockKind::Url);
        for ok in ["example.com", "https://example.com/path", "http://sub.example.org"] {
            assert!(validate_answer(&block, Some(&Answer::text(ok))).is_ok(), "{ok}");
        }
        for bad in ["not a url", "localhost", "ftp://example.com", "https://"] {
            assert_eq!(
                validate_answer(&block, Some(&Answer::text(bad))),
                Err(ValidationError::InvalidUrl),
                "{bad}"
            );
        }
    }

    #[test]
    fn number_bounds() {
        let block = BlockDraft::new("q1", BlockKind::Number, "Rating")
            .bounds(Some(1.0), Some(5.0))
            .validate()
            .unwrap();
        let below = message(validate_answer(&block, Some(&Answer::number("0"))));
        assert!(below.contains("greater than or equal to 1"), "{below}");
        assert!(validate_answer(&block, Some(&Answer::number("3"))).is_ok());
        let above = message(validate_answer(&block, Some(&Answer::number("6"))));
        assert!(above.contains("less than or equal to 5"), "{above}");
        let nan = message(validate_answer(&block, Some(&Answer::number("abc"))));
        assert!(nan.contains("valid number"), "{nan}");
        assert_eq!(
            validate_answer(&block, Some(&Answer::number("inf"))),
            Err(ValidationError::InvalidNumber)
        );
    }

    #[test]
    fn date_must_be_calendar_date() {
        let block = block(BlockKind::Date);
        assert!(validate_answer(&block, Some(&Answer::date("2024-02-29"))).is_ok());
        assert_eq!(
            validate_answer(&block, Some(&Answer::date("2023-02-29"))),
            Err(ValidationError::InvalidDate)
        );
        assert!(validate_answer(&block, Some(&Answer::date("tomorrow"))).is_err());
    }

    #[test]
    fn phone_must_be_dialable_for_region() {
        let block = block(BlockKind::Phone);
        assert!(validate_answer(&block, Some(&Answer::phone("US", "2015550123"))).is_ok());
        assert_eq!(
            validate_answer(&block, Some(&Answer::phone("US", "123"))),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(
            validate_answer(&block, Some(&Answer::phone("QQ", "2015550123"))),
            Err(ValidationError::InvalidPhone)
        );
    }

    #[test]
    fn file_size_limit() {
        let block = BlockDraft::new("q1", BlockKind::FileUpload, "CV")
            .max_file_size_bytes(2 * 1024 * 1024)
            .validate()
            .unwrap();
        let small = Answer::file(FileHandle::new("cv.pdf", 1024));
        let large = Answer::file(FileHandle::new("cv.pdf", 3 * 1024 * 1024));
        assert!(validate_answer(&block, Some(&small)).is_ok());
        assert_eq!(
            message(validate_answer(&block, Some(&large))),
            "File size must not exceed 2 MB."
        );
    }

    #[test]
    fn choice_kinds_only_check_required() {
        let block = block(BlockKind::Dropdown);
        assert!(validate_answer(&block, Some(&Answer::choice("anything"))).is_ok());
    }

    #[test]
    fn mismatched_variant_is_invalid() {
        let block = block(BlockKind::Number);
        assert_eq!(
            validate_answer(&block, Some(&Answer::text("3"))),
            Err(ValidationError::KindMismatch)
        );
    }

    #[test]
    fn validation_value_carries_message() {
        let validation = Validation::from(Err(ValidationError::Required));
        assert!(!validation.valid);
        assert_eq!(validation.message.as_deref(), Some("This field is required."));
        assert_eq!(Validation::from(Ok(())), Validation::ok());
    }
}
