//! Adapters for the form definition store and the response sink.

mod client;
mod wire;

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use form_core::model::{Answer, BlockId, FormDefinition, FormId};

use crate::error::FormsApiError;

pub use client::FormsApiClient;
pub use wire::{ApiForm, ApiFormBlock, SubmissionBody};

/// Source of published form definitions.
#[async_trait]
pub trait FormSource: Send + Sync {
    /// Fetch a form with its blocks sorted by their explicit order.
    ///
    /// # Errors
    ///
    /// Returns `FormsApiError` if the form is missing, the request fails, or
    /// the definition does not validate.
    async fn fetch_form(&self, form_id: &FormId) -> Result<FormDefinition, FormsApiError>;
}

/// Destination for completed responses.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Deliver all answers for a form in one call.
    ///
    /// # Errors
    ///
    /// Returns `FormsApiError` when delivery fails.
    async fn submit_responses(
        &self,
        form_id: &FormId,
        responses: &BTreeMap<BlockId, Answer>,
    ) -> Result<(), FormsApiError>;
}

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug)]
pub struct FormsApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl FormsApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `FORMS_API_BASE_URL` and `FORMS_API_TIMEOUT_SECS`, falling back
    /// to a local dev server.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("FORMS_API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = env::var("FORMS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}
