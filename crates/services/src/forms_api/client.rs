use std::collections::BTreeMap;

use async_trait::async_trait;
use form_core::model::{Answer, BlockId, FormDefinition, FormId};
use reqwest::{Client, StatusCode};

use super::wire::{ApiForm, SubmissionBody};
use super::{FormSource, FormsApiConfig, ResponseSink};
use crate::error::FormsApiError;

/// HTTP client for the public forms API.
#[derive(Clone)]
pub struct FormsApiClient {
    client: Client,
    config: FormsApiConfig,
}

impl FormsApiClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FormsApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: FormsApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FormsApiConfig {
        &self.config
    }
}

#[async_trait]
impl FormSource for FormsApiClient {
    async fn fetch_form(&self, form_id: &FormId) -> Result<FormDefinition, FormsApiError> {
        let url = self
            .config
            .endpoint(&format!("/api/public/forms/{form_id}"));
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FormsApiError::NotFound(form_id.clone()));
        }
        if !response.status().is_success() {
            return Err(FormsApiError::HttpStatus(response.status()));
        }

        let form: ApiForm = response.json().await?;
        let definition = form.into_definition()?;
        tracing::debug!(%form_id, blocks = definition.blocks().len(), "fetched form");
        Ok(definition)
    }
}

#[async_trait]
impl ResponseSink for FormsApiClient {
    async fn submit_responses(
        &self,
        form_id: &FormId,
        responses: &BTreeMap<BlockId, Answer>,
    ) -> Result<(), FormsApiError> {
        let url = self
            .config
            .endpoint(&format!("/api/forms/{form_id}/responses"));
        let payload = SubmissionBody::from_answers(responses);

        let response = self
            .client
            .post(url)
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FormsApiError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
