use std::env;
use std::sync::Arc;

use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::forms_api::{FormSource, FormsApiClient, FormsApiConfig, ResponseSink};
use crate::sessions::ResponseFlowService;

const DEFAULT_SNAPSHOT_DB_URL: &str = "sqlite:form-responses.sqlite3?mode=rwc";

/// Assembles the response flow from the forms API and snapshot storage.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    response_flow: Arc<ResponseFlowService>,
}

impl AppServices {
    /// Build services from `FORMS_SNAPSHOT_DB_URL` and the forms API env.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if snapshot storage cannot be opened.
    pub async fn from_env() -> Result<Self, AppServicesError> {
        let db_url = env::var("FORMS_SNAPSHOT_DB_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_DB_URL.into());
        Self::new_sqlite(&db_url, FormsApiConfig::from_env()).await
    }

    /// Build services backed by `SQLite` snapshot storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        api: FormsApiConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, api))
    }

    /// Build services with in-memory snapshots, e.g. for previews.
    #[must_use]
    pub fn in_memory(api: FormsApiConfig) -> Self {
        Self::with_storage(Storage::in_memory(), api)
    }

    fn with_storage(storage: Storage, api: FormsApiConfig) -> Self {
        let client = Arc::new(FormsApiClient::new(api));
        let forms: Arc<dyn FormSource> = client.clone();
        let sink: Arc<dyn ResponseSink> = client;
        let response_flow = Arc::new(ResponseFlowService::new(
            forms,
            sink,
            Arc::clone(&storage.snapshots),
        ));
        Self {
            storage,
            response_flow,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn response_flow(&self) -> Arc<ResponseFlowService> {
        Arc::clone(&self.response_flow)
    }
}
