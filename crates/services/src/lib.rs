#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod forms_api;
pub mod sessions;

pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, FormsApiError, ResponseFlowError};
pub use forms_api::{FormSource, FormsApiClient, FormsApiConfig, ResponseSink};
pub use sessions::{ResponseFlowService, ResponseSession, SessionProgress};
