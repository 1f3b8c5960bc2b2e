mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::ResponseFlowError;
pub use progress::SessionProgress;
pub use service::ResponseSession;
pub use workflow::ResponseFlowService;
